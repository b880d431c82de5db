use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use sparrow_table::{
    ColumnList, ExtractionReport, GENERIC_TABLE, LexicalEmbedder, SemanticExtractor,
    SemanticOptions, TableExtraction, TemplateRegistry, extract_table_with_report,
    merge_html_table_headers,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "sparrow-table",
    version,
    about = "Normalize HTML tables and extract them into JSON"
)]
struct Cli {
    /// Log every repair and similarity decision.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract typed items from a table using a query schema.
    Extract(ExtractArgs),
    /// Repair a table exported with two header blocks.
    Normalize(NormalizeArgs),
    /// Pick columns from one or more tables by name similarity.
    Columns(ColumnsArgs),
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Input HTML path.
    #[arg(short, long)]
    input: PathBuf,

    /// Query schema, e.g. "[{'items': [{'name': 'str', 'qty': 'int'}]}]".
    #[arg(short, long)]
    query: String,

    /// Table template name.
    #[arg(long, default_value = "generic_table")]
    template: String,

    /// Output JSON path; stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print every warning, not just the count.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Args)]
struct NormalizeArgs {
    /// Input HTML path.
    #[arg(short, long)]
    input: PathBuf,

    /// Expected column names, e.g. description,qty,net_price.
    #[arg(short, long)]
    columns: ColumnList,

    /// Output HTML path; stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ColumnsArgs {
    /// Input HTML path, one table per file. Repeatable.
    #[arg(short, long, required = true)]
    input: Vec<PathBuf>,

    /// Target column names to pick.
    #[arg(short, long)]
    targets: ColumnList,

    /// Column keywords used to repair split headers.
    #[arg(short, long)]
    keywords: Option<ColumnList>,

    /// Emit one array per column instead of one object per row.
    #[arg(long)]
    by_column: bool,

    /// Only look for still-unmatched targets in later tables.
    #[arg(long)]
    update_targets: bool,

    /// Output JSON path; stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read '{}'", path.display()))
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, content)
            .with_context(|| format!("failed to write '{}'", path.display())),
        None => {
            println!("{content}");
            Ok(())
        }
    }
}

fn log_report(report: &ExtractionReport, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} row={:?} column={:?}: {}",
                warning.code, warning.row, warning.column, warning.message
            );
        }
    }
}

fn run_extract(args: &ExtractArgs) -> Result<TableExtraction> {
    let html = read_input(&args.input)?;
    let queries = [args.query.clone()];

    let extraction = if args.template == GENERIC_TABLE {
        let (extraction, report) = extract_table_with_report(&queries, &html);
        log_report(&report, args.verbose);
        extraction
    } else {
        TemplateRegistry::new()
            .fetch_table_data(&args.template, &queries, &html)
            .context("failed to select table template")?
    };

    if let Some(reason) = extraction.empty_reason() {
        warn!(?reason, "nothing extracted");
    }

    let json = serde_json::to_string_pretty(&extraction).context("failed to encode JSON")?;
    write_output(args.output.as_deref(), &json)?;
    Ok(extraction)
}

fn run_normalize(args: &NormalizeArgs, debug: bool) -> Result<()> {
    let html = read_input(&args.input)?;
    let embedder = LexicalEmbedder::default();
    let normalized = merge_html_table_headers(&html, Some(&args.columns[..]), &embedder, debug)
        .with_context(|| format!("failed to normalize '{}'", args.input.display()))?;
    write_output(args.output.as_deref(), &normalized)
}

fn has_values(section: &Value) -> bool {
    match section {
        Value::Array(rows) => !rows.is_empty(),
        Value::Object(columns) => columns
            .values()
            .any(|values| values.as_array().is_some_and(|values| !values.is_empty())),
        _ => false,
    }
}

fn run_columns(args: &ColumnsArgs, debug: bool) -> Result<bool> {
    let tables = args
        .input
        .iter()
        .map(|path| read_input(path))
        .collect::<Result<Vec<_>>>()?;

    let options = SemanticOptions {
        group_by_rows: !args.by_column,
        update_targets: args.update_targets,
        debug,
    };
    let embedder = LexicalEmbedder::default();
    let (answer, unprocessed) = SemanticExtractor::new(&embedder)
        .read_data(&args.targets, &tables, args.keywords.as_deref(), &options)
        .context("failed to extract columns")?;

    if !unprocessed.is_empty() {
        eprintln!("warning: unmatched targets: {}", unprocessed.join(", "));
    }

    let json = serde_json::to_string_pretty(&answer).context("failed to encode JSON")?;
    write_output(args.output.as_deref(), &json)?;

    Ok(answer
        .as_object()
        .is_some_and(|sections| sections.values().any(has_values)))
}

fn exit_for(result: Result<bool>) -> ExitCode {
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.debug {
        "sparrow_table=debug"
    } else {
        "sparrow_table=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match cli.command {
        Commands::Extract(args) => {
            exit_for(run_extract(&args).map(|extraction| extraction.item_count() > 0))
        }
        Commands::Normalize(args) => exit_for(run_normalize(&args, cli.debug).map(|()| true)),
        Commands::Columns(args) => exit_for(run_columns(&args, cli.debug)),
    }
}
