use tracing::{debug, info};

use crate::embedding::{Embedder, similarity_matrix};
use crate::error::TableError;
use crate::header::clean_html_table_header_names;
use crate::model::{Cell, HtmlTable, Row, Section, SectionKind};

/// Columns whose best similarity to any target falls below this are junk.
pub const JUNK_SIMILARITY_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, PartialEq)]
struct Column {
    name: String,
    values: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnScore {
    pub column: String,
    pub best_target: String,
    pub similarity: f32,
}

impl ColumnScore {
    #[must_use]
    pub fn is_junk(&self) -> bool {
        self.similarity < JUNK_SIMILARITY_THRESHOLD
    }
}

/// Header names plus nullable cell text, column by column.
fn load_columns(table: &HtmlTable) -> Option<Vec<Column>> {
    let header_row = table.first_head()?.rows.first()?;
    let mut columns = header_row
        .cells
        .iter()
        .map(|cell| Column {
            name: cell.trimmed().to_string(),
            values: Vec::new(),
        })
        .collect::<Vec<_>>();

    let body_rows = table
        .sections
        .iter()
        .filter(|section| section.kind != SectionKind::Head)
        .flat_map(|section| section.rows.iter())
        .filter(|row| !row.cells.is_empty());

    for row in body_rows {
        if row.cells.len() > columns.len() {
            debug!(
                width = row.cells.len(),
                columns = columns.len(),
                "ignoring cells beyond the header width"
            );
        }
        for (index, column) in columns.iter_mut().enumerate() {
            let value = row
                .cells
                .get(index)
                .map(Cell::trimmed)
                .filter(|text| !text.is_empty())
                .map(ToString::to_string);
            column.values.push(value);
        }
    }

    Some(columns)
}

fn append_values(target: &mut Column, junk: Column) {
    for (kept, extra) in target.values.iter_mut().zip(junk.values) {
        let Some(extra) = extra else {
            continue;
        };
        *kept = Some(match kept.take() {
            Some(existing) => format!("{existing} {extra}"),
            None => extra,
        });
    }
}

fn columns_to_table(columns: Vec<Column>) -> HtmlTable {
    let header = Row::new(
        columns
            .iter()
            .map(|column| Cell::header(column.name.clone()))
            .collect(),
    );

    let row_count = columns.first().map_or(0, |column| column.values.len());
    let mut rows = vec![Row::default(); row_count];
    for column in columns {
        for (row, value) in rows.iter_mut().zip(column.values) {
            row.cells.push(Cell::data(value.unwrap_or_default()));
        }
    }

    HtmlTable::new(vec![
        Section::new(SectionKind::Head, vec![header]),
        Section::new(SectionKind::Body, rows),
    ])
}

/// Scores each header name against the requested target columns.
pub fn score_columns(
    names: &[String],
    target_columns: &[String],
    embedder: &dyn Embedder,
) -> Result<Vec<ColumnScore>, TableError> {
    if target_columns.is_empty() {
        return Err(TableError::InvalidOption(
            "at least one target column is required to score columns".to_string(),
        ));
    }
    let matrix = similarity_matrix(embedder, names, target_columns)?;
    Ok(names
        .iter()
        .zip(matrix)
        .map(|(name, similarities)| {
            let (best_index, similarity) = similarities.iter().enumerate().fold(
                (0, f32::NEG_INFINITY),
                |best, (index, &score)| if score > best.1 { (index, score) } else { best },
            );
            ColumnScore {
                column: name.clone(),
                best_target: target_columns[best_index].clone(),
                similarity,
            }
        })
        .collect())
}

/// Folds columns that match none of `target_columns` into their left
/// neighbour and drops them.
///
/// Header names are cleaned first. A junk first column has no neighbour and
/// is dropped with its values. Empty cells come back as empty strings.
pub fn detect_and_remove_junk_columns(
    table: HtmlTable,
    target_columns: &[String],
    embedder: &dyn Embedder,
    debug_output: bool,
) -> Result<HtmlTable, TableError> {
    let table = clean_html_table_header_names(table);
    if target_columns.is_empty() {
        debug!("no target columns; skipping junk column detection");
        return Ok(table);
    }
    let Some(columns) = load_columns(&table) else {
        debug!("table has no header row; skipping junk column detection");
        return Ok(table);
    };

    let names = columns
        .iter()
        .map(|column| column.name.clone())
        .collect::<Vec<_>>();
    let scores = score_columns(&names, target_columns, embedder)?;

    for score in &scores {
        if debug_output {
            info!(
                column = %score.column,
                similarity = score.similarity,
                target = %score.best_target,
                "column similarity"
            );
        } else {
            debug!(
                column = %score.column,
                similarity = score.similarity,
                target = %score.best_target,
                "column similarity"
            );
        }
    }

    let mut kept: Vec<Column> = Vec::with_capacity(columns.len());
    let mut junk_names = Vec::new();
    for (column, score) in columns.into_iter().zip(&scores) {
        if !score.is_junk() {
            kept.push(column);
            continue;
        }
        junk_names.push(column.name.clone());
        if let Some(neighbour) = kept.last_mut() {
            append_values(neighbour, column);
        }
    }

    if debug_output {
        info!(?junk_names, "junk columns");
    } else {
        debug!(?junk_names, "junk columns");
    }

    Ok(columns_to_table(kept))
}
