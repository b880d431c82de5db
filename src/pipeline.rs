use tracing::debug;

use crate::embedding::Embedder;
use crate::error::TableError;
use crate::header::{merge_table_header_thead, update_table_header_colspan};
use crate::html::parse_table;
use crate::junk::detect_and_remove_junk_columns;
use crate::layout::{merge_colspan_columns, normalize_html_table};
use crate::model::HtmlTable;
use crate::rowspan::{fix_rowspan_elements, merge_rows_with_rowspan};

/// Runs the full repair sequence on an already parsed table.
pub fn normalize_table(
    table: HtmlTable,
    column_keywords: &[String],
    embedder: &dyn Embedder,
    debug_output: bool,
) -> Result<HtmlTable, TableError> {
    let table = update_table_header_colspan(table);
    let table = merge_table_header_thead(table);
    let table = merge_colspan_columns(table);
    let table = normalize_html_table(table, debug_output);
    let table = fix_rowspan_elements(table);
    let table = merge_rows_with_rowspan(table);
    detect_and_remove_junk_columns(table, column_keywords, embedder, debug_output)
}

/// Repairs a table exported with two header blocks.
///
/// Only tables with more than one `<thead>` are touched, and only when
/// `column_keywords` is given; anything else, unparseable input included,
/// comes back as it was passed in.
pub fn merge_html_table_headers(
    html_table: &str,
    column_keywords: Option<&[String]>,
    embedder: &dyn Embedder,
    debug_output: bool,
) -> Result<String, TableError> {
    let Some(keywords) = column_keywords else {
        return Ok(html_table.to_string());
    };
    let Some(table) = parse_table(html_table) else {
        debug!("no table found; leaving input unchanged");
        return Ok(html_table.to_string());
    };
    if table.head_count() < 2 {
        return Ok(html_table.to_string());
    }

    let normalized = normalize_table(table, keywords, embedder, debug_output)?;
    Ok(normalized.to_html())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::merge_html_table_headers;
    use crate::embedding::LexicalEmbedder;

    const TWO_HEADS: &str = "<table>\
        <thead><tr><th>Description</th><th colspan=\"2\">Amount</th></tr></thead>\
        <thead><tr><th></th><th>Net</th><th>Gross</th></tr></thead>\
        <tbody>\
        <tr><td>Pen</td><td>1.00</td><td>1.20</td></tr>\
        <tr><td>Book</td><td>9.00</td><td>9.90</td></tr>\
        </tbody></table>";

    fn keywords(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn repairs_double_header_table() {
        let keywords = keywords(&["description", "amount net", "amount gross"]);
        let html = merge_html_table_headers(
            TWO_HEADS,
            Some(&keywords),
            &LexicalEmbedder::default(),
            false,
        )
        .expect("normalization");

        assert_eq!(
            html,
            "<table><thead><tr><th>Description</th><th>Amount Net</th><th>Gross</th></tr></thead>\
             <tbody><tr><td>Pen</td><td>1.00</td><td>1.20</td></tr>\
             <tr><td>Book</td><td>9.00</td><td>9.90</td></tr></tbody></table>"
        );
    }

    #[test]
    fn single_head_or_missing_keywords_is_a_no_op() {
        let single = "<table><thead><tr><th>A</th></tr></thead><tbody><tr><td>1</td></tr></tbody></table>";
        let embedder = LexicalEmbedder::default();
        let keywords = keywords(&["a"]);

        assert_eq!(
            merge_html_table_headers(single, Some(&keywords), &embedder, false).expect("ok"),
            single
        );
        assert_eq!(
            merge_html_table_headers(TWO_HEADS, None, &embedder, false).expect("ok"),
            TWO_HEADS
        );
        assert_eq!(
            merge_html_table_headers("plain text", Some(&keywords), &embedder, false).expect("ok"),
            "plain text"
        );
    }
}
