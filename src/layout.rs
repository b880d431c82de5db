use tracing::{debug, info, warn};

use crate::model::{Cell, CellKind, HtmlTable};

/// Replaces every `colspan = N` cell, in any section, with the cell itself
/// followed by `N - 1` empty `<td>` fillers.
#[must_use]
pub fn merge_colspan_columns(mut table: HtmlTable) -> HtmlTable {
    for row in table.rows_mut() {
        let mut expanded = Vec::with_capacity(row.cells.len());
        for mut cell in row.cells.drain(..) {
            let width = cell.span_width();
            cell.colspan = None;
            expanded.push(cell);
            expanded.extend((1..width).map(|_| Cell::empty(CellKind::Data)));
        }
        row.cells = expanded;
    }
    table
}

/// Reconciles every row's width with the width of the first `<thead>`.
///
/// Wider rows lose empty cells (first to last) until the widths match or no
/// empty cell is left; narrower rows get empty `<td>` cells prepended.
/// Rows whose surplus cells all carry text stay misaligned.
#[must_use]
pub fn normalize_html_table(mut table: HtmlTable, debug_output: bool) -> HtmlTable {
    let Some(head) = table.first_head() else {
        return table;
    };
    let header_width = head.rows.iter().map(|row| row.cells.len()).sum::<usize>();

    if debug_output {
        info!(header_width, "number of cells in header");
    } else {
        debug!(header_width, "number of cells in header");
    }

    for (index, row) in table.rows_mut().enumerate() {
        let width = row.cells.len();
        if width > header_width {
            let mut extra = width - header_width;
            row.cells.retain(|cell| {
                if extra > 0 && cell.is_blank() {
                    extra -= 1;
                    false
                } else {
                    true
                }
            });
            if extra > 0 {
                warn!(
                    row = index,
                    width = row.cells.len(),
                    header_width,
                    "row keeps surplus non-empty cells"
                );
            }
        } else if width < header_width {
            let missing = header_width - width;
            if debug_output {
                info!(row = index, missing, "prepending empty cells");
            }
            row.cells
                .splice(0..0, (0..missing).map(|_| Cell::empty(CellKind::Data)));
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{merge_colspan_columns, normalize_html_table};
    use crate::html::parse_table;

    #[test]
    fn expands_body_colspan_into_fillers() {
        let table = parse_table(
            "<table><tbody><tr><td colspan=\"3\">Total</td><td>9</td></tr></tbody></table>",
        )
        .expect("table");

        let merged = merge_colspan_columns(table);
        assert_eq!(
            merged.to_html(),
            "<table><tbody><tr><td>Total</td><td></td><td></td><td>9</td></tr></tbody></table>"
        );
    }

    #[test]
    fn drops_empty_cells_from_wide_rows_and_pads_narrow_rows() {
        let table = parse_table(
            "<table><thead><tr><th>A</th><th>B</th><th>C</th></tr></thead><tbody>\
             <tr><td>1</td><td></td><td>2</td><td> </td><td>3</td></tr>\
             <tr><td>4</td></tr>\
             </tbody></table>",
        )
        .expect("table");

        let normalized = normalize_html_table(table, false);
        let body = normalized.first_body().expect("body");
        let texts = body
            .rows
            .iter()
            .map(|row| row.cells.iter().map(|cell| cell.text.as_str()).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        assert_eq!(texts, vec![vec!["1", "2", "3"], vec!["", "", "4"]]);
    }

    #[test]
    fn leaves_surplus_non_empty_cells_in_place() {
        let table = parse_table(
            "<table><thead><tr><th>A</th></tr></thead>\
             <tbody><tr><td>1</td><td>2</td></tr></tbody></table>",
        )
        .expect("table");

        let normalized = normalize_html_table(table, true);
        assert_eq!(normalized.first_body().expect("body").rows[0].cells.len(), 2);
    }

    #[test]
    fn aligned_table_is_unchanged() {
        let table = parse_table(
            "<table><thead><tr><th>A</th><th>B</th></tr></thead>\
             <tbody><tr><td>1</td><td>2</td></tr><tr><td></td><td>x</td></tr></tbody></table>",
        )
        .expect("table");

        assert_eq!(normalize_html_table(table.clone(), false), table);
    }

    #[test]
    fn table_without_thead_is_unchanged() {
        let table = parse_table("<table><tr><td>1</td></tr><tr><td>1</td><td></td></tr></table>")
            .expect("table");
        assert_eq!(normalize_html_table(table.clone(), false), table);
    }
}
