use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::model::{Cell, HtmlTable, Row, Section, SectionKind};

static NUMERIC_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+(?:,\d{3})*(?:\.\d+)?$").expect("hardcoded numeric cell regex is valid")
});

pub(crate) fn is_numeric(value: &str) -> bool {
    NUMERIC_CELL.is_match(value)
}

/// Row index -> `(cell index, rowspan)` for every cell carrying a rowspan.
fn collect_rowspans(table: &HtmlTable) -> BTreeMap<usize, Vec<(usize, usize)>> {
    table
        .rows()
        .enumerate()
        .filter_map(|(row_index, row)| {
            let spans = row
                .cells
                .iter()
                .enumerate()
                .filter_map(|(cell_index, cell)| cell.rowspan.map(|value| (cell_index, value)))
                .collect::<Vec<_>>();
            (!spans.is_empty()).then_some((row_index, spans))
        })
        .collect()
}

/// Repairs the export bug where a rowspan starts one row too early.
///
/// For each row holding rowspan cells, the rows below it are counted up to
/// the next such row. When a rowspan does not reach that far
/// (`rowspan - 1 < rows_below`), every rowspan of the row is moved to the
/// cell at the same index in the next row. A next row that is too short gets
/// a copy of the source cell appended instead. Only this one pattern is
/// corrected.
#[must_use]
pub fn fix_rowspan_elements(mut table: HtmlTable) -> HtmlTable {
    let spans = collect_rowspans(&table);
    let total_rows = table.row_count();
    let starts = spans.keys().copied().collect::<Vec<_>>();

    let mut bad_rows = Vec::new();
    for (position, &row_index) in starts.iter().enumerate() {
        let rows_below = starts
            .get(position + 1)
            .map_or(total_rows - row_index - 1, |&next| next - row_index - 1);
        if let Some(&(_, value)) = spans[&row_index]
            .iter()
            .find(|&&(_, value)| value <= rows_below)
        {
            debug!(row = row_index, rowspan = value, rows_below, "rowspan shorter than its block");
            bad_rows.push(row_index);
        }
    }

    for row_index in bad_rows {
        for &(cell_index, value) in &spans[&row_index] {
            let Some(source) = table
                .row_at_mut(row_index)
                .and_then(|row| row.cells.get_mut(cell_index))
            else {
                continue;
            };
            source.rowspan = None;
            let carried = Cell::new(source.kind, source.text.clone()).with_rowspan(value);

            let Some(next_row) = table.row_at_mut(row_index + 1) else {
                continue;
            };
            match next_row.cells.get_mut(cell_index) {
                Some(cell) => cell.rowspan = Some(value),
                None => next_row.cells.push(carried),
            }
        }
    }

    table
}

fn has_numeric_collision(anchor: &Row, below: &Row) -> bool {
    anchor
        .data_cells()
        .zip(below.data_cells())
        .any(|(upper, lower)| is_numeric(upper.trimmed()) && is_numeric(lower.trimmed()))
}

fn absorb_row(anchor: &mut Row, below: &Row) {
    for (cell, extra) in anchor.data_cells_mut().zip(below.data_cells()) {
        let joined = format!("{} {}", cell.trimmed(), extra.trimmed());
        cell.text = joined.trim().to_string();
    }
}

/// Collapses rows covered by a `<td rowspan>` into the row that opens the
/// span, unless the span holds numbers in the same column on two rows, in
/// which case the rows are distinct records and stay apart.
///
/// Rows without `<td>` cells are dropped. The result keeps the first
/// `<thead>` followed by a single `<tbody>`.
#[must_use]
pub fn merge_rows_with_rowspan(table: HtmlTable) -> HtmlTable {
    let head = table.first_head().cloned();
    let rows = table
        .sections
        .into_iter()
        .flat_map(|section| section.rows)
        .collect::<Vec<_>>();

    let mut merged_rows = Vec::with_capacity(rows.len());
    let mut index = 0;
    while index < rows.len() {
        let row = &rows[index];
        if !row.has_data_cells() {
            index += 1;
            continue;
        }

        let Some(span) = row.data_cells().find_map(|cell| cell.rowspan) else {
            merged_rows.push(row.clone());
            index += 1;
            continue;
        };

        let span = span.max(1);
        let end = (index + span).min(rows.len());
        let below = &rows[index + 1..end];
        if below.iter().any(|lower| has_numeric_collision(row, lower)) {
            debug!(row = index, span, "numeric values under rowspan; keeping rows apart");
            merged_rows.extend(rows[index..end].iter().cloned());
        } else {
            let mut anchor = row.clone();
            for lower in below {
                absorb_row(&mut anchor, lower);
            }
            merged_rows.push(anchor);
        }
        index += span;
    }

    for row in &mut merged_rows {
        for cell in row.data_cells_mut() {
            cell.rowspan = None;
        }
    }

    let mut sections = Vec::with_capacity(2);
    sections.extend(head);
    sections.push(Section::new(SectionKind::Body, merged_rows));
    HtmlTable::new(sections)
}
