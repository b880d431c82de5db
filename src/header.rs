use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::model::{Cell, CellKind, HtmlTable, SectionKind};

static HEADER_JUNK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-zA-Z0-9\s]").expect("hardcoded header junk regex is valid")
});

pub(crate) const BLANK_HEADER_PLACEHOLDER: &str = "-";

/// Expands header cells spanning several columns into one cell followed by
/// empty `<th>` siblings, so the header width matches the visual layout.
#[must_use]
pub fn update_table_header_colspan(mut table: HtmlTable) -> HtmlTable {
    for section in &mut table.sections {
        if section.kind != SectionKind::Head {
            continue;
        }

        for row in &mut section.rows {
            let mut expanded = Vec::with_capacity(row.cells.len());
            for mut cell in row.cells.drain(..) {
                let width = cell.colspan.unwrap_or(1);
                if cell.kind == CellKind::Header && width > 1 {
                    cell.colspan = Some(1);
                    expanded.push(cell);
                    expanded.extend((1..width).map(|_| Cell::empty(CellKind::Header)));
                } else {
                    expanded.push(cell);
                }
            }
            row.cells = expanded;
        }
    }
    table
}

fn merged_header_text(primary: &str, secondary: &str) -> Option<String> {
    let primary = primary.trim();
    let secondary = secondary.trim();
    match (primary.is_empty(), secondary.is_empty()) {
        (false, false) => Some(format!("{primary} {secondary}")),
        (true, false) => Some(secondary.to_string()),
        _ => None,
    }
}

/// Folds the second `<thead>` into the first one, column by column.
///
/// Tables with fewer than two header blocks come back unchanged. When the
/// blocks have different widths only the overlapping prefix is merged.
#[must_use]
pub fn merge_table_header_thead(mut table: HtmlTable) -> HtmlTable {
    let head_indices = table
        .sections
        .iter()
        .enumerate()
        .filter(|(_, section)| section.kind == SectionKind::Head)
        .map(|(index, _)| index)
        .take(2)
        .collect::<Vec<_>>();
    let [primary_index, secondary_index] = head_indices[..] else {
        return table;
    };

    let secondary = table.sections.remove(secondary_index);
    let secondary_texts = secondary
        .header_cells()
        .map(|cell| cell.text.clone())
        .collect::<Vec<_>>();

    let primary = &mut table.sections[primary_index];
    let mut primary_width = 0;
    for (index, cell) in primary.header_cells_mut().enumerate() {
        let merged = secondary_texts
            .get(index)
            .and_then(|secondary_text| merged_header_text(&cell.text, secondary_text));
        if let Some(merged) = merged {
            cell.text = merged;
        }
        cell.colspan = None;
        cell.rowspan = None;
        primary_width += 1;
    }

    if primary_width != secondary_texts.len() {
        debug!(
            primary = primary_width,
            secondary = secondary_texts.len(),
            "header blocks differ in width; merged the overlapping prefix only"
        );
    }

    table
}

/// Keeps only ASCII letters, digits and whitespace in every `<th>`; blank
/// names become `-`.
#[must_use]
pub fn clean_html_table_header_names(mut table: HtmlTable) -> HtmlTable {
    for section in &mut table.sections {
        for cell in section.header_cells_mut() {
            let cleaned = HEADER_JUNK.replace_all(&cell.text, "");
            cell.text = if cleaned.trim().is_empty() {
                BLANK_HEADER_PLACEHOLDER.to_string()
            } else {
                cleaned.into_owned()
            };
        }
    }
    table
}
