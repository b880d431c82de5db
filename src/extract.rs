use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::convert::{CellValue, convert_value};
use crate::html::parse_table;
use crate::matching::ColumnMatch;
use crate::model::{CellKind, HtmlTable};
use crate::schema::{FieldSpec, parse_query_structure};
use crate::warning::{ExtractWarning, WarningCode};

pub type ExtractedItem = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionResult {
    pub items: Vec<ExtractedItem>,
}

impl ExtractionResult {
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(Map::from_iter([(
            "items".to_string(),
            Value::Array(self.items.iter().cloned().map(Value::Object).collect()),
        )]))
    }
}

/// Why nothing was extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// The query declared no usable fields.
    NoFields,
    /// The input holds no `<table>`.
    NoTable,
    /// The table has no `<thead>` header row.
    NoHeader,
}

/// Outcome of one extraction call.
///
/// `Extracted` may still hold zero items (a header but no body rows);
/// `Empty` means extraction was never attempted. Both serialize to the same
/// `{"items": [...]}` shape.
#[derive(Debug, Clone, PartialEq)]
pub enum TableExtraction {
    Extracted(ExtractionResult),
    Empty(EmptyReason),
}

impl TableExtraction {
    #[must_use]
    pub fn item_count(&self) -> usize {
        match self {
            Self::Extracted(result) => result.items.len(),
            Self::Empty(_) => 0,
        }
    }

    #[must_use]
    pub fn empty_reason(&self) -> Option<EmptyReason> {
        match self {
            Self::Extracted(_) => None,
            Self::Empty(reason) => Some(*reason),
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Extracted(result) => result.to_json(),
            Self::Empty(_) => ExtractionResult::default().to_json(),
        }
    }
}

impl Serialize for TableExtraction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Extracted(result) => result.serialize(serializer),
            Self::Empty(_) => ExtractionResult::default().serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionReport {
    pub row_count: usize,
    pub mappings: Vec<ColumnMatch>,
    pub warnings: Vec<ExtractWarning>,
}

/// Header names from the first row of the first `<thead>`, preferring `<th>`
/// cells and falling back to `<td>`.
fn header_names(table: &HtmlTable) -> Vec<String> {
    let Some(row) = table.first_head().and_then(|head| head.rows.first()) else {
        return Vec::new();
    };

    let of_kind = |kind: CellKind| {
        row.cells
            .iter()
            .filter(|cell| cell.kind == kind)
            .map(|cell| cell.trimmed().to_string())
            .collect::<Vec<_>>()
    };

    let headers = of_kind(CellKind::Header);
    if headers.is_empty() {
        of_kind(CellKind::Data)
    } else {
        headers
    }
}

fn extract_rows(
    table: &HtmlTable,
    fields: &[FieldSpec],
    mappings: &[ColumnMatch],
    warnings: &mut Vec<ExtractWarning>,
) -> Vec<ExtractedItem> {
    let Some(body) = table.first_body() else {
        return Vec::new();
    };

    let mut items = Vec::new();
    for (row_index, row) in body.rows.iter().enumerate() {
        let cells = row.data_cells().collect::<Vec<_>>();
        if cells.is_empty() {
            continue;
        }

        let mut item = ExtractedItem::new();
        for (field, mapping) in fields.iter().zip(mappings) {
            let value = match mapping.column {
                Some(column) => match cells.get(column) {
                    Some(cell) => convert_value(cell.trimmed(), &field.field_type),
                    None => {
                        warnings.push(
                            ExtractWarning::new(
                                WarningCode::ShortRow,
                                "row has no cell for the mapped column",
                            )
                            .with_row(row_index)
                            .with_column(field.name.clone()),
                        );
                        CellValue::Null
                    }
                },
                None => CellValue::Null,
            };
            item.insert(field.name.clone(), value.into());
        }
        items.push(item);
    }

    items
}

/// Extracts `table_html` according to the first query in `table_queries` and
/// reports how each field was mapped.
#[must_use]
pub fn extract_table_with_report<S: AsRef<str>>(
    table_queries: &[S],
    table_html: &str,
) -> (TableExtraction, ExtractionReport) {
    let mut report = ExtractionReport::default();

    let fields = parse_query_structure(table_queries);
    if fields.is_empty() {
        return (TableExtraction::Empty(EmptyReason::NoFields), report);
    }

    let Some(table) = parse_table(table_html) else {
        return (TableExtraction::Empty(EmptyReason::NoTable), report);
    };

    let headers = header_names(&table);
    if headers.is_empty() {
        return (TableExtraction::Empty(EmptyReason::NoHeader), report);
    }

    report.mappings = fields
        .iter()
        .map(|field| ColumnMatch::resolve(&field.name, &headers))
        .collect();
    for mapping in &report.mappings {
        debug!(
            field = %mapping.field,
            column = ?mapping.column,
            score = mapping.score,
            "column mapping"
        );
        if mapping.column.is_none() {
            report.warnings.push(
                ExtractWarning::new(
                    WarningCode::UnmappedField,
                    "no header matches the field; values are null",
                )
                .with_column(mapping.field.clone())
                .with_score(mapping.score),
            );
        }
    }

    let items = extract_rows(&table, &fields, &report.mappings, &mut report.warnings);
    report.row_count = items.len();
    (
        TableExtraction::Extracted(ExtractionResult { items }),
        report,
    )
}

/// Extracts a JSON table from HTML using fuzzy header matching.
#[must_use]
pub fn fetch_table_data<S: AsRef<str>>(table_queries: &[S], table_html: &str) -> TableExtraction {
    extract_table_with_report(table_queries, table_html).0
}
