use serde::Serialize;
use serde_json::Value;

use crate::schema::FieldType;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl From<CellValue> for Value {
    fn from(value: CellValue) -> Self {
        match value {
            CellValue::Int(number) => Value::from(number),
            CellValue::Float(number) => Value::from(number),
            CellValue::Text(text) => Value::String(text),
            CellValue::Null => Value::Null,
        }
    }
}

fn numeric_chars(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !matches!(ch, '\'' | '\u{2019}'))
        .filter(|ch| ch.is_ascii_digit() || matches!(ch, '.' | '-'))
        .collect()
}

/// Finite number or `0.0`; overflowing digit runs count as unparseable.
fn parse_number(value: &str) -> f64 {
    numeric_chars(value)
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .unwrap_or(0.0)
}

/// Converts raw cell text to the declared field type.
///
/// Numeric types never fail: apostrophe thousands separators, currency
/// symbols and other noise are dropped, and whatever still does not parse
/// becomes `0` / `0.0`. Every other type keeps the trimmed text.
#[must_use]
pub fn convert_value(value: &str, target_type: &FieldType) -> CellValue {
    let value = value.trim();
    match target_type {
        FieldType::Int => {
            // Float-to-int casts truncate toward zero and saturate.
            CellValue::Int(parse_number(value) as i64)
        }
        FieldType::Float => CellValue::Float(parse_number(value)),
        FieldType::Str | FieldType::Other(_) => CellValue::Text(value.to_string()),
    }
}
