use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Str,
    Int,
    Float,
    /// Any other declared type; values are kept as text.
    Other(String),
}

impl FieldType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for FieldType {
    fn from(name: &str) -> Self {
        match name {
            "str" => Self::Str,
            "int" => Self::Int,
            "float" => Self::Float,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

fn items_object(query: &Value) -> Option<&Value> {
    match query {
        Value::Object(_) => Some(query),
        Value::Array(entries) => entries.first(),
        _ => None,
    }
}

fn fields_from_query(query: &Value) -> Option<Vec<FieldSpec>> {
    let example = items_object(query)?
        .get("items")?
        .as_array()?
        .first()?
        .as_object()?;

    Some(
        example
            .iter()
            .map(|(name, declared)| {
                let field_type = match declared {
                    Value::String(type_name) => FieldType::from(type_name.as_str()),
                    other => FieldType::Other(other.to_string()),
                };
                FieldSpec::new(name.clone(), field_type)
            })
            .collect(),
    )
}

/// Flattens a table query such as `[{'items': [{'name': 'str'}]}]` into
/// its field list.
///
/// Only the first query is read. Both the bare `{'items': [...]}` object and
/// the single-element list wrapping it are accepted. Anything that does not
/// parse or lacks an `items` example yields no fields.
#[must_use]
pub fn parse_query_structure<S: AsRef<str>>(table_queries: &[S]) -> Vec<FieldSpec> {
    let Some(first) = table_queries.first() else {
        return Vec::new();
    };

    let normalized = first.as_ref().replace('\'', "\"");
    let query = match serde_json::from_str::<Value>(&normalized) {
        Ok(query) => query,
        Err(error) => {
            debug!(%error, "table query is not valid JSON");
            return Vec::new();
        }
    };

    fields_from_query(&query).unwrap_or_else(|| {
        debug!("table query has no 'items' example object");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{FieldSpec, FieldType, parse_query_structure};

    #[test]
    fn parses_list_wrapped_query_in_declaration_order() {
        let fields = parse_query_structure(&[
            "[{'items': [{'instrument_name': 'str', 'valuation': 'int', 'rate': 'float'}]}]",
        ]);
        assert_eq!(
            fields,
            vec![
                FieldSpec::new("instrument_name", FieldType::Str),
                FieldSpec::new("valuation", FieldType::Int),
                FieldSpec::new("rate", FieldType::Float),
            ]
        );
    }

    #[test]
    fn parses_bare_object_query() {
        let fields = parse_query_structure(&[r#"{"items": [{"date": "date"}]}"#]);
        assert_eq!(
            fields,
            vec![FieldSpec::new("date", FieldType::Other("date".to_string()))]
        );
    }

    #[test]
    fn uses_only_the_first_query() {
        let fields = parse_query_structure(&[
            "{'items': [{'a': 'str'}]}".to_string(),
            "{'items': [{'b': 'int'}]}".to_string(),
        ]);
        assert_eq!(fields, vec![FieldSpec::new("a", FieldType::Str)]);
    }

    #[test]
    fn malformed_queries_yield_no_fields() {
        let empty: [&str; 0] = [];
        assert!(parse_query_structure(&empty).is_empty());
        assert!(parse_query_structure(&["not json"]).is_empty());
        assert!(parse_query_structure(&["{'rows': [{'a': 'str'}]}"]).is_empty());
        assert!(parse_query_structure(&["{'items': []}"]).is_empty());
        assert!(parse_query_structure(&["{'items': 'str'}"]).is_empty());
        assert!(parse_query_structure(&["[]"]).is_empty());
    }

    #[test]
    fn non_string_types_are_kept_as_text_types() {
        let fields = parse_query_structure(&["{'items': [{'tags': ['str']}]}"]);
        assert_eq!(fields[0].field_type, FieldType::Other(r#"["str"]"#.to_string()));
    }

    #[test]
    fn serializes_with_type_key() {
        let json = serde_json::to_string(&FieldSpec::new("qty", FieldType::Int)).expect("json");
        assert_eq!(json, r#"{"name":"qty","type":"int"}"#);
    }
}
