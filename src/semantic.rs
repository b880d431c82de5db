//! Embedding-based column picking across one or more tables.
//!
//! Unlike the schema extractor, which maps fields onto headers by spelling,
//! this matches target names to header names by embedding similarity and
//! returns the raw cell text.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::embedding::{Embedder, similarity_matrix};
use crate::error::TableError;
use crate::header::clean_html_table_header_names;
use crate::html::parse_table;
use crate::model::HtmlTable;
use crate::options::SemanticOptions;
use crate::pipeline::merge_html_table_headers;

/// A target is assigned to its closest column only above this score.
pub const TARGET_SIMILARITY_THRESHOLD: f32 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnAssignment {
    pub column: usize,
    pub target: String,
    pub score: f32,
}

/// Targets matched to columns, ordered by column index, plus the targets
/// left over.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimilarityAssignment {
    pub assignments: Vec<ColumnAssignment>,
    pub unprocessed: Vec<String>,
}

pub struct SemanticExtractor<'a> {
    embedder: &'a dyn Embedder,
}

impl<'a> SemanticExtractor<'a> {
    #[must_use]
    pub fn new(embedder: &'a dyn Embedder) -> Self {
        Self { embedder }
    }

    /// Extracts `target_columns` from each table in turn.
    ///
    /// Results land under `items1`, `items2`, ... in table order. Processing
    /// stops at the first table reached with no targets left, which only
    /// happens with `update_targets`. Returns the answer and the targets the
    /// last processed table could not place.
    pub fn read_data<S: AsRef<str>>(
        &self,
        target_columns: &[String],
        tables: &[S],
        column_keywords: Option<&[String]>,
        options: &SemanticOptions,
    ) -> Result<(Value, Vec<String>), TableError> {
        let mut answer = Map::new();
        let mut targets = target_columns.to_vec();
        let mut unprocessed = Vec::new();

        for (index, table) in tables.iter().enumerate() {
            if targets.is_empty() {
                break;
            }

            let (section, left_over) =
                self.read_data_from_table(&targets, table.as_ref(), column_keywords, options)?;
            answer.insert(format!("items{}", index + 1), section);
            unprocessed = left_over;

            if options.update_targets {
                targets.clone_from(&unprocessed);
            }
        }

        Ok((Value::Object(answer), unprocessed))
    }

    fn read_data_from_table(
        &self,
        target_columns: &[String],
        table_html: &str,
        column_keywords: Option<&[String]>,
        options: &SemanticOptions,
    ) -> Result<(Value, Vec<String>), TableError> {
        let merged =
            merge_html_table_headers(table_html, column_keywords, self.embedder, options.debug)?;
        let table = parse_table(&merged)
            .map(clean_html_table_header_names)
            .unwrap_or_default();
        let columns = table_column_names(&table);

        if options.debug {
            info!(?columns, targets = ?target_columns, "semantic extraction");
        } else {
            debug!(?columns, targets = ?target_columns, "semantic extraction");
        }

        let similarity = self.calculate_similarity(&columns, target_columns, options.debug)?;
        let extracted =
            extract_columns_from_table(&table, &similarity.assignments, options.group_by_rows);

        Ok((extracted, similarity.unprocessed))
    }

    /// Assigns every target to its most similar column.
    ///
    /// A target scoring at or below [`TARGET_SIMILARITY_THRESHOLD`] is left
    /// unprocessed. When two targets pick the same column the higher score
    /// keeps it; on equal scores the earlier target does.
    pub fn calculate_similarity(
        &self,
        columns: &[String],
        target_columns: &[String],
        debug_output: bool,
    ) -> Result<SimilarityAssignment, TableError> {
        let matrix = similarity_matrix(self.embedder, columns, target_columns)?;

        let mut claimed: BTreeMap<usize, (String, f32)> = BTreeMap::new();
        let mut unprocessed = Vec::new();

        for (target_index, target) in target_columns.iter().enumerate() {
            let best = matrix
                .iter()
                .enumerate()
                .map(|(column, row)| (column, row[target_index]))
                .fold(None, |best: Option<(usize, f32)>, (column, score)| match best {
                    Some((_, best_score)) if best_score >= score => best,
                    _ => Some((column, score)),
                });

            let Some((column, score)) = best else {
                unprocessed.push(target.clone());
                continue;
            };

            let name = &columns[column];
            if debug_output {
                info!(%target, column = %name, column_index = column, score, "closest column");
            } else {
                debug!(%target, column = %name, column_index = column, score, "closest column");
            }

            if score <= TARGET_SIMILARITY_THRESHOLD {
                unprocessed.push(target.clone());
                continue;
            }

            match claimed.get_mut(&column) {
                Some(holder) if score > holder.1 => {
                    let displaced = std::mem::replace(holder, (target.clone(), score));
                    unprocessed.push(displaced.0);
                }
                Some(_) => unprocessed.push(target.clone()),
                None => {
                    claimed.insert(column, (target.clone(), score));
                }
            }
        }

        let assignments = claimed
            .into_iter()
            .map(|(column, (target, score))| ColumnAssignment {
                column,
                target,
                score,
            })
            .collect();

        Ok(SimilarityAssignment {
            assignments,
            unprocessed,
        })
    }
}

fn table_column_names(table: &HtmlTable) -> Vec<String> {
    table
        .first_head()
        .map(|head| head.header_cells().map(|cell| cell.text.clone()).collect())
        .unwrap_or_default()
}

fn clean_value(text: &str) -> String {
    text.trim().replace('|', "").trim().to_string()
}

/// Pulls the assigned columns out of every data row.
///
/// Rows holding any `<th>` are skipped. A row too short for a column yields
/// an empty string there.
#[must_use]
pub fn extract_columns_from_table(
    table: &HtmlTable,
    assignments: &[ColumnAssignment],
    group_by_rows: bool,
) -> Value {
    let rows = table
        .rows()
        .filter(|row| !row.has_header_cells())
        .map(|row| row.data_cells().collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .map(|cells| {
            assignments
                .iter()
                .map(|assignment| {
                    cells
                        .get(assignment.column)
                        .map(|cell| clean_value(&cell.text))
                        .unwrap_or_default()
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    if group_by_rows {
        return Value::Array(
            rows.into_iter()
                .map(|values| {
                    let row = assignments
                        .iter()
                        .zip(values)
                        .map(|(assignment, value)| (assignment.target.clone(), Value::String(value)))
                        .collect::<Map<_, _>>();
                    Value::Object(row)
                })
                .collect(),
        );
    }

    let mut by_column = assignments
        .iter()
        .map(|assignment| (assignment.target.clone(), Vec::with_capacity(rows.len())))
        .collect::<Vec<_>>();
    for values in rows {
        for ((_, column), value) in by_column.iter_mut().zip(values) {
            column.push(Value::String(value));
        }
    }
    Value::Object(
        by_column
            .into_iter()
            .map(|(target, values)| (target, Value::Array(values)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{ColumnAssignment, SemanticExtractor, extract_columns_from_table};
    use crate::embedding::{Embedder, LexicalEmbedder};
    use crate::error::TableError;
    use crate::html::parse_table;
    use crate::options::SemanticOptions;

    /// Looks names up in a fixed table; unknown names embed to zero.
    struct FixedEmbedder(Vec<(&'static str, [f32; 2])>);

    impl Embedder for FixedEmbedder {
        fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, TableError> {
            Ok(texts
                .iter()
                .map(|text| {
                    self.0
                        .iter()
                        .find(|(name, _)| name == text)
                        .map_or_else(|| vec![0.0, 0.0], |(_, vector)| vector.to_vec())
                })
                .collect())
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    const INVOICE: &str = "<table><thead><tr><th>Description</th><th>Qty</th><th>Net Price</th></tr></thead>\
        <tbody><tr><td> Pen |</td><td>2</td><td>1.50</td></tr>\
        <tr><td>Book</td><td>1</td></tr>\
        <tr><th>Total</th><td></td><td>10.50</td></tr></tbody></table>";

    #[test]
    fn higher_score_keeps_a_contested_column() {
        let embedder = FixedEmbedder(vec![
            ("Amount", [1.0, 0.0]),
            ("net", [0.6, 0.8]),
            ("gross", [0.9, 0.436]),
            ("vat", [0.0, 1.0]),
        ]);
        let extractor = SemanticExtractor::new(&embedder);
        let similarity = extractor
            .calculate_similarity(&strings(&["Amount"]), &strings(&["net", "gross", "vat"]), false)
            .expect("similarity");

        assert_eq!(similarity.assignments.len(), 1);
        assert_eq!(similarity.assignments[0].column, 0);
        assert_eq!(similarity.assignments[0].target, "gross");
        assert_eq!(similarity.unprocessed, strings(&["net", "vat"]));
    }

    #[test]
    fn assignments_are_ordered_by_column() {
        let embedder = LexicalEmbedder::default();
        let extractor = SemanticExtractor::new(&embedder);
        let similarity = extractor
            .calculate_similarity(
                &strings(&["Description", "Qty", "Net Price"]),
                &strings(&["net_price", "description"]),
                false,
            )
            .expect("similarity");

        let order = similarity
            .assignments
            .iter()
            .map(|assignment| (assignment.column, assignment.target.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(order, vec![(0, "description"), (2, "net_price")]);
        assert!(similarity.unprocessed.is_empty());
    }

    #[test]
    fn no_columns_leaves_every_target_unprocessed() {
        let embedder = LexicalEmbedder::default();
        let extractor = SemanticExtractor::new(&embedder);
        let similarity = extractor
            .calculate_similarity(&[], &strings(&["qty"]), false)
            .expect("similarity");
        assert!(similarity.assignments.is_empty());
        assert_eq!(similarity.unprocessed, strings(&["qty"]));
    }

    #[test]
    fn extracts_columns_by_row_or_by_column() {
        let table = parse_table(INVOICE).expect("table");
        let assignments = vec![
            ColumnAssignment {
                column: 0,
                target: "description".to_string(),
                score: 1.0,
            },
            ColumnAssignment {
                column: 2,
                target: "net_price".to_string(),
                score: 1.0,
            },
        ];

        assert_eq!(
            extract_columns_from_table(&table, &assignments, true),
            json!([
                {"description": "Pen", "net_price": "1.50"},
                {"description": "Book", "net_price": ""},
            ])
        );
        assert_eq!(
            extract_columns_from_table(&table, &assignments, false),
            json!({"description": ["Pen", "Book"], "net_price": ["1.50", ""]})
        );
    }

    #[test]
    fn read_data_sections_results_per_table() {
        let embedder = LexicalEmbedder::default();
        let extractor = SemanticExtractor::new(&embedder);
        let second = "<table><thead><tr><th>VAT</th></tr></thead><tbody><tr><td>23%</td></tr></tbody></table>";
        let options = SemanticOptions {
            update_targets: true,
            ..SemanticOptions::default()
        };

        let (answer, unprocessed) = extractor
            .read_data(&strings(&["qty", "vat"]), &[INVOICE, second], None, &options)
            .expect("read");

        assert_eq!(
            answer,
            json!({
                "items1": [{"qty": "2"}, {"qty": "1"}],
                "items2": [{"vat": "23%"}],
            })
        );
        assert!(unprocessed.is_empty());
    }

    #[test]
    fn read_data_stops_once_targets_are_exhausted() {
        let embedder = LexicalEmbedder::default();
        let extractor = SemanticExtractor::new(&embedder);
        let options = SemanticOptions {
            update_targets: true,
            ..SemanticOptions::default()
        };

        let (answer, unprocessed) = extractor
            .read_data(&strings(&["qty"]), &[INVOICE, INVOICE], None, &options)
            .expect("read");

        assert_eq!(answer, json!({"items1": [{"qty": "2"}, {"qty": "1"}]}));
        assert!(unprocessed.is_empty());
    }
}
