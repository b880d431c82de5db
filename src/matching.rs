use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w\s]").expect("hardcoded non-word regex is valid")
});

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("hardcoded whitespace regex is valid"));

/// Score given when one normalized name contains the other.
pub const SUBSTRING_SCORE: f32 = 0.8;

/// A column is accepted only when its score is strictly above this.
pub const COLUMN_MATCH_THRESHOLD: f32 = 0.5;

/// Lowercases, reads underscores as spaces, drops punctuation and collapses
/// whitespace.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase().replace('_', " ");
    let stripped = NON_WORD.replace_all(&lowered, "");
    WHITESPACE_RUN
        .replace_all(&stripped, " ")
        .trim()
        .to_string()
}

fn word_overlap(query_words: &HashSet<&str>, header_words: &HashSet<&str>) -> f32 {
    if query_words.is_empty() || header_words.is_empty() {
        return 0.0;
    }
    let common = query_words.intersection(header_words).count();
    common as f32 / query_words.len().max(header_words.len()) as f32
}

pub(crate) fn accepts_score(score: f32) -> bool {
    score > COLUMN_MATCH_THRESHOLD
}

/// Similarity of a normalized query to a normalized header; `None` for an
/// exact match.
fn header_score(normalized_query: &str, normalized_header: &str) -> Option<f32> {
    if normalized_query == normalized_header {
        return None;
    }
    let both_named = !normalized_query.is_empty() && !normalized_header.is_empty();
    if both_named
        && (normalized_header.contains(normalized_query)
            || normalized_query.contains(normalized_header))
    {
        return Some(SUBSTRING_SCORE);
    }

    let query_words = normalized_query.split_whitespace().collect::<HashSet<_>>();
    let header_words = normalized_header.split_whitespace().collect::<HashSet<_>>();
    Some(word_overlap(&query_words, &header_words))
}

/// Best header for `query_field` with its score, exact matches scoring `1.0`.
#[must_use]
pub fn best_column_match<S: AsRef<str>>(query_field: &str, headers: &[S]) -> Option<(usize, f32)> {
    let normalized_query = normalize_text(query_field);

    let mut best: Option<(usize, f32)> = None;
    for (index, header) in headers.iter().enumerate() {
        let normalized_header = normalize_text(header.as_ref());
        let Some(score) = header_score(&normalized_query, &normalized_header) else {
            return Some((index, 1.0));
        };

        let improves = best.is_none_or(|(_, best_score)| score > best_score);
        if improves && accepts_score(score) {
            best = Some((index, score));
        }
    }
    best
}

/// Highest score any header reaches, accepted or not.
fn closest_score<S: AsRef<str>>(query_field: &str, headers: &[S]) -> f32 {
    let normalized_query = normalize_text(query_field);
    headers
        .iter()
        .map(|header| {
            header_score(&normalized_query, &normalize_text(header.as_ref())).unwrap_or(1.0)
        })
        .fold(0.0, f32::max)
}

/// Index of the header that best matches `query_field`, if any scores above
/// [`COLUMN_MATCH_THRESHOLD`]. Earlier headers win ties.
///
/// A field or header that normalizes to an empty string is never treated as
/// a substring of the other, so blank and placeholder headers match nothing.
#[must_use]
pub fn find_best_column_match<S: AsRef<str>>(query_field: &str, headers: &[S]) -> Option<usize> {
    best_column_match(query_field, headers).map(|(index, _)| index)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMatch {
    pub field: String,
    pub column: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    pub score: f32,
}

impl ColumnMatch {
    pub(crate) fn resolve<S: AsRef<str>>(field: &str, headers: &[S]) -> Self {
        match best_column_match(field, headers) {
            Some((index, score)) => Self {
                field: field.to_string(),
                column: Some(index),
                header: Some(headers[index].as_ref().to_string()),
                score,
            },
            None => Self {
                field: field.to_string(),
                column: None,
                header: None,
                score: closest_score(field, headers),
            },
        }
    }
}
