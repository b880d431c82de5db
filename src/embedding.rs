//! Text embeddings used to compare header names with requested columns.
//!
//! The normalizer never loads a model itself: callers build an [`Embedder`]
//! once and pass it by reference into every call. [`LexicalEmbedder`] is the
//! offline default; hosts wanting semantic similarity plug a neural model in
//! behind the same trait.

use xxhash_rust::xxh3::xxh3_64;

use crate::error::TableError;

pub trait Embedder {
    /// Embeds each text into a vector; all vectors share one dimension.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, TableError>;
}

impl<E: Embedder + ?Sized> Embedder for &E {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, TableError> {
        (**self).embed(texts)
    }
}

/// Cosine similarity; zero when either vector has no magnitude.
#[must_use]
pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f32 {
    let dot = left.iter().zip(right).map(|(a, b)| a * b).sum::<f32>();
    let left_norm = left.iter().map(|value| value * value).sum::<f32>().sqrt();
    let right_norm = right.iter().map(|value| value * value).sum::<f32>().sqrt();
    if left_norm == 0.0 || right_norm == 0.0 {
        return 0.0;
    }
    dot / (left_norm * right_norm)
}

/// Similarity of every `column` to every `target`, one row per column.
pub fn similarity_matrix(
    embedder: &dyn Embedder,
    columns: &[String],
    targets: &[String],
) -> Result<Vec<Vec<f32>>, TableError> {
    let column_vectors = embedder.embed(columns)?;
    let target_vectors = embedder.embed(targets)?;
    if column_vectors.len() != columns.len() || target_vectors.len() != targets.len() {
        return Err(TableError::Embedding(format!(
            "expected {} column and {} target vectors, got {} and {}",
            columns.len(),
            targets.len(),
            column_vectors.len(),
            target_vectors.len()
        )));
    }

    Ok(column_vectors
        .iter()
        .map(|column| {
            target_vectors
                .iter()
                .map(|target| cosine_similarity(column, target))
                .collect()
        })
        .collect())
}

const DEFAULT_DIMENSIONS: usize = 512;

/// Hashed bag of words and character trigrams.
///
/// Names sharing words or spelling score high, unrelated names score near
/// zero. It has no notion of synonyms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexicalEmbedder {
    dimensions: usize,
}

impl Default for LexicalEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_DIMENSIONS,
        }
    }
}

impl LexicalEmbedder {
    pub fn with_dimensions(dimensions: usize) -> Result<Self, TableError> {
        if dimensions == 0 {
            return Err(TableError::InvalidOption(
                "embedding dimensions must be at least 1".to_string(),
            ));
        }
        Ok(Self { dimensions })
    }

    fn bucket(&self, feature: &str) -> usize {
        (xxh3_64(feature.as_bytes()) % self.dimensions as u64) as usize
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimensions];
        let lowered = text.to_lowercase();
        let words = lowered
            .split(|ch: char| !ch.is_alphanumeric())
            .filter(|word| !word.is_empty());

        for word in words {
            vector[self.bucket(&format!("w:{word}"))] += 1.0;

            let padded = format!("#{word}#").chars().collect::<Vec<_>>();
            for gram in padded.windows(3) {
                let gram = gram.iter().collect::<String>();
                vector[self.bucket(&format!("g:{gram}"))] += 1.0;
            }
        }

        vector
    }
}

impl Embedder for LexicalEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, TableError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}
