//! Vector store trait and similarity metrics.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::{Candidate, StoredRecord};
use crate::error::Result;

/// Distance metric for similarity queries.
///
/// The exposed operator is cosine distance, defined as
/// `1 - cosine_similarity` with range `[0, 2]`; lower is more similar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    /// Cosine distance: `1 - cosine_similarity`.
    #[default]
    Cosine,
}

impl Metric {
    /// Compute the distance between two vectors under this metric.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::Cosine => 1.0 - cosine_similarity(a, b),
        }
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// A storage backend for embedding vectors with similarity search.
///
/// The store exclusively owns persisted vectors; the retrieval side only
/// reads. Implementations must make concurrent `upsert`/`query`/
/// `delete_document` calls individually atomic at the record level: no query
/// ever observes a half-written record.
///
/// Index maintenance (approximate-nearest-neighbor structures and the like)
/// is an internal optimization. ANN modes trade exact-top-k recall for speed
/// at very large corpus sizes and must not change the correctness of ranked
/// results; implementations default to exact search for small corpora.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// The embedding dimension this store was initialized with.
    ///
    /// Vectors of any other dimension are rejected with
    /// [`RagError::ConfigError`](crate::RagError::ConfigError).
    fn dimensions(&self) -> usize;

    /// Insert or replace records, keyed by record id.
    ///
    /// Idempotent per id: re-inserting an existing id replaces the prior
    /// record atomically.
    async fn upsert(&self, records: Vec<StoredRecord>) -> Result<()>;

    /// Return at most `k` candidates sorted ascending by distance.
    ///
    /// Ties are broken by insertion order, so identical inputs always yield
    /// identical rankings. An empty store yields an empty list, not an error.
    async fn query(&self, vector: &[f32], k: usize, metric: Metric) -> Result<Vec<Candidate>>;

    /// Remove all records belonging to a document. Returns the number of
    /// records removed.
    async fn delete_document(&self, document_id: &str) -> Result<usize>;
}
