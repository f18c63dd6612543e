//! Query-time retrieval: embed the question, search the store, rank.

use std::sync::Arc;

use tracing::debug;

use crate::document::Candidate;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::retry::RetryPolicy;
use crate::store::{Metric, VectorStore};

/// Default number of candidates retrieved per query.
pub const DEFAULT_TOP_K: usize = 5;

/// Upper bound for caller-supplied `k`. Out-of-range values are clamped,
/// not rejected.
pub const MAX_TOP_K: usize = 50;

/// Orchestrates query embedding and vector-store search.
///
/// The retriever only reads from the store; it owns no persisted state.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    retry: RetryPolicy,
}

impl Retriever {
    /// Create a retriever over the given embedding provider and store.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        retry: RetryPolicy,
    ) -> Self {
        Self { embedder, store, retry }
    }

    /// Retrieve the `k` nearest chunks to the question, ranked ascending by
    /// cosine distance.
    ///
    /// `k` defaults to [`DEFAULT_TOP_K`] and is clamped into
    /// `1..=MAX_TOP_K`. An empty corpus is a valid result (empty list), not
    /// an error. Transient embedding and store failures are retried per the
    /// injected [`RetryPolicy`].
    pub async fn retrieve(&self, question: &str, k: Option<usize>) -> Result<Vec<Candidate>> {
        let k = k.unwrap_or(DEFAULT_TOP_K).clamp(1, MAX_TOP_K);

        let vector = self.retry.run("embed_query", || self.embedder.embed(question)).await?;

        let candidates = self
            .retry
            .run("vector_query", || self.store.query(&vector, k, Metric::Cosine))
            .await?;

        debug!(k, candidate_count = candidates.len(), "retrieval completed");
        Ok(candidates)
    }
}
