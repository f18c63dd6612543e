//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that converts text into fixed-dimension embedding vectors.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. The default [`embed_batch`](EmbeddingProvider::embed_batch)
/// implementation calls [`embed`](EmbeddingProvider::embed) sequentially;
/// backends with native batching should override it.
///
/// Contract:
/// - Input must be non-empty after trimming; otherwise the provider fails
///   with [`RagError::ProviderRejected`](crate::RagError::ProviderRejected).
/// - Input exceeding the provider's limit fails with
///   [`RagError::TooLong`](crate::RagError::TooLong); nothing is silently
///   truncated. Callers may truncate or re-chunk before calling.
/// - `embed_batch` preserves input order and returns exactly one vector per
///   input.
/// - Providers do not cache results; content is stored once, keyed by chunk,
///   in the vector store.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// The returned vectors match the input order 1:1.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    ///
    /// This must match the dimension the vector store was initialized with;
    /// a mismatch is a fatal configuration error.
    fn dimensions(&self) -> usize;
}
