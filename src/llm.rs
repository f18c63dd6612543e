//! Language-model provider trait.

use async_trait::async_trait;

use crate::error::Result;

/// An opaque prompt-in, text-out language-model call.
///
/// The pipeline treats generation as a synchronous request/response exchange
/// with a single failure class:
/// [`RagError::GenerationFailed`](crate::RagError::GenerationFailed).
/// Generation is never retried automatically; a caller may retry the whole
/// query instead.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate text for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
