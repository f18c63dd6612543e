//! Error types for the `docrag` crate.

use thiserror::Error;

/// Errors that can occur in the retrieval-and-answer pipeline.
///
/// Context insufficiency is *not* an error; it is a valid terminal verdict
/// of the sufficiency evaluator (see [`Verdict`](crate::sufficiency::Verdict)).
#[derive(Debug, Error)]
pub enum RagError {
    /// A fatal configuration error (e.g. embedding dimension mismatch,
    /// overlap >= chunk size). Detected at construction time, never retried.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// A provider could not be reached or returned a transient failure.
    /// Retryable with backoff.
    #[error("provider unavailable ({provider}): {message}")]
    ProviderUnavailable {
        /// The provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A provider rejected the input. The caller must fix the input;
    /// retrying will not help.
    #[error("provider rejected input ({provider}): {message}")]
    ProviderRejected {
        /// The provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// Input text exceeds the provider's limit. The caller must shorten or
    /// re-chunk the text; nothing is silently truncated.
    #[error("input too long: {length} characters exceeds the limit of {max}")]
    TooLong {
        /// Length of the offending input in characters.
        length: usize,
        /// The maximum accepted length.
        max: usize,
    },

    /// An error in the vector store backend.
    #[error("vector store error: {message}")]
    StoreError {
        /// A description of the failure.
        message: String,
        /// Whether the backend considers the failure transient.
        retryable: bool,
    },

    /// The language-model provider failed to produce an answer. Surfaced to
    /// the caller as a failed answer attempt; never retried automatically.
    #[error("generation failed: {0}")]
    GenerationFailed(String),
}

impl RagError {
    /// Whether this error may be retried with backoff.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ProviderUnavailable { .. } => true,
            Self::StoreError { retryable, .. } => *retryable,
            _ => false,
        }
    }
}

/// A convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, RagError>;
