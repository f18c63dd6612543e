//! The RAG pipeline orchestrator.
//!
//! [`RagPipeline`] composes the chunker, embedding provider, vector store,
//! retriever, sufficiency evaluator, and answer synthesizer into the two
//! caller-facing operations: [`process`](RagPipeline::process) (ingestion)
//! and [`query`](RagPipeline::query).
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docrag::{InMemoryVectorStore, RagConfig, RagPipeline};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new(1536)))
//!     .language_model(Arc::new(model))
//!     .build()?;
//!
//! let report = pipeline.process(&document).await?;
//! let result = pipeline.query("What was Q3 revenue?", None).await?;
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::chunking::TextChunker;
use crate::config::RagConfig;
use crate::document::{Document, StoredRecord};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::llm::LanguageModel;
use crate::retriever::Retriever;
use crate::retry::RetryPolicy;
use crate::store::VectorStore;
use crate::sufficiency::{Evaluation, SufficiencyEvaluator, TraceStep, steps};
use crate::synthesis::{AnswerResult, AnswerSynthesizer};

/// Outcome of one ingestion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngestStatus {
    /// Every chunk was embedded and stored.
    Success,
    /// Some chunks failed; the rest were stored.
    PartialFailure,
    /// No chunk could be stored.
    Failure,
}

/// Report returned by [`RagPipeline::process`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    /// Number of chunks stored for the document.
    pub chunks_created: usize,
    /// Whether ingestion succeeded fully, partially, or not at all.
    pub status: IngestStatus,
}

/// The retrieval-and-answer pipeline.
///
/// Each ingestion or query runs as one sequential pipeline invocation.
/// Concurrent requests are safe: the vector store is the only shared mutable
/// resource and serializes record-level mutations itself. There is no
/// mid-pipeline cancellation point; wrap calls in a caller-level timeout if
/// needed.
pub struct RagPipeline {
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    retriever: Retriever,
    evaluator: SufficiencyEvaluator,
    synthesizer: AnswerSynthesizer,
    retry: RetryPolicy,
    config: RagConfig,
}

impl std::fmt::Debug for RagPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Ingest a document: chunk, embed, store.
    ///
    /// Reprocessing a document id supersedes its prior records: they are
    /// deleted before the new chunks are written. A failure on one chunk
    /// never aborts its siblings: the batch embedding call falls back to
    /// per-chunk embedding and failures are counted into the report's
    /// [`IngestStatus`].
    ///
    /// # Errors
    ///
    /// Returns an error only for store-level faults that prevent any write
    /// (after retries) or fatal configuration errors such as an embedding
    /// dimension mismatch.
    pub async fn process(&self, document: &Document) -> Result<IngestReport> {
        let chunks = self.chunker.chunk(document);
        if chunks.is_empty() {
            info!(document.id = %document.id, chunks_created = 0, "document has no text to ingest");
            return Ok(IngestReport { chunks_created: 0, status: IngestStatus::Success });
        }
        let total = chunks.len();

        let superseded = self
            .retry
            .run("delete_prior_records", || self.store.delete_document(&document.id))
            .await?;
        if superseded > 0 {
            info!(document.id = %document.id, superseded, "superseded prior records for document");
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let mut records = Vec::with_capacity(total);
        let mut failed = 0usize;

        match self.retry.run("embed_batch", || self.embedder.embed_batch(&texts)).await {
            Ok(embeddings) => {
                for (chunk, embedding) in chunks.iter().zip(embeddings) {
                    records.push(StoredRecord::from_chunk(
                        chunk.clone(),
                        document.source_name.as_str(),
                        embedding,
                    ));
                }
            }
            Err(batch_err) => {
                // One bad chunk must not sink its siblings.
                warn!(
                    document.id = %document.id,
                    error = %batch_err,
                    "batch embedding failed; embedding chunks individually"
                );
                for chunk in &chunks {
                    match self.retry.run("embed_chunk", || self.embedder.embed(&chunk.text)).await
                    {
                        Ok(embedding) => records.push(StoredRecord::from_chunk(
                            chunk.clone(),
                            document.source_name.as_str(),
                            embedding,
                        )),
                        Err(e) => {
                            failed += 1;
                            error!(
                                document.id = %document.id,
                                chunk.index = chunk.index,
                                error = %e,
                                "chunk embedding failed"
                            );
                        }
                    }
                }
            }
        }

        if records.is_empty() {
            error!(document.id = %document.id, total, "no chunk could be embedded");
            return Ok(IngestReport { chunks_created: 0, status: IngestStatus::Failure });
        }

        let chunks_created = records.len();
        self.retry.run("upsert_records", || self.store.upsert(records.clone())).await?;

        let status =
            if failed == 0 { IngestStatus::Success } else { IngestStatus::PartialFailure };
        info!(
            document.id = %document.id,
            chunks_created,
            failed,
            ?status,
            "ingested document"
        );
        Ok(IngestReport { chunks_created, status })
    }

    /// Answer a question from the ingested corpus.
    ///
    /// `limit` overrides the number of candidates retrieved; out-of-range
    /// values are clamped, not rejected. Retrieval-stage failures fold into
    /// a fail-safe `Insufficient` result so the caller always receives a
    /// well-formed [`AnswerResult`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::GenerationFailed`] if answer generation fails
    /// (not retried; the caller may retry the whole query) or
    /// [`RagError::ConfigError`] for fatal configuration faults.
    pub async fn query(&self, question: &str, limit: Option<usize>) -> Result<AnswerResult> {
        let limit = limit.or(Some(self.config.top_k));
        let candidates = match self.retriever.retrieve(question, limit).await {
            Ok(candidates) => candidates,
            Err(e @ RagError::ConfigError(_)) => return Err(e),
            Err(e) => {
                warn!(error = %e, "retrieval failed; failing safe to insufficient");
                let trace = vec![TraceStep::new(
                    steps::RETRIEVAL_FAILED,
                    format!("retrieval failed ({e}); failing safe to insufficient"),
                )];
                return self.synthesizer.answer(question, &[], Evaluation::insufficient(trace)).await;
            }
        };

        let evaluation = self.evaluator.evaluate(question, &candidates).await;
        self.synthesizer.answer(question, &candidates, evaluation).await
    }

    /// Remove all stored records for a document. Returns the number removed.
    pub async fn delete_document(&self, document_id: &str) -> Result<usize> {
        let removed = self
            .retry
            .run("delete_document", || self.store.delete_document(document_id))
            .await?;
        info!(document_id, removed, "deleted document records");
        Ok(removed)
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// `config` and `retry_policy` are optional and default; the providers and
/// the store are required.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    language_model: Option<Arc<dyn LanguageModel>>,
    retry_policy: Option<RetryPolicy>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration (defaults to [`RagConfig::default`]).
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the language model used for sufficiency judgment and synthesis.
    pub fn language_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.language_model = Some(model);
        self
    }

    /// Set the retry policy for transient provider and store failures
    /// (defaults to [`RetryPolicy::default`]).
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Build the [`RagPipeline`], validating configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required component is missing,
    /// the configuration is inconsistent, or the embedding provider's
    /// dimensionality does not match the vector store's. The dimension
    /// mismatch is fatal here, at startup, never at query time.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let embedder = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;
        let model = self
            .language_model
            .ok_or_else(|| RagError::ConfigError("language_model is required".to_string()))?;
        let retry = self.retry_policy.unwrap_or_default();

        if embedder.dimensions() != store.dimensions() {
            return Err(RagError::ConfigError(format!(
                "embedding provider produces {}-dimensional vectors, store was initialized with {}",
                embedder.dimensions(),
                store.dimensions()
            )));
        }

        let chunker = TextChunker::from_config(&config)?;
        let retriever = Retriever::new(Arc::clone(&embedder), Arc::clone(&store), retry.clone());
        let evaluator = SufficiencyEvaluator::new(Arc::clone(&model));
        let synthesizer = AnswerSynthesizer::new(model);

        Ok(RagPipeline {
            chunker,
            embedder,
            store,
            retriever,
            evaluator,
            synthesizer,
            retry,
            config,
        })
    }
}
