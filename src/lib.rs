//! # docrag
//!
//! Retrieval-Augmented Generation over a personal document corpus.
//!
//! Ingested documents are split into overlapping chunks, embedded into
//! fixed-dimension vectors, and stored in a vector store. Questions are
//! answered by embedding the query, ranking the nearest chunks by cosine
//! distance, judging whether the retrieved context is sufficient, and
//! synthesizing an answer with an auditable reasoning trail.
//!
//! ## Overview
//!
//! - [`TextChunker`]: deterministic overlapping chunking
//! - [`EmbeddingProvider`]: text-to-vector seam ([`OpenAiEmbeddingProvider`])
//! - [`VectorStore`]: persistence + k-NN queries ([`InMemoryVectorStore`])
//! - [`Retriever`]: query embedding + ranked search
//! - [`SufficiencyEvaluator`]: can the context answer the question?
//! - [`AnswerSynthesizer`]: prompt composition + generation
//! - [`RagPipeline`]: the caller-facing `process`/`query` operations
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docrag::{Document, InMemoryVectorStore, OpenAiChatProvider,
//!              OpenAiEmbeddingProvider, RagPipeline};
//!
//! let embedder = Arc::new(OpenAiEmbeddingProvider::from_env()?);
//! let store = Arc::new(InMemoryVectorStore::new(embedder.dimensions()));
//! let model = Arc::new(OpenAiChatProvider::from_env()?);
//!
//! let pipeline = RagPipeline::builder()
//!     .embedding_provider(embedder)
//!     .vector_store(store)
//!     .language_model(model)
//!     .build()?;
//!
//! let doc = Document::new("q3-report", "Q3 Report.pdf", extracted_text, "pdf");
//! pipeline.process(&doc).await?;
//!
//! let result = pipeline.query("What was Q3 revenue?", None).await?;
//! println!("{}", result.answer);
//! for thought in &result.thoughts {
//!     println!("- {}: {}", thought.name, thought.detail);
//! }
//! ```
//!
//! Document-source access, file download, and text extraction are the
//! caller's concern: the pipeline takes a [`Document`] whose text has
//! already been extracted to plain text.

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod memory;
pub mod openai;
pub mod pipeline;
pub mod retriever;
pub mod retry;
pub mod store;
pub mod sufficiency;
pub mod synthesis;

pub use chunking::TextChunker;
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Candidate, Chunk, Document, SourceRef, StoredRecord};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use llm::LanguageModel;
pub use memory::InMemoryVectorStore;
pub use openai::{OpenAiChatProvider, OpenAiEmbeddingProvider};
pub use pipeline::{IngestReport, IngestStatus, RagPipeline, RagPipelineBuilder};
pub use retriever::{DEFAULT_TOP_K, MAX_TOP_K, Retriever};
pub use retry::RetryPolicy;
pub use store::{Metric, VectorStore, cosine_similarity};
pub use sufficiency::{Evaluation, SufficiencyEvaluator, TraceStep, Verdict};
pub use synthesis::{AnswerResult, AnswerSynthesizer, NO_CONTEXT_ANSWER};
