//! Data types for documents, chunks, stored records, and query candidates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A source document with extracted plain text.
///
/// Documents are immutable: reprocessing a document supersedes its prior
/// records rather than mutating them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// Human-readable name of the source (e.g. a file name).
    pub source_name: String,
    /// The extracted plain text of the document.
    pub text: String,
    /// Format tag of the original file (e.g. `pdf`, `docx`, `txt`).
    pub format: String,
}

impl Document {
    /// Create a document with the given identifier and content.
    pub fn new(
        id: impl Into<String>,
        source_name: impl Into<String>,
        text: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_name: source_name.into(),
            text: text.into(),
            format: format.into(),
        }
    }
}

/// A bounded contiguous span of a document's text, the atomic retrieval unit.
///
/// Chunk indices are zero-based and contiguous within a document. Chunk size
/// and overlap are configuration-time constants, not per-chunk state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// Zero-based position of this chunk within the document.
    pub index: usize,
    /// The text span of this chunk.
    pub text: String,
}

/// The persisted unit in the vector store.
///
/// Created at ingestion time and never mutated; removed only by explicit
/// document reprocessing or removal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredRecord {
    /// Unique identifier for the record.
    pub id: String,
    /// The ID of the owning document.
    pub document_id: String,
    /// Human-readable name of the document's source.
    pub source_name: String,
    /// Zero-based position of the underlying chunk within the document.
    pub chunk_index: usize,
    /// The chunk text.
    pub text: String,
    /// The embedding vector for the chunk text.
    pub embedding: Vec<f32>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl StoredRecord {
    /// Build a record from a chunk and its embedding, with a fresh id and
    /// the current time as `created_at`.
    pub fn from_chunk(chunk: Chunk, source_name: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            document_id: chunk.document_id,
            source_name: source_name.into(),
            chunk_index: chunk.index,
            text: chunk.text,
            embedding,
            created_at: Utc::now(),
        }
    }
}

/// A [`StoredRecord`] paired with its distance to a query vector.
///
/// Candidates are transient: they are valid for a single query and are
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// The retrieved record.
    pub record: StoredRecord,
    /// Distance to the query vector; lower is more similar.
    pub distance: f32,
}

/// A reference to a chunk used as evidence for an answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRef {
    /// The id of the stored record.
    pub record_id: String,
    /// The ID of the owning document.
    pub document_id: String,
    /// Zero-based position of the chunk within the document.
    pub chunk_index: usize,
    /// Distance of the chunk to the query vector.
    pub distance: f32,
}

impl From<&Candidate> for SourceRef {
    fn from(candidate: &Candidate) -> Self {
        Self {
            record_id: candidate.record.id.clone(),
            document_id: candidate.record.document_id.clone(),
            chunk_index: candidate.record.chunk_index,
            distance: candidate.distance,
        }
    }
}
