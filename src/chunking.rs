//! Document chunking.
//!
//! [`TextChunker`] splits document text into fixed-size overlapping windows
//! measured in characters. Chunking is deterministic: identical text and
//! parameters always produce the identical chunk sequence, which is what
//! makes re-ingestion reproducible and chunk-level tests comparable.

use crate::config::RagConfig;
use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// Splits document text into fixed-size chunks with overlap.
///
/// Windows advance by `chunk_size - overlap` characters, so every chunk
/// after the first repeats the last `overlap` characters of its predecessor.
/// Stripping that prefix from each chunk after the first and concatenating
/// reconstructs the document text exactly.
///
/// Slicing is performed on character boundaries, so multi-byte text is safe.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `chunk_size` is zero or
    /// `overlap >= chunk_size`. Rejection happens here, before any document
    /// is processed.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::ConfigError("chunk_size must be greater than zero".to_string()));
        }
        if overlap >= chunk_size {
            return Err(RagError::ConfigError(format!(
                "overlap ({overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    /// Create a chunker from pipeline configuration.
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Split a document into ordered, non-empty chunks.
    ///
    /// A document shorter than one chunk size yields exactly one chunk.
    /// A document with empty text yields no chunks.
    pub fn chunk(&self, document: &Document) -> Vec<Chunk> {
        // Byte offsets of every char boundary, plus the end of the text.
        let boundaries: Vec<usize> = document
            .text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(document.text.len()))
            .collect();
        let char_count = boundaries.len() - 1;
        if char_count == 0 {
            return Vec::new();
        }

        let step = self.chunk_size - self.overlap;
        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(char_count);
            chunks.push(Chunk {
                document_id: document.id.clone(),
                index: chunks.len(),
                text: document.text[boundaries[start]..boundaries[end]].to_string(),
            });
            if end == char_count {
                break;
            }
            start += step;
        }
        chunks
    }

    /// The configured chunk size in characters.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// The configured overlap in characters.
    pub fn overlap(&self) -> usize {
        self.overlap
    }
}
