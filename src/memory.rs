//! In-memory vector store with exact cosine search.
//!
//! [`InMemoryVectorStore`] keeps records in insertion order behind a
//! `tokio::sync::RwLock` and answers queries with an exact linear scan. For
//! a single-tenant personal corpus the exact scan is the correct default; an
//! ANN index would only trade exact-top-k recall for speed at corpus sizes
//! this crate does not target.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Candidate, StoredRecord};
use crate::error::{RagError, Result};
use crate::store::{Metric, VectorStore};

#[derive(Debug, Default)]
struct Inner {
    /// Records in insertion order. Replacing a record keeps its position,
    /// which is what makes distance ties deterministic.
    records: Vec<StoredRecord>,
    /// Record id -> position in `records`.
    by_id: HashMap<String, usize>,
}

/// An exact-search, in-memory [`VectorStore`].
///
/// The write lock is held across a whole `upsert` batch, so concurrent
/// readers observe either none or all of the batch, never a partial write.
#[derive(Debug)]
pub struct InMemoryVectorStore {
    dimensions: usize,
    inner: RwLock<Inner>,
}

impl InMemoryVectorStore {
    /// Create an empty store for vectors of the given dimension.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, inner: RwLock::new(Inner::default()) }
    }

    /// Number of records currently stored.
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.records.is_empty()
    }

    fn check_dimension(&self, len: usize, what: &str) -> Result<()> {
        if len != self.dimensions {
            return Err(RagError::ConfigError(format!(
                "{what} has dimension {len}, store was initialized with {}",
                self.dimensions
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn upsert(&self, records: Vec<StoredRecord>) -> Result<()> {
        for record in &records {
            self.check_dimension(record.embedding.len(), "record embedding")?;
        }
        let mut inner = self.inner.write().await;
        for record in records {
            let existing = inner.by_id.get(&record.id).copied();
            match existing {
                Some(pos) => inner.records[pos] = record,
                None => {
                    let pos = inner.records.len();
                    inner.by_id.insert(record.id.clone(), pos);
                    inner.records.push(record);
                }
            }
        }
        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize, metric: Metric) -> Result<Vec<Candidate>> {
        self.check_dimension(vector.len(), "query vector")?;
        let inner = self.inner.read().await;

        let mut candidates: Vec<Candidate> = inner
            .records
            .iter()
            .map(|record| Candidate {
                record: record.clone(),
                distance: metric.distance(&record.embedding, vector),
            })
            .collect();

        // Stable sort over the insertion-ordered scan keeps ties deterministic.
        candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        candidates.truncate(k);
        Ok(candidates)
    }

    async fn delete_document(&self, document_id: &str) -> Result<usize> {
        let mut inner = self.inner.write().await;
        let before = inner.records.len();
        inner.records.retain(|record| record.document_id != document_id);
        let by_id: HashMap<String, usize> =
            inner.records.iter().enumerate().map(|(pos, r)| (r.id.clone(), pos)).collect();
        inner.by_id = by_id;
        Ok(before - inner.records.len())
    }
}
