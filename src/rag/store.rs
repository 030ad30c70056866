//! Vector store trait and the in-memory implementation.
//!
//! Brute-force cosine similarity over an in-process collection. The store
//! deduplicates on `(url, content-hash)` and enforces a capacity bound,
//! evicting oldest chunks first, so repeated indexing of the same page
//! cannot grow the collection without limit.

use std::collections::{HashSet, VecDeque};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::errors::ApiError;

pub const DEFAULT_CAPACITY: usize = 4096;

/// A stored chunk with its source metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Unique chunk identifier (`{url}-{uuid4}`).
    pub chunk_id: String,
    /// The text content of the chunk.
    pub content: String,
    /// Source URL the chunk was extracted from.
    pub url: String,
    /// Hash of the content, used for dedup within a source.
    pub content_hash: String,
    pub indexed_at: DateTime<Utc>,
}

impl StoredChunk {
    pub fn new(url: &str, content: String) -> Self {
        Self {
            chunk_id: format!("{}-{}", url, uuid::Uuid::new_v4()),
            content_hash: content_hash(&content),
            content,
            url: url.to_string(),
            indexed_at: Utc::now(),
        }
    }
}

/// Result of a similarity search.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkSearchResult {
    pub chunk: StoredChunk,
    /// Cosine similarity (higher = closer).
    pub score: f32,
}

/// Abstract interface for similarity-searchable chunk storage.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert chunks with their embedding vectors. Returns the number of
    /// chunks actually inserted after deduplication.
    async fn insert_batch(
        &self,
        items: Vec<(StoredChunk, Vec<f32>)>,
    ) -> Result<usize, ApiError>;

    /// Top-`limit` chunks by cosine similarity to the query embedding,
    /// closest first. An empty collection yields an empty vec.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ChunkSearchResult>, ApiError>;

    /// Total chunk count.
    async fn count(&self) -> Result<usize, ApiError>;

    /// Drop all stored chunks.
    async fn clear(&self) -> Result<(), ApiError>;
}

pub fn content_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

struct StoreRow {
    chunk: StoredChunk,
    embedding: Vec<f32>,
}

#[derive(Default)]
struct StoreInner {
    rows: VecDeque<StoreRow>,
    seen: HashSet<(String, String)>,
}

pub struct MemoryVectorStore {
    inner: RwLock<StoreInner>,
    capacity: usize,
}

impl MemoryVectorStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            capacity: capacity.max(1),
        }
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        let denom = norm_a * norm_b;

        if denom <= f32::EPSILON {
            0.0
        } else {
            dot / denom
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn insert_batch(
        &self,
        items: Vec<(StoredChunk, Vec<f32>)>,
    ) -> Result<usize, ApiError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApiError::Internal("Vector store lock poisoned".to_string()))?;

        let mut inserted = 0;
        for (chunk, embedding) in items {
            let key = (chunk.url.clone(), chunk.content_hash.clone());
            if !inner.seen.insert(key) {
                continue;
            }
            inner.rows.push_back(StoreRow { chunk, embedding });
            inserted += 1;
        }

        while inner.rows.len() > self.capacity {
            if let Some(evicted) = inner.rows.pop_front() {
                let key = (evicted.chunk.url, evicted.chunk.content_hash);
                inner.seen.remove(&key);
            }
        }

        Ok(inserted)
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ChunkSearchResult>, ApiError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApiError::Internal("Vector store lock poisoned".to_string()))?;

        let mut scored: Vec<ChunkSearchResult> = inner
            .rows
            .iter()
            .map(|row| ChunkSearchResult {
                chunk: row.chunk.clone(),
                score: Self::cosine_similarity(query_embedding, &row.embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit.max(1));

        Ok(scored)
    }

    async fn count(&self) -> Result<usize, ApiError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApiError::Internal("Vector store lock poisoned".to_string()))?;
        Ok(inner.rows.len())
    }

    async fn clear(&self) -> Result<(), ApiError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApiError::Internal("Vector store lock poisoned".to_string()))?;
        inner.rows.clear();
        inner.seen.clear();
        Ok(())
    }
}
