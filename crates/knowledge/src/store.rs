//! Retrieval backends for document corpora.
//!
//! The pipeline only needs `similarity_search`; ingestion uses `add_chunks`.
//! `InMemoryStore` keeps embedded chunks in memory for the life of the process.

use crate::chunk::Chunk;
use crate::embeddings::EmbeddingProvider;
use async_trait::async_trait;
use lexguide_core::{AppError, AppResult};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A chunk returned by a similarity search, with its score in `[-1, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Size of a backend's contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackendStats {
    pub chunks: usize,
    pub dimensions: usize,
}

/// A searchable store of chunks for one corpus.
#[async_trait]
pub trait RetrievalBackend: Send + Sync {
    /// Up to `k` chunks scoring at least `score_threshold`, best first.
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        score_threshold: f32,
    ) -> AppResult<Vec<ScoredChunk>>;

    /// Embed and store chunks, returning how many were added.
    async fn add_chunks(&self, chunks: Vec<Chunk>) -> AppResult<usize>;

    async fn stats(&self) -> AppResult<BackendStats>;
}

struct StoredChunk {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// Cosine-similarity search over chunks held in memory.
pub struct InMemoryStore {
    embedder: Arc<dyn EmbeddingProvider>,
    entries: RwLock<Vec<StoredChunk>>,
}

impl InMemoryStore {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RetrievalBackend for InMemoryStore {
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        score_threshold: f32,
    ) -> AppResult<Vec<ScoredChunk>> {
        if k == 0 || query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let entries = self.entries.read().await;

        let mut scored: Vec<ScoredChunk> = entries
            .iter()
            .map(|entry| ScoredChunk {
                score: cosine_similarity(&query_embedding, &entry.embedding),
                chunk: entry.chunk.clone(),
            })
            .filter(|hit| hit.score >= score_threshold)
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);

        tracing::trace!(
            "Similarity search over {} chunks kept {} (threshold {:.2})",
            entries.len(),
            scored.len(),
            score_threshold
        );

        Ok(scored)
    }

    async fn add_chunks(&self, chunks: Vec<Chunk>) -> AppResult<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(AppError::Knowledge(format!(
                "Embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let added = chunks.len();
        let mut entries = self.entries.write().await;
        entries.extend(
            chunks
                .into_iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| StoredChunk { chunk, embedding }),
        );

        Ok(added)
    }

    async fn stats(&self) -> AppResult<BackendStats> {
        Ok(BackendStats {
            chunks: self.entries.read().await.len(),
            dimensions: self.embedder.dimensions(),
        })
    }
}

/// Calculate cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
