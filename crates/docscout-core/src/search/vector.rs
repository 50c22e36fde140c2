//! Embedding-based ranking with a persisted per-library embedding cache.
//!
//! # Algorithm
//!
//! 1. Compute every chunk's identity key in chunk order
//! 2. Load the library's cached record; reuse its matrix when
//!    [`validate_record`] reports a hit
//! 3. Otherwise embed `"{title}\n{content}"` for all chunks in one batch and
//!    overwrite the cached record with the fresh keys and matrix
//! 4. Embed the query and score every row by dot product (cosine similarity,
//!    since all rows are unit length)
//! 5. Return the `top_k` best chunks, ties kept in chunk order
//!
//! Embedding runs on tokio's blocking pool. Store failures on this path are
//! logged and treated as a cache miss; embedding failures are returned.

use super::consistency::{validate_record, CacheVerdict};
use super::types::Ranker;
use crate::chunking::Chunk;
use crate::embedding::{Embedder, EmbeddingMatrix};
use crate::error::{EmbeddingError, SearchError};
use crate::storage::{DocumentStore, EmbeddingCacheRecord};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Ranks chunks by cosine similarity to the query embedding.
pub struct VectorRanker<S: DocumentStore> {
    store: Arc<S>,
    embedder: Arc<dyn Embedder>,
}

impl<S: DocumentStore> VectorRanker<S> {
    /// Creates a ranker that caches embeddings in `store`.
    pub fn new(store: Arc<S>, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    /// Returns the embedding matrix for `chunks`, from cache or freshly embedded.
    async fn chunk_matrix(
        &self,
        library: &str,
        chunks: &[Chunk],
    ) -> Result<EmbeddingMatrix, SearchError> {
        let keys: Vec<String> = chunks.iter().map(Chunk::identity_key).collect();
        let dim = self.embedder.embedding_dim();

        let cached = match self.store.load_embeddings(library).await {
            Ok(record) => record,
            Err(e) => {
                warn!(library, error = %e, "Failed to load embedding cache, regenerating");
                None
            }
        };

        if let Some(record) = cached {
            match validate_record(&record, &keys, dim) {
                CacheVerdict::Hit => {
                    debug!(library, chunks = chunks.len(), "Embedding cache hit");
                    return Ok(record.matrix);
                }
                CacheVerdict::Stale => {
                    info!(library, "Embedding cache stale, regenerating");
                }
                CacheVerdict::Corrupt => {
                    warn!(
                        library,
                        rows = record.matrix.rows(),
                        keys = record.keys.len(),
                        dim = record.matrix.dim(),
                        "Embedding cache record has the wrong shape, regenerating"
                    );
                }
            }
        }

        info!(library, chunks = chunks.len(), model = self.embedder.model_id(), "Generating embeddings");
        let texts: Vec<String> = chunks.iter().map(Chunk::embedding_text).collect();
        let matrix = self.embed_texts(texts).await?;
        if matrix.rows() != chunks.len() || matrix.dim() != dim {
            return Err(EmbeddingError::ShapeMismatch {
                expected: chunks.len() * dim,
                actual: matrix.as_slice().len(),
            }
            .into());
        }

        let record = EmbeddingCacheRecord { keys, matrix };
        match self.store.save_embeddings(library, &record).await {
            Ok(()) => info!(library, "Embeddings persisted"),
            Err(e) => warn!(library, error = %e, "Failed to persist embeddings"),
        }
        Ok(record.matrix)
    }

    async fn embed_texts(&self, texts: Vec<String>) -> Result<EmbeddingMatrix, EmbeddingError> {
        let embedder = Arc::clone(&self.embedder);
        tokio::task::spawn_blocking(move || embedder.embed_batch(&texts))
            .await
            .map_err(|e| EmbeddingError::TaskFailed(e.to_string()))?
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, EmbeddingError> {
        let embedder = Arc::clone(&self.embedder);
        let query = query.to_string();
        tokio::task::spawn_blocking(move || embedder.embed_one(&query))
            .await
            .map_err(|e| EmbeddingError::TaskFailed(e.to_string()))?
    }
}

#[async_trait::async_trait]
impl<S: DocumentStore + 'static> Ranker for VectorRanker<S> {
    fn name(&self) -> &'static str {
        "semantic"
    }

    #[instrument(skip_all, fields(library = library, chunks = chunks.len(), top_k = top_k))]
    async fn rank(
        &self,
        query: &str,
        library: &str,
        chunks: &[Chunk],
        top_k: usize,
    ) -> Result<Vec<Chunk>, SearchError> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let matrix = self.chunk_matrix(library, chunks).await?;
        let query_vec = self.embed_query(query).await?;
        let scores = matrix.dot_all(&query_vec)?;

        let mut order: Vec<usize> = (0..scores.len()).collect();
        // Stable: equal scores keep chunk order.
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

        Ok(order
            .into_iter()
            .take(top_k)
            .map(|idx| chunks[idx].clone())
            .collect())
    }
}
