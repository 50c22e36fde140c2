//! Trait for embedding operations.

use super::types::EmbeddingMatrix;
use crate::error::EmbeddingError;

/// Trait for embedding model operations.
///
/// Implementations turn text into unit-length vectors so that a dot product
/// between two outputs equals their cosine similarity.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. Callers run inference on tokio's
/// blocking pool, so methods are synchronous and may take a long time.
pub trait Embedder: Send + Sync {
    /// Identifier of the underlying model (e.g., "BAAI/bge-small-en-v1.5").
    fn model_id(&self) -> &str;

    /// Returns the embedding dimension (vector size).
    fn embedding_dim(&self) -> usize;

    /// Embeds a batch of texts.
    ///
    /// Returns one unit row per input, in input order. Blank inputs are
    /// replaced by a single space before inference.
    fn embed_batch(&self, texts: &[String]) -> Result<EmbeddingMatrix, EmbeddingError>;

    /// Embeds a single text into a unit vector.
    fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let matrix = self.embed_batch(&[text.to_string()])?;
        match matrix.row(0) {
            Some(row) => Ok(row.to_vec()),
            None => Err(EmbeddingError::ShapeMismatch {
                expected: self.embedding_dim(),
                actual: 0,
            }),
        }
    }
}
