//! Embedding matrix and vector helpers.

use crate::error::EmbeddingError;
use serde::{Deserialize, Serialize};

/// Row-major matrix of embeddings, one row per embedded text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingMatrix {
    dim: usize,
    data: Vec<f32>,
}

impl EmbeddingMatrix {
    /// Builds a matrix from flat row-major data.
    ///
    /// Fails with [`EmbeddingError::ShapeMismatch`] if `data` is not a whole
    /// number of rows of width `dim`.
    pub fn from_flat(dim: usize, data: Vec<f32>) -> Result<Self, EmbeddingError> {
        if dim == 0 || data.len() % dim != 0 {
            return Err(EmbeddingError::ShapeMismatch {
                expected: dim,
                actual: data.len(),
            });
        }
        Ok(Self { dim, data })
    }

    /// Builds a matrix from individual rows, checking every row width.
    pub fn from_rows(dim: usize, rows: Vec<Vec<f32>>) -> Result<Self, EmbeddingError> {
        let mut data = Vec::with_capacity(rows.len() * dim);
        for row in rows {
            if row.len() != dim {
                return Err(EmbeddingError::ShapeMismatch {
                    expected: dim,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(&row);
        }
        Ok(Self { dim, data })
    }

    /// Embedding dimension (column count).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    /// Row `i`, if it exists.
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        let start = i.checked_mul(self.dim)?;
        self.data.get(start..start + self.dim)
    }

    /// Dot product of every row with `query`.
    ///
    /// Fails if `query` has a different dimension.
    pub fn dot_all(&self, query: &[f32]) -> Result<Vec<f32>, crate::error::SearchError> {
        if query.len() != self.dim {
            return Err(crate::error::SearchError::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }
        Ok(self
            .data
            .chunks_exact(self.dim)
            .map(|row| row.iter().zip(query).map(|(a, b)| a * b).sum())
            .collect())
    }

    /// Flat row-major values.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Serializes the values as little-endian `f32` bytes.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.data.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    /// Parses little-endian `f32` bytes written by [`to_le_bytes`](Self::to_le_bytes).
    pub fn from_le_bytes(dim: usize, bytes: &[u8]) -> Result<Self, EmbeddingError> {
        if bytes.len() % 4 != 0 {
            return Err(EmbeddingError::ShapeMismatch {
                expected: dim,
                actual: bytes.len(),
            });
        }
        let data = bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        Self::from_flat(dim, data)
    }
}

/// Scales `v` to unit length in place. A zero vector is left unchanged.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
