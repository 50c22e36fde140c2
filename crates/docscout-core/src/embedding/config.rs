//! Configuration for the embedding model.

use crate::config::EMBEDDING_DIM;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default model: small English BGE, 384 dimensions.
pub const DEFAULT_MODEL_ID: &str = "BAAI/bge-small-en-v1.5";

/// Configuration for [`FastEmbedder`](super::FastEmbedder).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmbedderConfig {
    /// Model identifier (e.g., "BAAI/bge-small-en-v1.5")
    pub model_id: String,

    /// Directory where model files are downloaded and cached.
    /// `None` uses fastembed's own default.
    pub cache_dir: Option<PathBuf>,

    /// Texts per inference batch
    pub batch_size: usize,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            cache_dir: None,
            batch_size: 64,
        }
    }
}

impl EmbedderConfig {
    /// Output dimension of the configured model, if it is a known model.
    pub fn embedding_dim(&self) -> Option<usize> {
        match self.model_id.as_str() {
            "BAAI/bge-small-en-v1.5" => Some(EMBEDDING_DIM),
            "sentence-transformers/all-MiniLM-L6-v2" => Some(384),
            "BAAI/bge-base-en-v1.5" => Some(768),
            "nomic-ai/nomic-embed-text-v1.5" => Some(768),
            _ => None,
        }
    }
}
