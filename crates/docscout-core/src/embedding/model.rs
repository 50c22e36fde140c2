//! fastembed-backed embedding model.

use super::config::EmbedderConfig;
use super::traits::Embedder;
use super::types::{l2_normalize, EmbeddingMatrix};
use crate::error::EmbeddingError;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use once_cell::sync::OnceCell;
use std::sync::Mutex;
use tracing::{info, instrument};

/// Local ONNX embedder.
///
/// The model is downloaded (if needed) and loaded on the first call to
/// [`embed_batch`](Embedder::embed_batch), then reused for the life of the
/// value. `TextEmbedding::embed` needs `&mut self`, so the session sits behind
/// a `Mutex`.
pub struct FastEmbedder {
    config: EmbedderConfig,
    model: EmbeddingModel,
    dim: usize,
    session: OnceCell<Mutex<TextEmbedding>>,
}

impl FastEmbedder {
    /// Creates an embedder for a supported model without loading it.
    pub fn new(config: EmbedderConfig) -> Result<Self, EmbeddingError> {
        let model = model_for_id(&config.model_id).ok_or_else(|| {
            EmbeddingError::ModelLoad(format!("unsupported model '{}'", config.model_id))
        })?;
        let dim = config.embedding_dim().ok_or_else(|| {
            EmbeddingError::ModelLoad(format!("unknown dimension for '{}'", config.model_id))
        })?;
        Ok(Self {
            config,
            model,
            dim,
            session: OnceCell::new(),
        })
    }

    fn session(&self) -> Result<&Mutex<TextEmbedding>, EmbeddingError> {
        self.session.get_or_try_init(|| {
            info!(model = %self.config.model_id, "Loading embedding model");
            let mut options = InitOptions::new(self.model.clone()).with_show_download_progress(false);
            if let Some(dir) = &self.config.cache_dir {
                options = options.with_cache_dir(dir.clone());
            }
            let embedding = TextEmbedding::try_new(options)
                .map_err(|e| EmbeddingError::ModelLoad(e.to_string()))?;
            Ok(Mutex::new(embedding))
        })
    }
}

impl Embedder for FastEmbedder {
    fn model_id(&self) -> &str {
        &self.config.model_id
    }

    fn embedding_dim(&self) -> usize {
        self.dim
    }

    #[instrument(skip_all, fields(count = texts.len()))]
    fn embed_batch(&self, texts: &[String]) -> Result<EmbeddingMatrix, EmbeddingError> {
        if texts.is_empty() {
            return EmbeddingMatrix::from_flat(self.dim, Vec::new());
        }

        let inputs: Vec<&str> = texts
            .iter()
            .map(|t| if t.trim().is_empty() { " " } else { t.as_str() })
            .collect();

        let mut session = self
            .session()?
            .lock()
            .map_err(|_| EmbeddingError::InferenceFailed("model lock poisoned".to_string()))?;
        let mut rows = session
            .embed(inputs, Some(self.config.batch_size))
            .map_err(|e| EmbeddingError::InferenceFailed(e.to_string()))?;
        drop(session);

        if rows.len() != texts.len() {
            return Err(EmbeddingError::ShapeMismatch {
                expected: texts.len(),
                actual: rows.len(),
            });
        }
        for row in rows.iter_mut() {
            l2_normalize(row);
        }
        EmbeddingMatrix::from_rows(self.dim, rows)
    }
}

fn model_for_id(model_id: &str) -> Option<EmbeddingModel> {
    match model_id {
        "BAAI/bge-small-en-v1.5" => Some(EmbeddingModel::BGESmallENV15),
        "sentence-transformers/all-MiniLM-L6-v2" => Some(EmbeddingModel::AllMiniLML6V2),
        "BAAI/bge-base-en-v1.5" => Some(EmbeddingModel::BGEBaseENV15),
        "nomic-ai/nomic-embed-text-v1.5" => Some(EmbeddingModel::NomicEmbedTextV15),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_does_not_load_model() {
        let embedder = FastEmbedder::new(EmbedderConfig::default()).unwrap();
        assert_eq!(embedder.embedding_dim(), 384);
        assert_eq!(embedder.model_id(), "BAAI/bge-small-en-v1.5");
        assert!(embedder.session.get().is_none());
    }

    #[test]
    fn test_rejects_unknown_model() {
        let config = EmbedderConfig {
            model_id: "acme/unknown".to_string(),
            ..Default::default()
        };
        assert!(FastEmbedder::new(config).is_err());
    }

    #[test]
    fn test_empty_batch_skips_model_load() {
        let embedder = FastEmbedder::new(EmbedderConfig::default()).unwrap();
        let matrix = embedder.embed_batch(&[]).unwrap();
        assert_eq!(matrix.rows(), 0);
        assert!(embedder.session.get().is_none());
    }
}
