//! Embedding model abstractions and implementations.
//!
//! ## Core Types
//!
//! - [`Embedder`] - Batch and single-text embedding interface
//! - [`EmbeddingMatrix`] - Row-major matrix of unit-length vectors
//! - [`EmbedderConfig`] - Model selection and model file location
//!
//! ## Implementations
//!
//! - [`FastEmbedder`] - Local ONNX inference via `fastembed`, loaded lazily on
//!   first use (feature `fastembed-model`, on by default)
//!
//! ## Example
//!
//! ```ignore
//! use docscout_core::embedding::{Embedder, EmbedderConfig, FastEmbedder};
//!
//! let embedder = FastEmbedder::new(EmbedderConfig::default())?;
//! let matrix = embedder.embed_batch(&["# Setup\nHow to install".to_string()])?;
//! assert_eq!(matrix.rows(), 1);
//! ```

mod traits;

pub mod config;
#[cfg(feature = "fastembed-model")]
pub mod model;
pub mod types;

pub use config::EmbedderConfig;
#[cfg(feature = "fastembed-model")]
pub use model::FastEmbedder;
pub use traits::Embedder;
pub use types::{l2_normalize, EmbeddingMatrix};
