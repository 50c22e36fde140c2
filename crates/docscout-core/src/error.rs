//! Error types for docscout-core.
//!
//! This module defines the errors shared across the library: embedding,
//! data-source (GitHub / crawler), and ranking errors. Storage and crawl errors
//! live next to their modules ([`StoreError`](crate::storage::StoreError),
//! [`CrawlError`](crate::source::CrawlError)).
//!
//! User-facing messages name the failure kind, so every enum here exposes a
//! `kind()` accessor returning a stable short name.

use crate::source::CrawlError;
use thiserror::Error;

/// Errors that can occur during embedding operations.
#[derive(Debug, Clone, Error)]
pub enum EmbeddingError {
    /// Failed to load or download the model
    #[error("Failed to load model: {0}")]
    ModelLoad(String),
    /// Model inference failed
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    /// Model returned vectors with an unexpected shape
    #[error("Embedding shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
    /// Blocking embedding task was cancelled or panicked
    #[error("Embedding task failed: {0}")]
    TaskFailed(String),
}

impl EmbeddingError {
    /// Short name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            EmbeddingError::ModelLoad(_) => "ModelLoad",
            EmbeddingError::InferenceFailed(_) => "InferenceFailed",
            EmbeddingError::ShapeMismatch { .. } => "ShapeMismatch",
            EmbeddingError::TaskFailed(_) => "TaskFailed",
        }
    }
}

/// Errors raised by the documentation data source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Connection to the server could not be established
    #[error("Request failed: {0}")]
    Request(String),
    /// Request timed out
    #[error("Request timed out: {0}")]
    Timeout(String),
    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },
    /// Response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),
    /// Any other HTTP client failure (bad URL, redirect loop, broken body)
    #[error("HTTP error: {0}")]
    Http(String),
    /// Client could not be configured
    #[error("Invalid client configuration: {0}")]
    Config(String),
    /// Website crawl failed before any page was fetched
    #[error(transparent)]
    Crawl(#[from] CrawlError),
}

impl SourceError {
    /// Short name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::Request(_) => "RequestError",
            SourceError::Timeout(_) => "Timeout",
            SourceError::Status { .. } => "HttpStatusError",
            SourceError::Decode(_) => "DecodeError",
            SourceError::Http(_) => "HttpError",
            SourceError::Config(_) => "ConfigError",
            SourceError::Crawl(_) => "CrawlError",
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Request(_) | SourceError::Timeout(_))
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout(err.to_string())
        } else if err.is_connect() {
            SourceError::Request(err.to_string())
        } else if err.is_decode() {
            SourceError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            SourceError::Status {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            SourceError::Http(err.to_string())
        }
    }
}

/// Errors that can occur while ranking chunks.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Embedding the chunks or the query failed
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    /// Query vector and chunk matrix disagree on dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl SearchError {
    /// Short name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::Embedding(e) => e.kind(),
            SearchError::DimensionMismatch { .. } => "DimensionMismatch",
        }
    }
}
