//! Types for text chunking.

use crate::config::IDENTITY_KEY_DELIMITER;
use serde::{Deserialize, Serialize};

/// A titled, attributed section of a Markdown document.
///
/// Chunks are rebuilt from the cached documents on every query and are never
/// stored themselves; only the embeddings derived from them are persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Nearest preceding `#`/`##` heading, or the source fallback
    pub title: String,
    /// Trimmed section text, capped at `MAX_CHUNK_CHARS` plus the truncation marker
    pub content: String,
    /// Relative path of the document this chunk came from
    pub source: String,
}

impl Chunk {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            source: source.into(),
        }
    }

    /// Stable key aligning this chunk with a row of the embedding cache.
    ///
    /// Format: `{source}::{title}`. Unchanged text re-chunks to the same key.
    pub fn identity_key(&self) -> String {
        format!("{}{}{}", self.source, IDENTITY_KEY_DELIMITER, self.title)
    }

    /// Text handed to the embedding model: title and content on separate lines.
    pub fn embedding_text(&self) -> String {
        format!("{}\n{}", self.title, self.content)
    }
}
