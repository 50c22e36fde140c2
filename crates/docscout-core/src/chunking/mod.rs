//! Markdown chunking for documentation retrieval.
//!
//! Documents are split into sections bounded by `#` and `##` headings. Each
//! section becomes a [`Chunk`] carrying its heading as title and the document
//! path as source, which together form the chunk's identity key.
//!
//! # Why headings?
//!
//! Library documentation is organised by topic under top-level headings, so a
//! heading-bounded section is usually a self-contained answer ("Installation",
//! "Configuration", "API"). Deeper headings stay with their parent topic.

mod markdown;
mod types;

pub use markdown::chunk_markdown;
pub use types::Chunk;

use std::collections::BTreeMap;

/// Chunks every document of a library in path order.
///
/// The result is the global chunk sequence used for ranking: documents in
/// iteration order, then chunks in document order.
pub fn chunk_documents(documents: &BTreeMap<String, String>) -> Vec<Chunk> {
    documents
        .iter()
        .flat_map(|(path, text)| chunk_markdown(text, path))
        .collect()
}
