//! Persistent cache for fetched documentation and embeddings.
//!
//! # Storage Abstractions
//!
//! [`DocumentStore`] holds, per library:
//! - the fetched document set (relative path -> Markdown text)
//! - fetch metadata deciding whether the set is still fresh
//! - the embedding cache record used by the vector ranker
//!
//! # Implementations
//!
//! - [`RedbDocumentStore`] - redb database file, used by the CLI
//! - [`InMemoryDocumentStore`] - HashMaps with call counters, for tests

mod document_store;
mod redb_store;

pub use document_store::{DocumentStore, EmbeddingCacheRecord, InMemoryDocumentStore, StoreError};
pub use redb_store::RedbDocumentStore;
