//! Document store trait and in-memory implementation.
//!
//! Libraries are addressed by their cache key (`"owner/repo"`). Document paths
//! are relative to the library (`readme.md`, `docs/guide.md`, `web/index.md`).

use crate::embedding::EmbeddingMatrix;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that can occur during document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error (filesystem)
    #[error("I/O error: {0}")]
    IoError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Database error (redb)
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Persisted embeddings for one library's chunk set.
///
/// Row `i` of `matrix` is the embedding of the chunk whose identity key is
/// `keys[i]`. Keys and matrix are always written and read together.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingCacheRecord {
    /// Chunk identity keys in chunk order
    pub keys: Vec<String>,
    /// One unit-length row per key
    pub matrix: EmbeddingMatrix,
}

/// Cache of fetched documentation, fetch metadata, and embeddings.
///
/// # Design Notes
///
/// - Every operation is self-contained; there are no exposed transactions.
/// - `save_embeddings` must be atomic with respect to `load_embeddings`: a
///   reader sees either the old record or the new one, never a mix.
/// - Writes to the same library from concurrent queries are last-writer-wins.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns every cached document of a library, ordered by path.
    ///
    /// Returns an empty map if nothing is cached.
    async fn load_documents(&self, library: &str) -> Result<BTreeMap<String, String>, StoreError>;

    /// Whether the library was fetched and is younger than the store's TTL.
    async fn is_fresh(&self, library: &str) -> Result<bool, StoreError>;

    /// Stores a document, overwriting any existing text at the same path.
    async fn put_document(&self, library: &str, path: &str, text: &str)
        -> Result<(), StoreError>;

    /// Records that the library was fetched now, resetting its freshness clock.
    async fn mark_fetched(&self, library: &str) -> Result<(), StoreError>;

    /// Retrieves the library's embedding cache record.
    ///
    /// Returns `Ok(None)` if no record exists.
    async fn load_embeddings(&self, library: &str)
        -> Result<Option<EmbeddingCacheRecord>, StoreError>;

    /// Replaces the library's embedding cache record.
    async fn save_embeddings(
        &self,
        library: &str,
        record: &EmbeddingCacheRecord,
    ) -> Result<(), StoreError>;
}

/// In-memory document store for testing.
///
/// Stores everything in HashMaps and counts calls so tests can assert which
/// operations a query performed.
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<String, BTreeMap<String, String>>>,
    fetched: RwLock<HashMap<String, Instant>>,
    embeddings: RwLock<HashMap<String, EmbeddingCacheRecord>>,
    ttl: Duration,
    calls: AtomicUsize,
    embedding_saves: AtomicUsize,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::with_ttl(crate::config::ttl_from_hours(
            crate::config::DEFAULT_CACHE_TTL_HOURS,
        ))
    }
}

impl InMemoryDocumentStore {
    /// Creates a new empty in-memory store with the default TTL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty in-memory store with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            fetched: RwLock::new(HashMap::new()),
            embeddings: RwLock::new(HashMap::new()),
            ttl,
            calls: AtomicUsize::new(0),
            embedding_saves: AtomicUsize::new(0),
        }
    }

    /// Total number of trait operations performed on this store.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of `save_embeddings` calls.
    pub fn embedding_save_count(&self) -> usize {
        self.embedding_saves.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::DatabaseError(format!("Lock poisoned: {}", e))
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn load_documents(&self, library: &str) -> Result<BTreeMap<String, String>, StoreError> {
        self.record_call();
        let documents = self.documents.read().map_err(poisoned)?;
        Ok(documents.get(library).cloned().unwrap_or_default())
    }

    async fn is_fresh(&self, library: &str) -> Result<bool, StoreError> {
        self.record_call();
        let fetched = self.fetched.read().map_err(poisoned)?;
        Ok(fetched
            .get(library)
            .is_some_and(|at| at.elapsed() < self.ttl))
    }

    async fn put_document(
        &self,
        library: &str,
        path: &str,
        text: &str,
    ) -> Result<(), StoreError> {
        self.record_call();
        let mut documents = self.documents.write().map_err(poisoned)?;
        documents
            .entry(library.to_string())
            .or_default()
            .insert(path.to_string(), text.to_string());
        Ok(())
    }

    async fn mark_fetched(&self, library: &str) -> Result<(), StoreError> {
        self.record_call();
        let mut fetched = self.fetched.write().map_err(poisoned)?;
        fetched.insert(library.to_string(), Instant::now());
        Ok(())
    }

    async fn load_embeddings(
        &self,
        library: &str,
    ) -> Result<Option<EmbeddingCacheRecord>, StoreError> {
        self.record_call();
        let embeddings = self.embeddings.read().map_err(poisoned)?;
        Ok(embeddings.get(library).cloned())
    }

    async fn save_embeddings(
        &self,
        library: &str,
        record: &EmbeddingCacheRecord,
    ) -> Result<(), StoreError> {
        self.record_call();
        self.embedding_saves.fetch_add(1, Ordering::SeqCst);
        let mut embeddings = self.embeddings.write().map_err(poisoned)?;
        embeddings.insert(library.to_string(), record.clone());
        Ok(())
    }
}
