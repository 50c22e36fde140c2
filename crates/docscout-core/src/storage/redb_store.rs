//! Redb-backed document store.
//!
//! Uses [redb](https://github.com/cberner/redb), a pure Rust, ACID-compliant
//! embedded B-tree database, stored as a single file under the cache directory.
//!
//! # Tables
//!
//! - `documents`: `"{library}\0{path}"` -> Markdown text
//! - `library_meta`: library -> [`LibraryMeta`] (JSON)
//! - `embedding_keys`: library -> [`EmbeddingHeader`] (JSON: dim + identity keys)
//! - `embedding_matrix`: library -> `f32` matrix (raw bytes, little-endian)
//!
//! The two embedding tables are written in one write transaction, so a reader
//! never pairs one save's keys with another save's matrix.
//!
//! # Sharing the cache file
//!
//! redb locks the database file for as long as a `Database` is open. Several
//! docscout processes (a CLI query next to one or more MCP servers) share one
//! cache directory, so the store opens the database for each operation and
//! closes it afterwards. An operation that finds the file locked waits and
//! retries `STORE_OPEN_ATTEMPTS` times, `STORE_OPEN_RETRY_MS` apart.

use super::{DocumentStore, EmbeddingCacheRecord, StoreError};
use crate::config::{STORE_OPEN_ATTEMPTS, STORE_OPEN_RETRY_MS};
use crate::embedding::EmbeddingMatrix;
use chrono::{DateTime, Utc};
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const DOCUMENTS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("documents");
const META_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("library_meta");
const EMBED_KEYS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("embedding_keys");
const EMBED_MATRIX_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("embedding_matrix");

// Separates library from path in document keys. Never appears in either.
const PATH_SEPARATOR: char = '\0';
const PATH_SEPARATOR_END: char = '\u{1}';

/// Fetch metadata for one library.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LibraryMeta {
    fetched_at: DateTime<Utc>,
}

/// Stored alongside the embedding matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmbeddingHeader {
    dim: usize,
    keys: Vec<String>,
}

fn db_err<E: std::fmt::Display>(what: &'static str) -> impl FnOnce(E) -> StoreError {
    move |e| StoreError::DatabaseError(format!("{}: {}", what, e))
}

/// Opens the database file, or returns `None` while another handle holds its lock.
fn try_open(path: &Path) -> Result<Option<Database>, StoreError> {
    match Database::create(path) {
        Ok(db) => Ok(Some(db)),
        Err(redb::DatabaseError::DatabaseAlreadyOpen) => Ok(None),
        Err(e) => Err(StoreError::DatabaseError(format!(
            "Failed to open database: {}",
            e
        ))),
    }
}

fn create_tables(db: &Database) -> Result<(), StoreError> {
    let write_txn = db
        .begin_write()
        .map_err(db_err("Failed to begin write transaction"))?;
    write_txn
        .open_table(DOCUMENTS_TABLE)
        .map_err(db_err("Failed to create documents table"))?;
    write_txn
        .open_table(META_TABLE)
        .map_err(db_err("Failed to create library_meta table"))?;
    write_txn
        .open_table(EMBED_KEYS_TABLE)
        .map_err(db_err("Failed to create embedding_keys table"))?;
    write_txn
        .open_table(EMBED_MATRIX_TABLE)
        .map_err(db_err("Failed to create embedding_matrix table"))?;
    write_txn
        .commit()
        .map_err(db_err("Failed to commit table creation"))
}

/// Redb-backed document store.
///
/// Holds only the database path; see the module docs for why the database is
/// not kept open.
///
/// # Example
///
/// ```ignore
/// use docscout_core::storage::RedbDocumentStore;
///
/// let store = RedbDocumentStore::open("./cache/docs.redb", ttl)?;
/// store.put_document("tokio-rs/tokio", "readme.md", "# Tokio").await?;
/// ```
pub struct RedbDocumentStore {
    path: PathBuf,
    ttl: Duration,
}

impl RedbDocumentStore {
    /// Opens or creates a redb database at the given path.
    ///
    /// Creates the parent directory, the database file, and all tables if they
    /// don't exist. If another process has the file open, it has already
    /// created the tables and this returns without waiting. Documents older
    /// than `ttl` are reported as not fresh.
    pub fn open<P: AsRef<Path>>(path: P, ttl: Duration) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::IoError(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        match try_open(path)? {
            Some(db) => create_tables(&db)?,
            None => debug!(
                path = %path.display(),
                "Database open elsewhere, tables already exist"
            ),
        }

        Ok(Self {
            path: path.to_path_buf(),
            ttl,
        })
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the database for one operation, waiting while another handle holds it.
    async fn connect(&self) -> Result<Database, StoreError> {
        let delay = Duration::from_millis(STORE_OPEN_RETRY_MS);
        for attempt in 0..STORE_OPEN_ATTEMPTS {
            if let Some(db) = try_open(&self.path)? {
                return Ok(db);
            }
            if attempt == 0 {
                debug!(path = %self.path.display(), "Database busy, waiting");
            }
            tokio::time::sleep(delay).await;
        }
        Err(StoreError::DatabaseError(format!(
            "Database {} stayed locked by another process",
            self.path.display()
        )))
    }

    fn document_key(library: &str, path: &str) -> String {
        format!("{}{}{}", library, PATH_SEPARATOR, path)
    }

    /// Reads the fetch time, treating undecodable metadata as absent.
    fn fetched_at(db: &Database, library: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        let read_txn = db
            .begin_read()
            .map_err(db_err("Failed to begin read transaction"))?;
        let table = read_txn
            .open_table(META_TABLE)
            .map_err(db_err("Failed to open library_meta table"))?;

        let Some(guard) = table
            .get(library)
            .map_err(db_err("Failed to read library metadata"))?
        else {
            return Ok(None);
        };

        match serde_json::from_slice::<LibraryMeta>(guard.value()) {
            Ok(meta) => Ok(Some(meta.fetched_at)),
            Err(e) => {
                warn!(library, error = %e, "Corrupt library metadata, treating as unfetched");
                Ok(None)
            }
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for RedbDocumentStore {
    async fn load_documents(&self, library: &str) -> Result<BTreeMap<String, String>, StoreError> {
        let db = self.connect().await?;
        let read_txn = db
            .begin_read()
            .map_err(db_err("Failed to begin read transaction"))?;
        let table = read_txn
            .open_table(DOCUMENTS_TABLE)
            .map_err(db_err("Failed to open documents table"))?;

        let start = format!("{}{}", library, PATH_SEPARATOR);
        let end = format!("{}{}", library, PATH_SEPARATOR_END);

        let mut documents = BTreeMap::new();
        for entry in table
            .range(start.as_str()..end.as_str())
            .map_err(db_err("Failed to scan documents"))?
        {
            let (key, value) = entry.map_err(db_err("Failed to read document"))?;
            if let Some(path) = key.value().strip_prefix(start.as_str()) {
                documents.insert(path.to_string(), value.value().to_string());
            }
        }
        debug!(library, count = documents.len(), "Loaded cached documents");
        Ok(documents)
    }

    async fn is_fresh(&self, library: &str) -> Result<bool, StoreError> {
        let db = self.connect().await?;
        let Some(fetched_at) = Self::fetched_at(&db, library)? else {
            return Ok(false);
        };
        // A fetch time in the future (clock change) counts as age zero.
        let age = (Utc::now() - fetched_at).to_std().unwrap_or(Duration::ZERO);
        Ok(age < self.ttl)
    }

    async fn put_document(
        &self,
        library: &str,
        path: &str,
        text: &str,
    ) -> Result<(), StoreError> {
        let key = Self::document_key(library, path);
        let db = self.connect().await?;
        let write_txn = db
            .begin_write()
            .map_err(db_err("Failed to begin write transaction"))?;
        {
            let mut table = write_txn
                .open_table(DOCUMENTS_TABLE)
                .map_err(db_err("Failed to open documents table"))?;
            table
                .insert(key.as_str(), text)
                .map_err(db_err("Failed to insert document"))?;
        }
        write_txn
            .commit()
            .map_err(db_err("Failed to commit document"))?;
        Ok(())
    }

    async fn mark_fetched(&self, library: &str) -> Result<(), StoreError> {
        let meta = LibraryMeta {
            fetched_at: Utc::now(),
        };
        let bytes = serde_json::to_vec(&meta).map_err(|e| {
            StoreError::SerializationError(format!("Failed to serialize metadata: {}", e))
        })?;

        let db = self.connect().await?;
        let write_txn = db
            .begin_write()
            .map_err(db_err("Failed to begin write transaction"))?;
        {
            let mut table = write_txn
                .open_table(META_TABLE)
                .map_err(db_err("Failed to open library_meta table"))?;
            table
                .insert(library, bytes.as_slice())
                .map_err(db_err("Failed to insert library metadata"))?;
        }
        write_txn
            .commit()
            .map_err(db_err("Failed to commit library metadata"))?;
        Ok(())
    }

    async fn load_embeddings(
        &self,
        library: &str,
    ) -> Result<Option<EmbeddingCacheRecord>, StoreError> {
        let db = self.connect().await?;
        let read_txn = db
            .begin_read()
            .map_err(db_err("Failed to begin read transaction"))?;
        let keys_table = read_txn
            .open_table(EMBED_KEYS_TABLE)
            .map_err(db_err("Failed to open embedding_keys table"))?;
        let matrix_table = read_txn
            .open_table(EMBED_MATRIX_TABLE)
            .map_err(db_err("Failed to open embedding_matrix table"))?;

        let header_guard = keys_table
            .get(library)
            .map_err(db_err("Failed to read embedding keys"))?;
        let matrix_guard = matrix_table
            .get(library)
            .map_err(db_err("Failed to read embedding matrix"))?;

        let (Some(header_guard), Some(matrix_guard)) = (header_guard, matrix_guard) else {
            return Ok(None);
        };

        let header: EmbeddingHeader = match serde_json::from_slice(header_guard.value()) {
            Ok(header) => header,
            Err(e) => {
                warn!(library, error = %e, "Corrupt embedding keys, ignoring cached record");
                return Ok(None);
            }
        };
        let matrix = match EmbeddingMatrix::from_le_bytes(header.dim, matrix_guard.value()) {
            Ok(matrix) => matrix,
            Err(e) => {
                warn!(library, error = %e, "Corrupt embedding matrix, ignoring cached record");
                return Ok(None);
            }
        };

        Ok(Some(EmbeddingCacheRecord {
            keys: header.keys,
            matrix,
        }))
    }

    async fn save_embeddings(
        &self,
        library: &str,
        record: &EmbeddingCacheRecord,
    ) -> Result<(), StoreError> {
        let header = EmbeddingHeader {
            dim: record.matrix.dim(),
            keys: record.keys.clone(),
        };
        let header_bytes = serde_json::to_vec(&header).map_err(|e| {
            StoreError::SerializationError(format!("Failed to serialize embedding keys: {}", e))
        })?;
        let matrix_bytes = record.matrix.to_le_bytes();

        let db = self.connect().await?;
        let write_txn = db
            .begin_write()
            .map_err(db_err("Failed to begin write transaction"))?;
        {
            let mut keys_table = write_txn
                .open_table(EMBED_KEYS_TABLE)
                .map_err(db_err("Failed to open embedding_keys table"))?;
            keys_table
                .insert(library, header_bytes.as_slice())
                .map_err(db_err("Failed to insert embedding keys"))?;

            let mut matrix_table = write_txn
                .open_table(EMBED_MATRIX_TABLE)
                .map_err(db_err("Failed to open embedding_matrix table"))?;
            matrix_table
                .insert(library, matrix_bytes.as_slice())
                .map_err(db_err("Failed to insert embedding matrix"))?;
        }
        write_txn
            .commit()
            .map_err(db_err("Failed to commit embeddings"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (RedbDocumentStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("cache").join("docs.redb");
        let store = RedbDocumentStore::open(&db_path, Duration::from_secs(3600)).unwrap();
        (store, temp_dir)
    }

    fn make_record(keys: &[&str], dim: usize) -> EmbeddingCacheRecord {
        let data = (0..keys.len() * dim).map(|i| i as f32).collect();
        EmbeddingCacheRecord {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            matrix: EmbeddingMatrix::from_flat(dim, data).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_documents_scoped_per_library() {
        let (store, _temp) = create_test_store();
        store.put_document("a/b", "readme.md", "ab").await.unwrap();
        store.put_document("a/bc", "readme.md", "abc").await.unwrap();
        store.put_document("a/b", "docs/x.md", "x").await.unwrap();

        let docs = store.load_documents("a/b").await.unwrap();
        assert_eq!(docs.len(), 2);
        let paths: Vec<&str> = docs.keys().map(|k| k.as_str()).collect();
        assert_eq!(paths, vec!["docs/x.md", "readme.md"]);
        assert_eq!(docs.get("readme.md").map(String::as_str), Some("ab"));

        assert!(store.load_documents("z/z").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_document_overwrites() {
        let (store, _temp) = create_test_store();
        store.put_document("o/r", "readme.md", "v1").await.unwrap();
        store.put_document("o/r", "readme.md", "v2").await.unwrap();
        let docs = store.load_documents("o/r").await.unwrap();
        assert_eq!(docs.get("readme.md").map(String::as_str), Some("v2"));
    }

    #[tokio::test]
    async fn test_freshness_and_ttl() {
        let (store, _temp) = create_test_store();
        assert!(!store.is_fresh("o/r").await.unwrap());
        store.mark_fetched("o/r").await.unwrap();
        assert!(store.is_fresh("o/r").await.unwrap());

        let temp_dir = TempDir::new().unwrap();
        let expired = RedbDocumentStore::open(temp_dir.path().join("x.redb"), Duration::ZERO)
            .unwrap();
        expired.mark_fetched("o/r").await.unwrap();
        assert!(!expired.is_fresh("o/r").await.unwrap());
    }

    #[tokio::test]
    async fn test_embeddings_persist_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("docs.redb");
        let record = make_record(&["readme.md::Setup", "readme.md::Usage"], 3);

        {
            let store = RedbDocumentStore::open(&db_path, Duration::from_secs(60)).unwrap();
            store.save_embeddings("o/r", &record).await.unwrap();
        }

        let store = RedbDocumentStore::open(&db_path, Duration::from_secs(60)).unwrap();
        let loaded = store.load_embeddings("o/r").await.unwrap().unwrap();
        assert_eq!(loaded, record);
        assert!(store.load_embeddings("other/lib").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_embeddings_replaces_record() {
        let (store, _temp) = create_test_store();
        store
            .save_embeddings("o/r", &make_record(&["a::A", "b::B"], 2))
            .await
            .unwrap();
        store
            .save_embeddings("o/r", &make_record(&["c::C"], 4))
            .await
            .unwrap();

        let loaded = store.load_embeddings("o/r").await.unwrap().unwrap();
        assert_eq!(loaded.keys, vec!["c::C"]);
        assert_eq!(loaded.matrix.dim(), 4);
        assert_eq!(loaded.matrix.rows(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_embedding_header_is_a_miss() {
        let (store, _temp) = create_test_store();
        store
            .save_embeddings("o/r", &make_record(&["a::A"], 2))
            .await
            .unwrap();

        let db = store.connect().await.unwrap();
        let write_txn = db.begin_write().unwrap();
        {
            let mut table = write_txn.open_table(EMBED_KEYS_TABLE).unwrap();
            table.insert("o/r", b"not json".as_slice()).unwrap();
        }
        write_txn.commit().unwrap();
        drop(db);

        assert!(store.load_embeddings("o/r").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_metadata_is_not_fresh() {
        let (store, _temp) = create_test_store();
        let db = store.connect().await.unwrap();
        let write_txn = db.begin_write().unwrap();
        {
            let mut table = write_txn.open_table(META_TABLE).unwrap();
            table.insert("o/r", b"{broken".as_slice()).unwrap();
        }
        write_txn.commit().unwrap();
        drop(db);

        assert!(!store.is_fresh("o/r").await.unwrap());
    }

    #[tokio::test]
    async fn test_two_stores_share_one_file() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("docs.redb");
        let first = RedbDocumentStore::open(&db_path, Duration::from_secs(60)).unwrap();
        let second = RedbDocumentStore::open(&db_path, Duration::from_secs(60)).unwrap();

        first.put_document("o/r", "readme.md", "from first").await.unwrap();
        second.put_document("o/r", "docs/a.md", "from second").await.unwrap();
        second.mark_fetched("o/r").await.unwrap();

        let seen_by_first = first.load_documents("o/r").await.unwrap();
        let seen_by_second = second.load_documents("o/r").await.unwrap();
        assert_eq!(seen_by_first, seen_by_second);
        assert_eq!(seen_by_first.len(), 2);
        assert!(first.is_fresh("o/r").await.unwrap());
    }

    #[tokio::test]
    async fn test_open_while_file_is_held() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("docs.redb");
        let _first = RedbDocumentStore::open(&db_path, Duration::from_secs(60)).unwrap();

        let held = Database::create(&db_path).unwrap();
        let second = RedbDocumentStore::open(&db_path, Duration::from_secs(60));
        drop(held);

        let second = second.unwrap();
        second.put_document("o/r", "readme.md", "text").await.unwrap();
        assert_eq!(second.load_documents("o/r").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_operation_waits_for_lock_holder() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("docs.redb");
        let store = RedbDocumentStore::open(&db_path, Duration::from_secs(60)).unwrap();

        let held = Database::create(&db_path).unwrap();
        let writer = tokio::spawn(async move {
            store.put_document("o/r", "readme.md", "late").await?;
            store.load_documents("o/r").await
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!writer.is_finished());
        drop(held);

        let docs = writer.await.unwrap().unwrap();
        assert_eq!(docs.get("readme.md").map(String::as_str), Some("late"));
    }
}
