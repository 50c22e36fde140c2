//! Embedding cache consistency check.
//!
//! A cached record is reused only when its identity keys equal, element by
//! element and in order, the keys of the chunk set being ranked. Any added,
//! removed, renamed, or reordered chunk invalidates the whole record; there is
//! no partial reuse.

use crate::storage::EmbeddingCacheRecord;

/// Outcome of checking a cached embedding record against a chunk set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheVerdict {
    /// Keys match and the matrix shape is sound; reuse it
    Hit,
    /// Keys differ from the current chunk set
    Stale,
    /// Matrix shape disagrees with its keys or with the embedder's dimension
    Corrupt,
}

/// Whether `cached` equals `current` element-wise, in order.
pub fn keys_match(cached: &[String], current: &[String]) -> bool {
    cached.len() == current.len() && cached.iter().zip(current).all(|(a, b)| a == b)
}

/// Checks a cached record against the current keys and embedding dimension.
pub fn validate_record(record: &EmbeddingCacheRecord, keys: &[String], dim: usize) -> CacheVerdict {
    if record.matrix.rows() != record.keys.len() || record.matrix.dim() != dim {
        return CacheVerdict::Corrupt;
    }
    if keys_match(&record.keys, keys) {
        CacheVerdict::Hit
    } else {
        CacheVerdict::Stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingMatrix;

    fn keys(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn record(items: &[&str], rows: usize, dim: usize) -> EmbeddingCacheRecord {
        EmbeddingCacheRecord {
            keys: keys(items),
            matrix: EmbeddingMatrix::from_flat(dim, vec![0.0; rows * dim]).unwrap(),
        }
    }

    #[test]
    fn test_keys_match() {
        assert!(keys_match(&keys(&["a", "b"]), &keys(&["a", "b"])));
        assert!(keys_match(&[], &[]));
        assert!(!keys_match(&keys(&["a", "b"]), &keys(&["b", "a"])));
        assert!(!keys_match(&keys(&["a"]), &keys(&["a", "b"])));
        assert!(!keys_match(&keys(&["a", "b"]), &keys(&["a", "c"])));
    }

    #[test]
    fn test_validate_hit() {
        let r = record(&["x::A", "x::B"], 2, 4);
        assert_eq!(validate_record(&r, &keys(&["x::A", "x::B"]), 4), CacheVerdict::Hit);
    }

    #[test]
    fn test_validate_stale() {
        let r = record(&["x::A", "x::B"], 2, 4);
        assert_eq!(validate_record(&r, &keys(&["x::A", "x::C"]), 4), CacheVerdict::Stale);
    }

    #[test]
    fn test_validate_corrupt_rows() {
        let r = record(&["x::A", "x::B"], 3, 4);
        assert_eq!(validate_record(&r, &keys(&["x::A", "x::B"]), 4), CacheVerdict::Corrupt);
    }

    #[test]
    fn test_validate_corrupt_dimension() {
        let r = record(&["x::A"], 1, 4);
        assert_eq!(validate_record(&r, &keys(&["x::A"]), 8), CacheVerdict::Corrupt);
    }
}
