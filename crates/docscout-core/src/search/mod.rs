//! Chunk ranking strategies.
//!
//! A query is ranked by exactly one [`Ranker`], chosen by configuration
//! ([`RankerKind`]):
//!
//! - [`LexicalRanker`] - TF-IDF over word tokens, no model required
//! - [`VectorRanker`] - cosine similarity of embeddings, with a per-library
//!   embedding cache validated by [`consistency`]
//!
//! # Architecture
//!
//! - `types`: the `Ranker` trait and `RankerKind`
//! - `keyword`: TF-IDF lexical scoring
//! - `vector`: embedding ranking backed by a [`DocumentStore`](crate::storage::DocumentStore)
//! - `consistency`: decides whether a cached embedding record can be reused
//!
//! # Usage
//!
//! ```ignore
//! use docscout_core::search::{LexicalRanker, Ranker};
//!
//! let ranker = LexicalRanker::new();
//! let top = ranker.rank("install setup", "tokio-rs/tokio", &chunks, 5).await?;
//! ```

pub mod consistency;
pub mod keyword;
pub mod types;
pub mod vector;

pub use consistency::{keys_match, validate_record, CacheVerdict};
pub use keyword::LexicalRanker;
pub use types::{Ranker, RankerKind};
pub use vector::VectorRanker;
