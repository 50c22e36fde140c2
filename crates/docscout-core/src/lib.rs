//! # docscout Core
//!
//! Local documentation lookup for open-source libraries: fetch a library's docs
//! once, cache them, split the Markdown into heading-bounded chunks, and rank
//! the chunks against a natural-language query.
//!
//! The crate is frontend-agnostic; the `docscout-cli` crate hosts it as a CLI
//! and as an MCP stdio server.
//!
//! ## Modules
//!
//! - [`chunking`] - Heading-bounded Markdown chunker
//! - [`search`] - `Ranker` trait with TF-IDF and embedding strategies
//! - [`embedding`] - Embedding model abstraction and the fastembed implementation
//! - [`storage`] - Document and embedding cache stores (redb, in-memory)
//! - [`source`] - GitHub client and documentation site crawler
//! - [`retrieval`] - Query orchestration and user-facing formatting
//! - [`config`] - Production constants and config structs
//! - [`error`] - Error types shared across modules

pub mod chunking;
pub mod config;
pub mod embedding;
pub mod error;
pub mod retrieval;
pub mod search;
pub mod source;
pub mod storage;

pub use chunking::{chunk_markdown, Chunk};
pub use retrieval::{DocsService, LibraryId};
pub use search::{LexicalRanker, Ranker, RankerKind, VectorRanker};
