//! Query orchestration: library identifiers, fetch-and-cache, ranking, and
//! the plain-text answers returned to users.
//!
//! # Architecture
//!
//! - `library`: `/owner/repo` identifier parsing
//! - `service`: [`DocsService`] with the two user-facing operations
//! - `format`: text rendering of ranked chunks and repository listings

pub mod format;
pub mod library;
pub mod service;

pub use library::{LibraryId, LibraryIdError};
pub use service::{DocsService, FetchSummary};
