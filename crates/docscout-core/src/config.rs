//! Production configuration constants.
//!
//! These values define how documents are chunked, how many results a query
//! returns, and how long fetched documentation stays fresh. Runtime settings
//! that a deployment may change live in [`ServiceConfig`] and the per-module
//! config structs ([`GitHubConfig`](crate::source::GitHubConfig),
//! [`CrawlConfig`](crate::source::CrawlConfig),
//! [`EmbedderConfig`](crate::embedding::EmbedderConfig)).
//!
//! # Usage
//!
//! ```
//! use docscout_core::config::{MAX_CHUNK_CHARS, TRUNCATION_MARKER};
//!
//! let budget = MAX_CHUNK_CHARS + TRUNCATION_MARKER.chars().count();
//! assert!(budget > MAX_CHUNK_CHARS);
//! ```

use std::time::Duration;

// =============================================================================
// Chunking
// =============================================================================

/// Maximum characters kept in a chunk's content before truncation.
pub const MAX_CHUNK_CHARS: usize = 2000;

/// Appended to chunk content that was cut at [`MAX_CHUNK_CHARS`].
pub const TRUNCATION_MARKER: &str = "\n…(truncated)";

/// Title used when a document has no heading and no source path.
pub const UNTITLED: &str = "(untitled)";

/// Separator between source path and title in a chunk identity key.
pub const IDENTITY_KEY_DELIMITER: &str = "::";

// =============================================================================
// Retrieval
// =============================================================================

/// Number of chunks returned by a docs query.
pub const DEFAULT_TOP_K: usize = 5;

/// Separator placed between formatted result sections.
pub const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// Maximum repositories listed when resolving a library name.
pub const MAX_RESOLVE_RESULTS: usize = 5;

/// Default time-to-live for a fetched document set (7 days).
pub const DEFAULT_CACHE_TTL_HOURS: u64 = 7 * 24;

/// Cached document path used for a repository's README.
pub const README_PATH: &str = "readme.md";

/// Repository directory walked for Markdown docs.
pub const DOCS_ROOT: &str = "docs";

/// Maximum directory depth walked below [`DOCS_ROOT`].
pub const DOCS_MAX_DEPTH: usize = 2;

/// Cache path prefix for pages scraped from a documentation website.
pub const WEB_PREFIX: &str = "web";

// =============================================================================
// Storage
// =============================================================================

/// Attempts to open the cache database while another process holds it.
pub const STORE_OPEN_ATTEMPTS: u32 = 200;

/// Delay between attempts to open a busy cache database.
pub const STORE_OPEN_RETRY_MS: u64 = 25;

// =============================================================================
// Data source
// =============================================================================

/// User-Agent sent to GitHub and documentation sites.
pub const USER_AGENT: &str = concat!("docscout/", env!("CARGO_PKG_VERSION"));

/// GitHub REST API base URL.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Per-request timeout for GitHub API calls.
pub const GITHUB_TIMEOUT_SECS: u64 = 30;

/// Attempts per GitHub request when the failure is transient.
pub const GITHUB_MAX_RETRIES: u32 = 3;

/// First retry delay; doubles on every further attempt (1s, 2s, ...).
pub const GITHUB_BACKOFF_BASE_MS: u64 = 1000;

/// Homepage hosts that are code hosts or package registries, not docs sites.
pub const NON_DOCS_HOSTS: &[&str] = &[
    "github.com",
    "gitlab.com",
    "npmjs.com",
    "www.npmjs.com",
    "pypi.org",
    "rubygems.org",
    "crates.io",
    "pkg.go.dev",
    "hub.docker.com",
];

// =============================================================================
// Crawling
// =============================================================================

/// Maximum pages kept from one documentation site.
pub const CRAWL_MAX_PAGES: usize = 30;

/// Maximum link-follow depth from the site's start page.
pub const CRAWL_MAX_DEPTH: usize = 2;

/// Pages whose HTML is longer than this (in characters) are skipped.
pub const CRAWL_MAX_PAGE_CHARS: usize = 200_000;

/// Pages whose extracted text is shorter than this are skipped.
pub const CRAWL_MIN_TEXT_CHARS: usize = 50;

/// Per-request timeout while crawling.
pub const CRAWL_TIMEOUT_SECS: u64 = 15;

/// Pages fetched concurrently per crawl batch.
pub const CRAWL_PARALLEL_REQUESTS: usize = 4;

// =============================================================================
// Embeddings
// =============================================================================

/// Embedding dimension of the default model (BAAI/bge-small-en-v1.5).
pub const EMBEDDING_DIM: usize = 384;

/// Runtime settings for [`DocsService`](crate::retrieval::DocsService).
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Number of chunks returned per query
    pub top_k: usize,
    /// Maximum repositories listed by `resolve_library`
    pub max_resolve_results: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            max_resolve_results: MAX_RESOLVE_RESULTS,
        }
    }
}

/// Converts a TTL in hours into a [`Duration`].
pub fn ttl_from_hours(hours: u64) -> Duration {
    Duration::from_secs(hours.saturating_mul(3600))
}
