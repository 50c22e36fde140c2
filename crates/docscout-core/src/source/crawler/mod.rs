//! Documentation website crawler.
//!
//! Fetches a library's documentation site breadth-first and converts each
//! page into Markdown that the chunker can segment.
//!
//! **Module Organization:**
//! - `mod.rs`: configuration types and error handling
//! - `fetcher.rs`: HTTP fetching with reqwest
//! - `parser.rs`: HTML to Markdown conversion and link extraction with scraper
//! - `engine.rs`: BFS crawl with cycle detection and depth/page limits

use crate::config::{
    CRAWL_MAX_DEPTH, CRAWL_MAX_PAGES, CRAWL_MAX_PAGE_CHARS, CRAWL_MIN_TEXT_CHARS,
    CRAWL_PARALLEL_REQUESTS, CRAWL_TIMEOUT_SECS, USER_AGENT,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub mod engine;
pub mod fetcher;
pub mod parser;

pub use engine::CrawlEngine;

/// Configuration for documentation site crawling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Maximum depth to crawl (0 = start page only, 1 = start page + linked pages, etc.).
    pub max_depth: usize,

    /// Maximum number of pages kept (prevents runaway crawling).
    pub max_pages: usize,

    /// Number of pages to fetch in parallel.
    pub parallel_requests: usize,

    /// Pages with more HTML characters than this are skipped.
    pub max_page_chars: usize,

    /// Pages whose extracted text is shorter than this are skipped.
    pub min_text_chars: usize,

    /// Per-request timeout.
    pub timeout: Duration,

    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: CRAWL_MAX_DEPTH,
            max_pages: CRAWL_MAX_PAGES,
            parallel_requests: CRAWL_PARALLEL_REQUESTS,
            max_page_chars: CRAWL_MAX_PAGE_CHARS,
            min_text_chars: CRAWL_MIN_TEXT_CHARS,
            timeout: Duration::from_secs(CRAWL_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// A crawled documentation page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawledPage {
    /// URL the page was fetched from.
    pub url: String,

    /// Cache-relative path derived from the URL (e.g. `guide/install.md`).
    pub path: String,

    /// Page content converted to Markdown.
    pub markdown: String,
}

/// Errors that can occur during web crawling.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// HTTP request failed (network error, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    /// Invalid URL format.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing failed.
    #[error("HTML parsing failed: {0}")]
    ParseError(String),

    /// Page was fetched but is not worth keeping (non-HTML, too large, too short).
    #[error("Skipping {url}: {reason}")]
    Skipped { url: String, reason: String },
}
