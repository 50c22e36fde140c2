//! Crawl engine with breadth-first page fetching and cycle detection.
//!
//! - BFS traversal of linked pages, fetched in concurrent batches
//! - Cycle detection (a normalized URL is visited once)
//! - Depth and page-count limits
//! - Same-site filtering (host and port of the start URL)

use std::collections::{HashSet, VecDeque};

use tracing::{debug, info, instrument, warn};
use url::Url;

use super::fetcher::{build_client, fetch_html};
use super::parser::{extract_links, html_to_markdown, url_to_path};
use super::{CrawlConfig, CrawlError, CrawledPage};

/// Normalizes a URL for deduplication purposes.
///
/// Scheme, query, and fragment are dropped and trailing slashes removed, so
/// `https://example.com/page/` and `http://example.com/page#x` are identical.
pub fn normalize_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) => {
            let host = url.host_str().unwrap_or("");
            let trimmed = url.path().trim_end_matches('/');
            let path = if trimmed.is_empty() { "/" } else { trimmed };
            match url.port() {
                Some(port) => format!("{}:{}{}", host, port, path),
                None => format!("{}{}", host, path),
            }
        }
        Err(_) => raw.trim_end_matches('/').to_string(),
    }
}

/// Keeps only links on the same host and port as the start URL.
fn filter_same_site_links(links: Vec<String>, start_url: &Url) -> Vec<String> {
    links
        .into_iter()
        .filter(|link| {
            Url::parse(link).is_ok_and(|parsed| {
                parsed.host_str() == start_url.host_str() && parsed.port() == start_url.port()
            })
        })
        .collect()
}

/// Crawl engine for documentation sites.
///
/// Holds a pooled HTTP client, so one engine can crawl many sites.
pub struct CrawlEngine {
    config: CrawlConfig,
    client: reqwest::Client,
}

impl CrawlEngine {
    /// Creates a new crawl engine with the given configuration.
    pub fn new(config: CrawlConfig) -> Result<Self, CrawlError> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }

    /// Crawl limits in use.
    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Crawls a documentation site starting from `start_url`.
    ///
    /// Pages that fail to fetch or are skipped (non-HTML, too large, too
    /// little text) are logged and left out; only an unusable start URL is
    /// an error.
    ///
    /// **Example:**
    /// ```no_run
    /// use docscout_core::source::crawler::{CrawlConfig, CrawlEngine};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let engine = CrawlEngine::new(CrawlConfig::default())?;
    ///     let pages = engine.crawl("https://docs.rs/tokio").await?;
    ///     println!("Crawled {} pages", pages.len());
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip_all, fields(start_url = start_url, max_depth = self.config.max_depth))]
    pub async fn crawl(&self, start_url: &str) -> Result<Vec<CrawledPage>, CrawlError> {
        let start = Url::parse(start_url)
            .map_err(|e| CrawlError::InvalidUrl(format!("Invalid start URL: {}", e)))?;
        if start.host_str().map_or(true, str::is_empty) {
            return Err(CrawlError::InvalidUrl(format!(
                "Start URL has no host: {}",
                start_url
            )));
        }

        let max_pages = self.config.max_pages;
        let parallel = self.config.parallel_requests.max(1);
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<(String, usize)> = VecDeque::new();
        let mut results: Vec<CrawledPage> = Vec::new();

        queue.push_back((start_url.to_string(), 0));

        info!(
            "Starting crawl from {} (max_depth: {}, max_pages: {})",
            start_url, self.config.max_depth, max_pages
        );

        while !queue.is_empty() && results.len() < max_pages {
            // Collect a batch of unvisited URLs to fetch concurrently
            let mut batch = Vec::with_capacity(parallel);
            while batch.len() < parallel && results.len() + batch.len() < max_pages {
                let Some((url, depth)) = queue.pop_front() else {
                    break;
                };
                if depth > self.config.max_depth {
                    continue;
                }
                if !visited.insert(normalize_url(&url)) {
                    continue;
                }
                batch.push((url, depth));
            }

            if batch.is_empty() {
                break;
            }

            let fetch_futures = batch.into_iter().map(|(url, depth)| async move {
                debug!("Crawling: {} (depth: {})", url, depth);
                let result = self.fetch_page(&url).await;
                (url, depth, result)
            });
            let fetched = futures::future::join_all(fetch_futures).await;

            for (url, depth, result) in fetched {
                match result {
                    Ok((page, links)) => {
                        if depth < self.config.max_depth {
                            for link in filter_same_site_links(links, &start) {
                                if !visited.contains(&normalize_url(&link)) {
                                    queue.push_back((link, depth + 1));
                                }
                            }
                        }
                        info!(
                            "Scraped {} -> {} ({} chars)",
                            url,
                            page.path,
                            page.markdown.len()
                        );
                        results.push(page);
                    }
                    Err(e @ CrawlError::Skipped { .. }) => debug!("{}", e),
                    Err(e) => warn!("Failed to crawl {}: {}", url, e),
                }
            }
        }

        info!("Crawl complete: {} pages crawled", results.len());
        Ok(results)
    }

    /// Fetches one page and returns it with its outgoing links.
    async fn fetch_page(&self, url: &str) -> Result<(CrawledPage, Vec<String>), CrawlError> {
        let html = fetch_html(&self.client, url, self.config.max_page_chars).await?;

        let markdown = html_to_markdown(&html);
        let text_chars = markdown.chars().count();
        if text_chars < self.config.min_text_chars {
            return Err(CrawlError::Skipped {
                url: url.to_string(),
                reason: format!("text too short ({} chars)", text_chars),
            });
        }

        let links = extract_links(&html, url)?;
        let parsed =
            Url::parse(url).map_err(|e| CrawlError::InvalidUrl(format!("{}: {}", url, e)))?;

        Ok((
            CrawledPage {
                url: url.to_string(),
                path: url_to_path(&parsed),
                markdown,
            },
            links,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_same_site() {
        let start_url = Url::parse("https://example.com/docs/intro").unwrap();

        let links = vec![
            "https://example.com/docs/guide".to_string(),
            "https://example.com/api".to_string(),
            "http://example.com/blog".to_string(),
            "https://other.com/docs/page".to_string(),
            "https://example.com:8443/docs".to_string(),
            "https://sub.example.com/docs".to_string(),
        ];

        let filtered = filter_same_site_links(links, &start_url);

        assert_eq!(
            filtered,
            vec![
                "https://example.com/docs/guide".to_string(),
                "https://example.com/api".to_string(),
                "http://example.com/blog".to_string(),
            ]
        );
    }

    #[test]
    fn test_normalize_url_removes_trailing_slash() {
        assert_eq!(normalize_url("https://example.com/page/"), "example.com/page");
        assert_eq!(
            normalize_url("https://example.com/docs/guide/"),
            "example.com/docs/guide"
        );
    }

    #[test]
    fn test_normalize_url_handles_root() {
        assert_eq!(normalize_url("https://example.com/"), "example.com/");
        assert_eq!(normalize_url("https://example.com"), "example.com/");
    }

    #[test]
    fn test_normalize_url_deduplication() {
        let variants = [
            "https://example.com/page/",
            "https://example.com/page",
            "http://example.com/page#section",
            "https://example.com/page?ref=nav",
        ];
        for v in variants {
            assert_eq!(normalize_url(v), "example.com/page");
        }
    }

    #[test]
    fn test_normalize_url_keeps_port() {
        assert_eq!(normalize_url("http://localhost:8000/a/"), "localhost:8000/a");
    }

    #[tokio::test]
    async fn test_crawl_rejects_invalid_start_url() {
        let engine = CrawlEngine::new(CrawlConfig::default()).unwrap();
        assert!(matches!(
            engine.crawl("not a url").await,
            Err(CrawlError::InvalidUrl(_))
        ));
        assert!(matches!(
            engine.crawl("file:///tmp/docs").await,
            Err(CrawlError::InvalidUrl(_))
        ));
    }
}
