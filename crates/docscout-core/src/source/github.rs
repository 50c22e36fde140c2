//! GitHub REST API client.
//!
//! - One pooled `reqwest::Client` with the v3 `Accept` header and an optional
//!   bearer token
//! - Transient failures (connect errors, timeouts) are retried with
//!   exponential backoff
//! - `404 Not Found` is reported as `Ok(None)`, never as an error

use super::types::{
    ContentBlob, ContentsResponse, RepoDetails, RepoInfo, SearchResponse, TreeEntry,
};
use crate::config::{
    GITHUB_API_BASE, GITHUB_BACKOFF_BASE_MS, GITHUB_MAX_RETRIES, GITHUB_TIMEOUT_SECS, USER_AGENT,
};
use crate::error::SourceError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Configuration for [`GitHubClient`].
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// API base URL, without trailing slash
    pub api_base: String,
    /// Personal access token sent as `Authorization: Bearer <token>`
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Attempts per request for transient failures
    pub max_retries: u32,
    /// Delay before the first retry; doubles each time
    pub backoff_base: Duration,
    pub user_agent: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: GITHUB_API_BASE.to_string(),
            token: None,
            timeout: Duration::from_secs(GITHUB_TIMEOUT_SECS),
            max_retries: GITHUB_MAX_RETRIES,
            backoff_base: Duration::from_millis(GITHUB_BACKOFF_BASE_MS),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Async GitHub REST client.
pub struct GitHubClient {
    config: GitHubConfig,
    http: reqwest::Client,
}

impl GitHubClient {
    /// Builds the HTTP client with default headers from `config`.
    pub fn new(config: GitHubConfig) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| SourceError::Config(format!("Invalid GITHUB_TOKEN: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| SourceError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    /// Delay before retry number `attempt` (0-based): base, 2×base, 4×base, ...
    fn backoff(&self, attempt: u32) -> Duration {
        self.config.backoff_base.saturating_mul(1u32 << attempt.min(16))
    }

    /// GETs `path` and decodes the JSON body. `404` yields `Ok(None)`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, SourceError> {
        let url = format!("{}{}", self.config.api_base, path);
        let attempts = self.config.max_retries.max(1);
        let mut attempt = 0;

        let response = loop {
            match self.http.get(&url).query(query).send().await {
                Ok(response) => break response,
                Err(e) => {
                    let err = SourceError::from(e);
                    attempt += 1;
                    if !err.is_transient() || attempt >= attempts {
                        return Err(err);
                    }
                    let wait = self.backoff(attempt - 1);
                    warn!(
                        "Retry {}/{} for GET {}: {} (wait {:.1}s)",
                        attempt,
                        attempts,
                        path,
                        err.kind(),
                        wait.as_secs_f32()
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(path, "GitHub returned 404");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.json::<T>().await.map_err(SourceError::from)?;
        Ok(Some(body))
    }

    /// Searches repositories by keyword, sorted by stars.
    #[instrument(skip(self))]
    pub async fn search_repositories(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RepoInfo>, SourceError> {
        let params = [
            ("q", query.to_string()),
            ("per_page", limit.to_string()),
            ("sort", "stars".to_string()),
        ];
        let response: Option<SearchResponse> =
            self.get_json("/search/repositories", &params).await?;
        Ok(response
            .map(|r| r.items.into_iter().take(limit).map(RepoInfo::from).collect())
            .unwrap_or_default())
    }

    /// Fetches the decoded README, or `None` if the repository has none.
    #[instrument(skip(self))]
    pub async fn fetch_readme(&self, owner: &str, repo: &str) -> Result<Option<String>, SourceError> {
        let blob: Option<ContentBlob> = self
            .get_json(&format!("/repos/{}/{}/readme", owner, repo), &[])
            .await?;
        blob.map(|b| b.decode()).transpose()
    }

    /// Lists Markdown files under `root`, descending at most `max_depth` levels.
    ///
    /// Depth 1 lists `root` itself, depth 2 also lists its direct
    /// subdirectories, and so on. A missing directory yields an empty list.
    #[instrument(skip(self))]
    pub async fn list_markdown_tree(
        &self,
        owner: &str,
        repo: &str,
        root: &str,
        max_depth: usize,
    ) -> Result<Vec<TreeEntry>, SourceError> {
        let mut found = Vec::new();
        let mut pending = vec![(root.to_string(), 0usize)];

        while let Some((dir, depth)) = pending.pop() {
            if depth >= max_depth {
                continue;
            }
            let listing: Option<ContentsResponse> = self
                .get_json(&format!("/repos/{}/{}/contents/{}", owner, repo, dir), &[])
                .await?;
            let Some(ContentsResponse::Listing(entries)) = listing else {
                continue;
            };

            let mut subdirs = Vec::new();
            for entry in entries {
                if entry.is_markdown_file() {
                    found.push(TreeEntry {
                        path: entry.path,
                        sha: entry.sha,
                    });
                } else if entry.is_dir() {
                    subdirs.push((entry.path, depth + 1));
                }
            }
            // Reversed so subdirectories pop in listing order.
            pending.extend(subdirs.into_iter().rev());
        }

        debug!(count = found.len(), "Listed markdown files");
        Ok(found)
    }

    /// Fetches a file's content by blob SHA (works for files over 1 MB).
    #[instrument(skip(self))]
    pub async fn fetch_blob(&self, owner: &str, repo: &str, sha: &str) -> Result<String, SourceError> {
        let path = format!("/repos/{}/{}/git/blobs/{}", owner, repo, sha);
        let blob: Option<ContentBlob> = self.get_json(&path, &[]).await?;
        match blob {
            Some(blob) => blob.decode(),
            None => Err(SourceError::Status {
                status: StatusCode::NOT_FOUND.as_u16(),
                url: format!("{}{}", self.config.api_base, path),
            }),
        }
    }

    /// The repository's homepage URL, if set.
    #[instrument(skip(self))]
    pub async fn fetch_homepage(&self, owner: &str, repo: &str) -> Result<Option<String>, SourceError> {
        let details: Option<RepoDetails> = self
            .get_json(&format!("/repos/{}/{}", owner, repo), &[])
            .await?;
        Ok(details
            .and_then(|d| d.homepage)
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        let client = GitHubClient::new(GitHubConfig::default()).unwrap();
        assert_eq!(client.backoff(0), Duration::from_secs(1));
        assert_eq!(client.backoff(1), Duration::from_secs(2));
        assert_eq!(client.backoff(2), Duration::from_secs(4));
    }

    #[test]
    fn test_rejects_token_with_newline() {
        let config = GitHubConfig {
            token: Some("abc\ndef".to_string()),
            ..Default::default()
        };
        let err = GitHubClient::new(config).err().unwrap();
        assert_eq!(err.kind(), "ConfigError");
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let config = GitHubConfig {
            token: Some(String::new()),
            ..Default::default()
        };
        assert!(GitHubClient::new(config).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_api_is_request_error() {
        // Port 9 on localhost refuses connections; no retry delay.
        let config = GitHubConfig {
            api_base: "http://127.0.0.1:9".to_string(),
            max_retries: 2,
            backoff_base: Duration::ZERO,
            timeout: Duration::from_secs(2),
            ..Default::default()
        };
        let client = GitHubClient::new(config).unwrap();
        let err = client.search_repositories("tokio", 5).await.unwrap_err();
        assert!(matches!(err, SourceError::Request(_) | SourceError::Timeout(_)));
    }
}
