//! HTTP fetching for documentation pages.

use super::{CrawlConfig, CrawlError};
use tracing::instrument;

/// Builds the HTTP client shared by every page fetch of a crawl engine.
pub fn build_client(config: &CrawlConfig) -> Result<reqwest::Client, CrawlError> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout)
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| CrawlError::RequestFailed(format!("Failed to build HTTP client: {}", e)))
}

/// Fetches an HTML page.
///
/// Only `200 OK` responses with a `text/html` content type and at most
/// `max_chars` characters are returned; anything else is
/// [`CrawlError::Skipped`].
#[instrument(skip_all, fields(url = url))]
pub async fn fetch_html(
    client: &reqwest::Client,
    url: &str,
    max_chars: usize,
) -> Result<String, CrawlError> {
    let parsed_url =
        url::Url::parse(url).map_err(|e| CrawlError::InvalidUrl(format!("{}: {}", url, e)))?;

    if parsed_url.scheme() != "http" && parsed_url.scheme() != "https" {
        return Err(CrawlError::InvalidUrl(format!(
            "Unsupported scheme: {} (only http/https allowed)",
            parsed_url.scheme()
        )));
    }

    let response = client
        .get(parsed_url)
        .send()
        .await
        .map_err(|e| CrawlError::RequestFailed(format!("Failed to fetch {}: {}", url, e)))?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(CrawlError::Skipped {
            url: url.to_string(),
            reason: format!("status {}", status.as_u16()),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    if !content_type.contains("text/html") {
        return Err(CrawlError::Skipped {
            url: url.to_string(),
            reason: format!("non-HTML content '{}'", content_type),
        });
    }

    let html = response
        .text()
        .await
        .map_err(|e| CrawlError::RequestFailed(format!("Failed to read response body: {}", e)))?;

    let chars = html.chars().count();
    if chars > max_chars {
        return Err(CrawlError::Skipped {
            url: url.to_string(),
            reason: format!("too large ({} > {} chars)", chars, max_chars),
        });
    }

    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> reqwest::Client {
        build_client(&CrawlConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let result = fetch_html(&client(), "not a url", 1000).await;
        assert!(matches!(result, Err(CrawlError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_invalid_scheme() {
        let result = fetch_html(&client(), "ftp://example.com", 1000).await;
        assert!(matches!(result, Err(CrawlError::InvalidUrl(_))));
    }
}
