//! Documentation data sources.
//!
//! [`DocSource`] is everything the retrieval service needs from the outside
//! world: repository search, README and `docs/` tree content, the homepage
//! URL, and a crawl of that homepage. [`GitHubSource`] implements it with the
//! GitHub REST API and the [`crawler`].
//!
//! JSON is decoded into typed records at this boundary ([`RepoInfo`],
//! [`ContentsEntry`], [`ContentBlob`]); callers only see decoded text.

pub mod crawler;
pub mod github;
pub mod types;

pub use crawler::{CrawlConfig, CrawlEngine, CrawlError, CrawledPage};
pub use github::{GitHubClient, GitHubConfig};
pub use types::{ContentBlob, ContentsEntry, RepoInfo, TreeEntry};

use crate::config::NON_DOCS_HOSTS;
use crate::error::SourceError;

/// Upstream provider of library documentation.
#[async_trait::async_trait]
pub trait DocSource: Send + Sync {
    /// Repositories matching `query`, most stars first, at most `limit`.
    async fn search_repositories(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RepoInfo>, SourceError>;

    /// Decoded README text, or `None` if the repository has no README.
    async fn fetch_readme(&self, owner: &str, repo: &str) -> Result<Option<String>, SourceError>;

    /// Markdown files below `root`, at most `max_depth` directory levels deep.
    async fn list_docs_tree(
        &self,
        owner: &str,
        repo: &str,
        root: &str,
        max_depth: usize,
    ) -> Result<Vec<TreeEntry>, SourceError>;

    /// Decoded file content by blob SHA.
    async fn fetch_blob(&self, owner: &str, repo: &str, sha: &str) -> Result<String, SourceError>;

    /// Repository homepage URL, if one is set.
    async fn fetch_homepage(&self, owner: &str, repo: &str) -> Result<Option<String>, SourceError>;

    /// Crawls a documentation site into Markdown pages.
    async fn crawl_site(&self, url: &str) -> Result<Vec<CrawledPage>, SourceError>;
}

/// Whether a homepage URL looks like a documentation site worth crawling.
///
/// Code hosts and package registries are already covered by the GitHub API
/// or carry no docs, so they are rejected along with URLs that have no host.
pub fn is_docs_url(raw: &str) -> bool {
    match url::Url::parse(raw) {
        Ok(url) => match url.host_str() {
            Some(host) if !host.is_empty() => {
                let host = host.to_ascii_lowercase();
                !NON_DOCS_HOSTS.contains(&host.as_str())
            }
            _ => false,
        },
        Err(_) => false,
    }
}

/// [`DocSource`] backed by the GitHub REST API and the site crawler.
pub struct GitHubSource {
    github: GitHubClient,
    crawler: CrawlEngine,
}

impl GitHubSource {
    pub fn new(github: GitHubClient, crawler: CrawlEngine) -> Self {
        Self { github, crawler }
    }

    /// Builds both clients from their configs.
    pub fn from_config(github: GitHubConfig, crawl: CrawlConfig) -> Result<Self, SourceError> {
        Ok(Self::new(GitHubClient::new(github)?, CrawlEngine::new(crawl)?))
    }
}

#[async_trait::async_trait]
impl DocSource for GitHubSource {
    async fn search_repositories(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RepoInfo>, SourceError> {
        self.github.search_repositories(query, limit).await
    }

    async fn fetch_readme(&self, owner: &str, repo: &str) -> Result<Option<String>, SourceError> {
        self.github.fetch_readme(owner, repo).await
    }

    async fn list_docs_tree(
        &self,
        owner: &str,
        repo: &str,
        root: &str,
        max_depth: usize,
    ) -> Result<Vec<TreeEntry>, SourceError> {
        self.github
            .list_markdown_tree(owner, repo, root, max_depth)
            .await
    }

    async fn fetch_blob(&self, owner: &str, repo: &str, sha: &str) -> Result<String, SourceError> {
        self.github.fetch_blob(owner, repo, sha).await
    }

    async fn fetch_homepage(&self, owner: &str, repo: &str) -> Result<Option<String>, SourceError> {
        self.github.fetch_homepage(owner, repo).await
    }

    async fn crawl_site(&self, url: &str) -> Result<Vec<CrawledPage>, SourceError> {
        Ok(self.crawler.crawl(url).await?)
    }
}
