//! Retrieval orchestrator.
//!
//! [`DocsService`] answers the two user-facing operations:
//!
//! - [`resolve_library`](DocsService::resolve_library): library name to
//!   candidate `/owner/repo` identifiers
//! - [`query_docs`](DocsService::query_docs): identifier and question to the
//!   most relevant documentation sections
//!
//! Both return plain text. Expected failures (bad identifier, upstream
//! errors, nothing cached) become readable messages instead of errors.

use super::format::{format_repos, format_sections};
use super::library::LibraryId;
use crate::chunking::chunk_documents;
use crate::config::{ServiceConfig, DOCS_MAX_DEPTH, DOCS_ROOT, README_PATH, WEB_PREFIX};
use crate::search::Ranker;
use crate::source::{is_docs_url, DocSource};
use crate::storage::{DocumentStore, StoreError};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// What one fetch-and-cache run stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// README stored
    pub readme: bool,
    /// Files stored from the `docs/` tree
    pub docs: usize,
    /// Pages stored from the documentation website
    pub web: usize,
}

/// Documentation lookup service.
///
/// Generic over the cache ([`DocumentStore`]) and the upstream
/// ([`DocSource`]); the ranking strategy is fixed at construction.
pub struct DocsService<S: DocumentStore, D: DocSource> {
    store: Arc<S>,
    source: Arc<D>,
    ranker: Box<dyn Ranker>,
    config: ServiceConfig,
}

impl<S: DocumentStore, D: DocSource> DocsService<S, D> {
    pub fn new(store: Arc<S>, source: Arc<D>, ranker: Box<dyn Ranker>, config: ServiceConfig) -> Self {
        Self {
            store,
            source,
            ranker,
            config,
        }
    }

    /// Name of the ranking strategy in use.
    pub fn ranker_name(&self) -> &'static str {
        self.ranker.name()
    }

    /// Searches GitHub for `library_name` and lists matching identifiers.
    #[instrument(skip(self))]
    pub async fn resolve_library(&self, library_name: &str) -> String {
        let repos = match self
            .source
            .search_repositories(library_name, self.config.max_resolve_results)
            .await
        {
            Ok(repos) => repos,
            Err(e) => {
                warn!(error = %e, "Repository search failed");
                return format!(
                    "Failed to search GitHub for '{}': {}. Check network or set GITHUB_TOKEN.",
                    library_name,
                    e.kind()
                );
            }
        };

        if repos.is_empty() {
            return format!("No repositories found for '{}'.", library_name);
        }
        format_repos(&repos)
    }

    /// Returns the documentation sections most relevant to `query`.
    ///
    /// Fetches and caches the library first if it is not cached or has expired.
    #[instrument(skip(self, query), fields(ranker = self.ranker.name()))]
    pub async fn query_docs(&self, library_id: &str, query: &str) -> String {
        let library = match LibraryId::parse(library_id) {
            Ok(library) => library,
            Err(e) => return e.to_string(),
        };
        let key = library.cache_key();

        let fresh = match self.store.is_fresh(&key).await {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!(library = %library, error = %e, "Freshness check failed, refetching");
                false
            }
        };

        if !fresh {
            if let Err(e) = self.fetch_and_cache(&library).await {
                return format!("Failed to cache documentation for {}: {}", library, e);
            }
        }

        let documents = match self.store.load_documents(&key).await {
            Ok(documents) => documents,
            Err(e) => return format!("Failed to cache documentation for {}: {}", library, e),
        };
        if documents.is_empty() {
            return format!("No documentation found for {}.", library);
        }

        let chunks = chunk_documents(&documents);
        if chunks.is_empty() {
            return format!("Documentation for {} could not be chunked.", library);
        }
        debug!(documents = documents.len(), chunks = chunks.len(), "Chunked documentation");

        match self
            .ranker
            .rank(query, &key, &chunks, self.config.top_k)
            .await
        {
            Ok(ranked) => format_sections(&ranked),
            Err(e) => format!(
                "Failed to rank documentation for {}: {} ({})",
                library,
                e.kind(),
                e
            ),
        }
    }

    /// Fetches README, `docs/` Markdown, and the documentation website into
    /// the store, then marks the library fetched.
    ///
    /// Each stage is best-effort: upstream failures are logged and the next
    /// stage still runs. Only failing to mark the library fetched is an error.
    #[instrument(skip(self, library), fields(library = %library))]
    pub async fn fetch_and_cache(&self, library: &LibraryId) -> Result<FetchSummary, StoreError> {
        let key = library.cache_key();
        let (owner, repo) = (library.owner(), library.repo());
        let mut summary = FetchSummary::default();

        // Stage 1: README
        match self.source.fetch_readme(owner, repo).await {
            Ok(Some(readme)) => match self.store.put_document(&key, README_PATH, &readme).await {
                Ok(()) => summary.readme = true,
                Err(e) => warn!(error = %e, "Failed to store README"),
            },
            Ok(None) => debug!("Repository has no README"),
            Err(e) => warn!(error = %e, "Failed to fetch README"),
        }

        // Stage 2: docs/ tree
        match self
            .source
            .list_docs_tree(owner, repo, DOCS_ROOT, DOCS_MAX_DEPTH)
            .await
        {
            Ok(entries) => {
                for entry in entries {
                    let text = match self.source.fetch_blob(owner, repo, &entry.sha).await {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(path = %entry.path, error = %e, "Failed to fetch blob");
                            continue;
                        }
                    };
                    match self.store.put_document(&key, &entry.path, &text).await {
                        Ok(()) => summary.docs += 1,
                        Err(e) => warn!(path = %entry.path, error = %e, "Failed to store document"),
                    }
                }
            }
            Err(e) => warn!(error = %e, "Failed to list {}/", DOCS_ROOT),
        }

        // Stage 3: documentation website
        match self.source.fetch_homepage(owner, repo).await {
            Ok(Some(homepage)) if is_docs_url(&homepage) => {
                match self.source.crawl_site(&homepage).await {
                    Ok(pages) => {
                        for page in pages {
                            let path = format!("{}/{}", WEB_PREFIX, page.path);
                            match self.store.put_document(&key, &path, &page.markdown).await {
                                Ok(()) => summary.web += 1,
                                Err(e) => warn!(path = %path, error = %e, "Failed to store page"),
                            }
                        }
                    }
                    Err(e) => warn!(url = %homepage, error = %e, "Failed to crawl website"),
                }
            }
            Ok(Some(homepage)) => debug!(url = %homepage, "Homepage is not a docs site"),
            Ok(None) => debug!("Repository has no homepage"),
            Err(e) => warn!(error = %e, "Failed to fetch homepage"),
        }

        self.store.mark_fetched(&key).await?;
        info!(
            readme = summary.readme,
            docs = summary.docs,
            web = summary.web,
            "Cached documentation"
        );
        Ok(summary)
    }
}
