//! Runtime configuration and path resolution for the CLI.
//!
//! Every setting is a flag with an environment variable fallback, so the MCP
//! server can be configured from a client's `env` block alone.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use directories::ProjectDirs;
use docscout_core::config::{
    ttl_from_hours, ServiceConfig, DEFAULT_CACHE_TTL_HOURS, GITHUB_TIMEOUT_SECS,
};
use docscout_core::embedding::config::DEFAULT_MODEL_ID;
use docscout_core::embedding::{EmbedderConfig, FastEmbedder};
use docscout_core::search::{LexicalRanker, Ranker, RankerKind, VectorRanker};
use docscout_core::source::{CrawlConfig, GitHubConfig, GitHubSource};
use docscout_core::storage::RedbDocumentStore;
use docscout_core::DocsService;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Database file name inside the cache directory
const DATABASE_FILENAME: &str = "docs.redb";

/// Subdirectory for downloaded embedding models
const MODELS_DIRNAME: &str = "models";

/// The service as wired up by the CLI.
pub type Service = DocsService<RedbDocumentStore, GitHubSource>;

/// Settings shared by the subcommands and the MCP server.
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// Cache directory (default: platform cache location)
    #[arg(long, env = "DOCSCOUT_CACHE_DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Hours before cached documentation is fetched again
    #[arg(long, env = "DOCSCOUT_CACHE_TTL_HOURS", default_value_t = DEFAULT_CACHE_TTL_HOURS, global = true)]
    pub cache_ttl_hours: u64,

    /// Ranking strategy: lexical (TF-IDF) or semantic (embeddings)
    #[arg(long, env = "DOCSCOUT_RANKER", default_value_t = RankerKind::default(), global = true)]
    pub ranker: RankerKind,

    /// Embedding model used by the semantic ranker
    #[arg(long, env = "DOCSCOUT_EMBED_MODEL", default_value = DEFAULT_MODEL_ID, global = true)]
    pub embed_model: String,

    /// GitHub token; raises the API rate limit
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub github_token: Option<String>,

    /// GitHub request timeout in seconds
    #[arg(long, env = "GITHUB_TIMEOUT", default_value_t = GITHUB_TIMEOUT_SECS, global = true)]
    pub github_timeout: u64,
}

impl AppConfig {
    /// Returns the cache directory.
    ///
    /// - Linux: `~/.cache/docscout/`
    /// - macOS: `~/Library/Caches/dev.docscout.docscout/`
    /// - Windows: `%LOCALAPPDATA%\docscout\docscout\cache\`
    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }
        ProjectDirs::from("dev", "docscout", "docscout")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .ok_or_else(|| anyhow!("Could not determine cache directory"))
    }

    /// Returns the path to the redb database.
    pub fn database_path(&self) -> Result<PathBuf> {
        Ok(self.cache_dir()?.join(DATABASE_FILENAME))
    }

    fn github_config(&self) -> GitHubConfig {
        GitHubConfig {
            token: self.github_token.clone().filter(|t| !t.trim().is_empty()),
            timeout: Duration::from_secs(self.github_timeout),
            ..GitHubConfig::default()
        }
    }

    /// Opens the cache and builds the service with the configured ranker.
    ///
    /// The embedding model is not loaded here; it loads on the first semantic
    /// query.
    pub fn build_service(&self) -> Result<Service> {
        let cache_dir = self.cache_dir()?;
        let db_path = self.database_path()?;
        let store = Arc::new(
            RedbDocumentStore::open(&db_path, ttl_from_hours(self.cache_ttl_hours))
                .with_context(|| format!("Failed to open cache: {}", db_path.display()))?,
        );

        let source = GitHubSource::from_config(self.github_config(), CrawlConfig::default())
            .context("Failed to create HTTP clients")?;

        let ranker: Box<dyn Ranker> = match self.ranker {
            RankerKind::Lexical => Box::new(LexicalRanker::new()),
            RankerKind::Semantic => {
                let embedder = FastEmbedder::new(EmbedderConfig {
                    model_id: self.embed_model.clone(),
                    cache_dir: Some(cache_dir.join(MODELS_DIRNAME)),
                    ..EmbedderConfig::default()
                })
                .context("Failed to configure embedding model")?;
                Box::new(VectorRanker::new(Arc::clone(&store), Arc::new(embedder)))
            }
        };

        info!(
            cache = %db_path.display(),
            ranker = %self.ranker,
            "Service ready"
        );
        Ok(DocsService::new(
            store,
            Arc::new(source),
            ranker,
            ServiceConfig::default(),
        ))
    }
}
