//! docscout CLI - local documentation lookup for open-source libraries.
//!
//! # Usage
//!
//! ```bash
//! # Find the identifier for a library
//! docscout resolve tokio
//!
//! # Ask a question about it (fetches and caches the docs on first use)
//! docscout query /tokio-rs/tokio how do I spawn a task
//! docscout --ranker lexical query /tokio-rs/tokio spawn_blocking
//!
//! # Run as MCP server (for AI assistants)
//! docscout --mcp
//! ```

mod config;
mod mcp;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::AppConfig;
use tracing_subscriber::EnvFilter;

/// Local documentation lookup for open-source libraries.
///
/// Fetches a library's README, docs/ folder, and documentation website once,
/// caches them, and returns the sections most relevant to a question.
#[derive(Parser)]
#[command(name = "docscout", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    config: AppConfig,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Run as MCP (Model Context Protocol) server on stdio
    #[arg(long)]
    mcp: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Search GitHub for a library and list /owner/repo identifiers
    Resolve {
        /// Library name, e.g. "react"
        library_name: String,
    },
    /// Return the documentation sections most relevant to a question
    Query {
        /// Library identifier, e.g. /facebook/react
        library_id: String,
        /// Question; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries results and MCP traffic
    let default_level = if cli.verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.mcp {
        return mcp::run_mcp_server(&cli.config).await;
    }

    match cli.command {
        Some(Command::Resolve { library_name }) => {
            let service = cli.config.build_service()?;
            println!("{}", service.resolve_library(&library_name).await);
        }
        Some(Command::Query { library_id, query }) => {
            let service = cli.config.build_service()?;
            println!("{}", service.query_docs(&library_id, &query.join(" ")).await);
        }
        None => {
            eprintln!("No command provided. Use --help for usage information.");
            std::process::exit(1);
        }
    }

    Ok(())
}
