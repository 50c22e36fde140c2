//! MCP (Model Context Protocol) server implementation.
//!
//! Exposes library resolution and documentation queries as two MCP tools
//! over stdio. Both tools always answer with a single text content; expected
//! failures are part of the text, not protocol errors.

use crate::config::{AppConfig, Service};
use anyhow::{Context, Result};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, ErrorData, Implementation, ProtocolVersion, ServerCapabilities,
        ServerInfo,
    },
    schemars, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// `resolve-library-id` parameters.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ResolveParams {
    /// Library or project name to search for, e.g. "tokio" or "react".
    library_name: String,
}

/// `query-docs` parameters.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct QueryParams {
    /// Library identifier in the form /owner/repo, as returned by resolve-library-id.
    library_id: String,
    /// Natural-language question about the library.
    query: String,
}

/// MCP server exposing docscout lookups.
#[derive(Clone)]
pub struct DocscoutMcpServer {
    service: Arc<Service>,
    /// Tool router generated by the macro.
    tool_router: ToolRouter<Self>,
}

impl DocscoutMcpServer {
    fn new(service: Service) -> Self {
        Self {
            service: Arc::new(service),
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl DocscoutMcpServer {
    #[tool(
        name = "resolve-library-id",
        description = "Find GitHub repositories matching a library name. Returns up to five candidates as /owner/repo identifiers with description, stars, and language. Call this before query-docs when the identifier is unknown."
    )]
    async fn resolve_library_id(
        &self,
        Parameters(params): Parameters<ResolveParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let text = self.service.resolve_library(&params.library_name).await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        name = "query-docs",
        description = "Return the documentation sections of a library most relevant to a question. The library's README, docs/ folder, and documentation website are fetched on first use and cached locally."
    )]
    async fn query_docs(
        &self,
        Parameters(params): Parameters<QueryParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let text = self
            .service
            .query_docs(&params.library_id, &params.query)
            .await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool_handler]
impl ServerHandler for DocscoutMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "docscout".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("docscout Library Docs".to_string()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "docscout looks up open-source library documentation from a local cache. Use \
                 'resolve-library-id' to turn a library name into an /owner/repo identifier, \
                 then 'query-docs' with that identifier and a question."
                    .to_string(),
            ),
        }
    }
}

/// Runs the MCP server on stdio until the client disconnects.
pub async fn run_mcp_server(config: &AppConfig) -> Result<()> {
    use rmcp::transport::stdio;

    let service = config.build_service()?;
    info!(ranker = service.ranker_name(), "Starting MCP server");

    let server = DocscoutMcpServer::new(service)
        .serve(stdio())
        .await
        .context("Failed to start MCP server")?;

    server.waiting().await?;
    Ok(())
}
