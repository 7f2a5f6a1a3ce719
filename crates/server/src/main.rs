//! windhelm-sw server entry point.
//!
//! Boots the cache router and exposes its events as MCP tools on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;
use windhelm_client::{CacheRouter, FetchClient, FetchConfig, RecordingClients, RouterConfig};
use windhelm_core::{AppConfig, CacheDb};

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let app = AppConfig::load()?;
    tracing::info!(version = %app.version_tag, origin = %app.origin, "Starting windhelm-sw on stdio transport");

    let db = CacheDb::open(&app.db_path).await?.with_quota(app.quota_bytes);
    let network = Arc::new(FetchClient::new(FetchConfig::from_app(&app))?);
    let clients = Arc::new(RecordingClients::new());
    let router = CacheRouter::new(RouterConfig::from_app(&app)?, db, network, clients);

    let handler = handler::WindhelmServer::new(router);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
