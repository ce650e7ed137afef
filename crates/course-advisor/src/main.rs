mod config;
mod error;
mod server;

use std::sync::Arc;

use course_catalog::QueryEngine;
use rmcp::{ServiceExt, transport::stdio};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use server::CourseAdvisorServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout is reserved for MCP JSON-RPC
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting course-advisor MCP server");

    let config = Config::from_env()?;
    info!(
        data_path = %config.data_path,
        default_limit = config.default_limit,
        max_limit = config.max_limit,
        "configuration loaded"
    );

    let engine = QueryEngine::open(config.data_path(), config.engine_options())
        .map_err(error::AppError::from)?;
    let server = CourseAdvisorServer::new(Arc::new(engine), config);

    info!("MCP server ready, serving on stdio");
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!(error = %e, "MCP server error");
    })?;

    service.waiting().await?;
    info!("MCP server shut down");
    Ok(())
}
