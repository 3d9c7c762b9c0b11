//! glances-tools — MCP stdio server for Glances monitoring agents
//!
//! Usage: `glances-tools [servers_config.json]`. Protocol frames go to
//! stdout; logs go to stderr.

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use glances_tools::client::GlancesClient;
use glances_tools::config::Settings;
use glances_tools::handlers::Glances;
use glances_tools::mcp::McpServer;
use glances_tools::registry::Registry;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact()
        .init();

    info!("Glances tool server starting...");

    let mut settings = Settings::from_env();
    if let Some(path) = std::env::args().nth(1) {
        settings = settings.with_servers_path(path);
    }

    let registry = Registry::load(&settings.servers_path, &settings.default_server)
        .context("Failed to load server registry")?;

    let glances = Glances::new(GlancesClient::from_settings(&settings));
    let server = McpServer::new(registry, glances);

    info!("Serving MCP over stdio (timeout: {:?})", settings.timeout);
    server
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .context("MCP stdio transport failed")?;

    info!("Glances tool server shutting down");
    Ok(())
}
