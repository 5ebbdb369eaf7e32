//! mdr HTTP server.
//!
//! Usage: `mdr-server [CONFIG_PATH]`. Without an argument the path comes
//! from `MDR_CONFIG`, then `~/.config/mdr/config.toml`. A missing file means
//! defaults.

use anyhow::Context;
use mdr::{AppConfig, AppState, SearchServer};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("MDR_CONFIG").map(PathBuf::from))
        .unwrap_or_else(AppConfig::default_config_path);

    let mut config = AppConfig::load_or_default(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    config.apply_env_overrides();
    if config.ensure_session_secret() {
        tracing::warn!("no session secret configured, sessions will not survive a restart");
    }
    config.validate().context("invalid configuration")?;

    if config.search.google_api_key.is_none() || config.search.google_engine_id.is_none() {
        tracing::info!("Google credentials not set, Google results come from the mock source");
    }

    let state = AppState::from_config(&config)?;
    let server = SearchServer::start(state, &config.server)
        .await
        .context("failed to start server")?;
    tracing::info!(addr = %server.addr(), "mdr-server started");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    tracing::info!("shutdown signal received");
    server.shutdown();
    Ok(())
}
