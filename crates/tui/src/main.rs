mod app;
mod client;

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};

use escape_admin_core::{
    config::{self, AppConfig},
    snapshot::SnapshotCache,
};
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::client::ApiClient;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    tracing::info!(api = %config.api_base_url, "Starting admin console");

    let client = ApiClient::new(&config.api_base_url)?;
    let snapshots = SnapshotCache::load(&config);

    let mut app = app::AdminApp::new(client, snapshots);
    app.run().await
}

/// Log to `logs/escape-admin.log` only; stdout belongs to the terminal UI.
fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;
    let log_path = log_dir.join("escape-admin.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(std::sync::Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
