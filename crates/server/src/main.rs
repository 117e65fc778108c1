use anyhow::{Context, Result};
use escape_admin_core::config::{self, AppConfig};
use escape_admin_server::{build_router, shutdown_on, ApiState};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    info!(
        modern = ?config.modern_candidates(),
        legacy = ?config.legacy_candidates(),
        "Serving game directories"
    );

    let router = build_router(ApiState::from_config(&config));
    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!("API listening on {}", config.listen_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_on(tokio::signal::ctrl_c()))
        .await
        .context("API server error")
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .init();
}
