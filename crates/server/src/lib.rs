//! escape-admin-server: HTTP API for the admin console.
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/api/games/list` | Discover every game (always HTTP 200) |
//! | POST | `/api/games/publish` | Mark a game as published |

pub mod handlers;

use std::future::Future;
use std::io;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use escape_admin_core::{AppConfig, DiscoveryRoots, FsGameStore, GameStore};
use tracing::{error, info};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    /// Directories and fallback entries discovery draws from.
    pub roots: Arc<DiscoveryRoots>,
    /// Datastore publish requests are applied to.
    pub store: Arc<dyn GameStore>,
}

impl ApiState {
    /// State over the filesystem layout described by `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            roots: Arc::new(DiscoveryRoots::from_config(config)),
            store: Arc::new(FsGameStore::from_config(config)),
        }
    }
}

/// Build the API router.
pub fn build_router(state: ApiState) -> Router {
    let api_routes = Router::new()
        .route("/list", get(handlers::list_games))
        .route("/publish", post(handlers::publish_game))
        .with_state(state);

    Router::new().nest("/api/games", api_routes)
}

/// Resolve once `signal` fires. If the signal handler could not be
/// installed, log it and never resolve so the server keeps running.
pub async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => {
            error!("Failed to listen for shutdown signal: {err}");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn shutdown_waits_for_the_signal() {
        let fired = tokio::time::timeout(
            Duration::from_millis(100),
            shutdown_on(async { Ok::<(), io::Error>(()) }),
        )
        .await;
        assert!(fired.is_ok());
    }

    #[tokio::test]
    async fn broken_signal_handler_keeps_serving() {
        let fired = tokio::time::timeout(
            Duration::from_millis(50),
            shutdown_on(async { Err::<(), _>(io::Error::other("no handler")) }),
        )
        .await;
        assert!(fired.is_err());
    }
}
