//! HTTP API for accessmap.
//!
//! The server owns one [`Storage`] behind a mutex in [`AppState`]. Handlers
//! lock it for the duration of a single query. An optional background tick
//! prunes expired sessions.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{info, warn};

pub use error::{ErrorBody, ErrorResponse};
pub use extract::{CurrentUser, MaybeUser};
pub use routes::build_router;
pub use state::AppState;

use crate::config::Config;
use crate::error::Result;
use crate::storage::Storage;

/// Serve the API until Ctrl-C is received.
///
/// # Errors
///
/// Returns an error if the bind address is invalid or the listener fails.
pub async fn serve(config: Config, storage: Storage) -> Result<()> {
    let addr = config.bind_address()?;
    let prune_interval = config.session_prune_interval();
    let state = AppState::new(config, storage);

    if let Some(interval) = prune_interval {
        tokio::spawn(prune_sessions(Arc::clone(&state), interval));
    }

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn prune_sessions(state: Arc<AppState>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    // The first tick completes immediately.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        if let Err(e) = state
            .storage()
            .and_then(|storage| storage.prune_expired_sessions())
        {
            warn!("Session pruning failed: {}", e);
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
