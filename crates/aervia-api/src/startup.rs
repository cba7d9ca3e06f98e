//! Startup helper for embedding the sensor API in a host binary.
//!
//! Provides [`spawn_server`] which launches the API on a background
//! Tokio task so the host can run its own startup work (for example a
//! warm sync of the historical store) concurrently.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError, start_server};
use crate::state::AppState;

/// Errors that can occur when spawning the sensor API server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the sensor API server on a background Tokio task.
///
/// Returns a [`JoinHandle`] so the caller can manage the server's
/// lifecycle. The address is validated eagerly so obvious
/// misconfigurations fail before the task is spawned.
///
/// # Errors
///
/// Returns [`StartupError::Server`] when the configured address does
/// not parse.
pub fn spawn_server(
    config: ServerConfig,
    state: Arc<AppState>,
) -> Result<JoinHandle<()>, StartupError> {
    let addr_str = format!("{}:{}", config.host, config.port);
    let _: std::net::SocketAddr = addr_str.parse().map_err(|e| {
        StartupError::Server(ServerError::Bind(format!("invalid address {addr_str}: {e}")))
    })?;

    let handle = tokio::spawn(async move {
        if let Err(e) = start_server(&config, state).await {
            tracing::error!(error = %e, "sensor API exited with error");
        }
    });

    tracing::info!("sensor API spawned on background task");
    Ok(handle)
}
