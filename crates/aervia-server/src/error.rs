//! Error types for the Aervia service binary.
//!
//! [`StartupError`] is the top-level error type that wraps all possible
//! failure modes during service startup.

use aervia_types::SampleError;

use crate::config::ConfigError;

/// Top-level error for the service binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The configured anchor coordinate is invalid.
    #[error("anchor error: {source}")]
    Anchor {
        /// The underlying validation error.
        #[from]
        source: SampleError,
    },

    /// The API server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: aervia_api::ServerError,
    },
}
