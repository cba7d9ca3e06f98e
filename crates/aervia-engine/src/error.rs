//! Internal engine-call errors.
//!
//! These never leave the gateway: every public operation converts them
//! into a [`Degraded`](crate::degraded::Degraded) default. They exist
//! so the failure reason survives into the log line and the degraded
//! reason field.

/// Errors raised while calling the computation engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The HTTP request failed or timed out.
    #[error("engine transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The engine answered with a non-success status.
    #[error("engine returned {status}: {body}")]
    Status {
        /// HTTP status code from the engine.
        status: reqwest::StatusCode,
        /// Response body, for the log line.
        body: String,
    },

    /// The engine's response did not match the expected shape.
    #[error("engine response parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}
