//! Error types for source acquisition.
//!
//! These errors never cross an adapter boundary: every adapter converts
//! them into an empty result and a warn-level log line. They exist so
//! the failure reason survives long enough to be logged.

/// Errors raised while querying an upstream pollution source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The HTTP request failed or timed out.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("upstream returned {status}: {body}")]
    Status {
        /// HTTP status code from the upstream.
        status: reqwest::StatusCode,
        /// Response body, for the log line.
        body: String,
    },

    /// The payload did not match the expected schema.
    #[error("malformed payload: {0}")]
    Malformed(String),
}
