//! Error types for the sensor API layer.
//!
//! [`ApiError`] covers the narrow set of failures this layer is allowed
//! to surface. Per the degraded-default policy, engine and source
//! failures never become errors here; only caller-input problems map to
//! 4xx, via the [`IntoResponse`](axum::response::IntoResponse)
//! implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the sensor API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The caller supplied missing or unparseable input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A serialization error while building a response.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Serialization(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("JSON error: {e}"))
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
