//! Sensor-data HTTP API for the Aervia air-quality core.
//!
//! This crate provides an Axum server exposing the sensor-data
//! namespace under `/api/sensor`. Engine-dependent routes always answer
//! HTTP 200, serving a typed degraded default when an upstream is
//! unreachable; the 4xx range is reserved for caller-input validation.
//!
//! # Architecture
//!
//! Each request is a single logical task: the handlers read from the
//! shared [`AppState`](state::AppState) (merger, engine gateway, store
//! handle), perform their external calls with bounded timeouts, and
//! build an ephemeral response. No mutable state crosses requests
//! except the historical store, which is only written by the ingest
//! route.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
