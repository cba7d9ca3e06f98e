//! Gateway to the external spatial/ML computation engine.
//!
//! The engine performs kriging interpolation, pollution-aware routing,
//! park ranking, trend forecasting, and zoning analysis behind plain
//! HTTP POST endpoints. This crate owns the request construction, the
//! per-operation timeouts, and -- most importantly -- the guarantee
//! that an engine outage never surfaces as an error to the original
//! caller: every operation answers with either the engine's payload or
//! a typed, empty-but-valid degraded default.
//!
//! # Modules
//!
//! - [`degraded`] -- the `Result<T, Degraded<T>>` shape the HTTP layer
//!   serializes unconditionally as 200
//! - [`client`] -- the reqwest-backed [`EngineClient`](client::EngineClient)

pub mod client;
pub mod degraded;
mod error;

pub use client::EngineClient;
pub use degraded::{Degraded, GatewayResult};
pub use error::EngineError;
