//! Typed degraded defaults.
//!
//! Engine-dependent operations return `Result<T, Degraded<T>>`: the
//! `Ok` branch carries the engine's payload, the `Err` branch carries a
//! valid default of the same type plus the failure reason. The HTTP
//! layer serializes whichever branch it receives as 200; the error
//! channel is reserved for caller-input validation alone.

/// A well-typed default payload standing in for a failed upstream call.
#[derive(Debug, Clone, PartialEq)]
pub struct Degraded<T> {
    /// The empty-but-valid payload to serve in place of engine output.
    pub payload: T,
    /// Why the default was served; logged, and in some payloads also
    /// surfaced as a warning field.
    pub reason: String,
}

impl<T> Degraded<T> {
    /// Wrap a default payload with its failure reason.
    pub fn new(payload: T, reason: impl Into<String>) -> Self {
        Self {
            payload,
            reason: reason.into(),
        }
    }
}

/// Outcome of one gateway operation.
///
/// Consume with `result.unwrap_or_else(|d| d.payload)` at the HTTP
/// boundary; both branches are serializable payloads.
pub type GatewayResult<T> = Result<T, Degraded<T>>;
