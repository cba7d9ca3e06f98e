//! Shared application state for the sensor API server.
//!
//! [`AppState`] wires the three collaborators every handler needs: the
//! sensor-data merger (live aggregation plus history top-up), the
//! engine gateway, and the historical store handle. All of them are
//! cheaply cloneable; the state is wrapped in an [`Arc`] and injected
//! via Axum's `State` extractor.

use aervia_engine::EngineClient;
use aervia_sources::SensorDataMerger;
use aervia_store::HistoryStore;

/// Shared state for the Axum application.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Live aggregation with historical top-up.
    pub merger: SensorDataMerger,
    /// Gateway to the spatial/ML engine.
    pub engine: EngineClient,
    /// Historical readings store (read-mostly; written by ingest only).
    pub store: HistoryStore,
}

impl AppState {
    /// Assemble the application state from its collaborators.
    #[must_use]
    pub const fn new(merger: SensorDataMerger, engine: EngineClient, store: HistoryStore) -> Self {
        Self {
            merger,
            engine,
            store,
        }
    }
}
