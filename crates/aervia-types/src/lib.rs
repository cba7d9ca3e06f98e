//! Shared type definitions for the Aervia air-quality core.
//!
//! This crate is the single source of truth for the data model passed
//! between the source adapters, the realtime aggregator, the sensor-data
//! merger, and the engine gateway.
//!
//! # Modules
//!
//! - [`sample`] -- Spatial samples, sample sets, and the parallel-vector
//!   sensor payload consumed by the spatial engine
//! - [`reading`] -- Persisted historical sensor readings
//! - [`engine`] -- Request/response payloads for the spatial/ML engine

pub mod engine;
pub mod reading;
pub mod sample;

// Re-export all public types at crate root for convenience.
pub use engine::{
    FeatureCollection, ForecastPoint, ForecastSeries, HeatmapGrid, ParkList, PredictedAqi,
    RouteOptions, ZoningDecision, ZoningRequest,
};
pub use reading::HistoricalReading;
pub use sample::{Coordinate, SampleError, SampleSet, SensorPayload, SpatialSample};
