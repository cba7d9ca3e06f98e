//! Live pollution data acquisition for the Aervia air-quality core.
//!
//! This crate turns unreliable third-party feeds into one canonical
//! [`SampleSet`](aervia_types::SampleSet):
//!
//! - [`station`] -- adapter for a registry of real monitoring stations
//!   queried by radius around an anchor coordinate
//! - [`city`] -- adapter for a single-index city feed, expanded into a
//!   spatially distributed ring of synthesized samples
//! - [`provider`] -- the shared `fetch(anchor)` capability, dispatched
//!   over a fixed-priority source list
//! - [`aggregator`] -- the strict priority cascade with its
//!   minimum-cardinality short-circuit
//! - [`merger`] -- tops up an insufficient live set from the historical
//!   store and answers the "latest representative PM2.5" question
//!
//! No failure in this crate escapes a source boundary: transport and
//! parse errors degrade to empty results and a warn-level log line.

pub mod aggregator;
pub mod city;
pub mod error;
pub mod merger;
pub mod provider;
pub mod station;

pub use aggregator::RealtimeAggregator;
pub use city::{CityIndexAdapter, CityIndexConfig};
pub use error::SourceError;
pub use merger::{LatestReading, LatestSource, SensorDataMerger};
pub use provider::SampleSource;
pub use station::{StationRegistryAdapter, StationRegistryConfig};
