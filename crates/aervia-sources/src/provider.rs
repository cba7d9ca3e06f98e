//! The shared source capability: `fetch(anchor) -> SampleSet`.
//!
//! Sources are dispatched through an enum rather than trait objects
//! because async methods are not dyn-compatible in Rust. The cascade
//! in [`aggregator`](crate::aggregator) walks a fixed-priority list of
//! these, which keeps the fallback order testable per source.

use aervia_types::{Coordinate, SampleSet};

use crate::city::CityIndexAdapter;
use crate::station::StationRegistryAdapter;

/// A live pollution source that can produce samples around an anchor.
#[derive(Debug, Clone)]
pub enum SampleSource {
    /// Registry of real monitoring stations queried by radius.
    StationRegistry(StationRegistryAdapter),
    /// Single-index city feed expanded into a synthesized ring.
    CityIndex(CityIndexAdapter),
}

impl SampleSource {
    /// Fetch samples around the anchor.
    ///
    /// Never fails: every source degrades to an empty set internally.
    pub async fn fetch(&self, anchor: Coordinate) -> SampleSet {
        let samples = match self {
            Self::StationRegistry(adapter) => adapter.fetch(anchor).await,
            Self::CityIndex(adapter) => adapter.fetch(anchor).await,
        };
        SampleSet::from(samples)
    }

    /// Human-readable name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::StationRegistry(_) => "station-registry",
            Self::CityIndex(_) => "city-index",
        }
    }
}
