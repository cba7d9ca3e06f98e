//! Sensor-data merger.
//!
//! Combines the aggregator's live sample set with historical readings
//! when the live set is too small for interpolation. The merge is
//! append-only and order-preserving: live samples first, then stored
//! readings newest-first, with coordinate-less records skipped. History
//! is never touched when live data already suffices.

use serde::Serialize;
use tracing::debug;

use aervia_store::HistoryStore;
use aervia_types::{Coordinate, SampleSet};

use crate::aggregator::RealtimeAggregator;

/// Maximum number of historical readings used to top up a live set.
const HISTORY_TOP_UP_LIMIT: usize = 100;

/// Where the latest representative PM2.5 value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LatestSource {
    /// Mean of a live aggregation pass.
    Realtime,
    /// Most recent stored reading.
    Database,
    /// No data exists anywhere; the value is a degraded zero.
    None,
}

/// The latest representative PM2.5 and its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatestReading {
    /// Representative PM2.5 value.
    pub pm25: f64,
    /// Which tier produced the value.
    pub source: LatestSource,
}

/// Merges live aggregation output with the historical store.
#[derive(Debug, Clone)]
pub struct SensorDataMerger {
    aggregator: RealtimeAggregator,
    store: HistoryStore,
    anchor: Coordinate,
}

impl SensorDataMerger {
    /// Create a merger over an aggregator and a store, anchored at the
    /// service's configured coordinate.
    #[must_use]
    pub const fn new(aggregator: RealtimeAggregator, store: HistoryStore, anchor: Coordinate) -> Self {
        Self {
            aggregator,
            store,
            anchor,
        }
    }

    /// The sample set used by both the heatmap and the routing paths.
    ///
    /// Live data first; history is only consulted when the live set is
    /// below the interpolation minimum, and the merged set is returned
    /// regardless of its final size -- the caller decides usability.
    pub async fn merged_samples(&self) -> SampleSet {
        let mut set = self.aggregator.acquire(self.anchor).await;
        if set.is_usable() {
            return set;
        }

        let live = set.len();
        let history = self.store.recent(HISTORY_TOP_UP_LIMIT).await;
        set.extend(history.iter().filter_map(aervia_types::HistoricalReading::as_sample));
        debug!(
            live,
            merged = set.len(),
            "live set insufficient, topped up from history"
        );
        set
    }

    /// Current representative PM2.5, preferring live aggregation over
    /// the stored latest reading.
    pub async fn latest_pm25(&self) -> LatestReading {
        let live = self.aggregator.acquire(self.anchor).await;
        if let Some(mean) = live.mean_pm25() {
            return LatestReading {
                pm25: mean,
                source: LatestSource::Realtime,
            };
        }

        match self.store.latest().await {
            Some(reading) => LatestReading {
                pm25: reading.pm25,
                source: LatestSource::Database,
            },
            None => LatestReading {
                pm25: 0.0,
                source: LatestSource::None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    use aervia_types::HistoricalReading;

    /// A merger whose aggregator has no sources always yields an empty
    /// live set, which forces the history path.
    fn history_only_merger(store: HistoryStore) -> SensorDataMerger {
        let anchor = Coordinate {
            lat: 9.9312,
            lon: 76.2673,
        };
        SensorDataMerger::new(RealtimeAggregator::new(Vec::new()), store, anchor)
    }

    fn reading(hours_ago: i64, pm25: f64) -> HistoricalReading {
        HistoricalReading::at(9.93, 76.26, pm25, Utc::now() - Duration::hours(hours_ago))
    }

    #[tokio::test]
    async fn empty_live_set_is_topped_up_from_history() {
        let store = HistoryStore::with_readings(vec![reading(1, 10.0), reading(2, 20.0)]);
        let merger = history_only_merger(store);

        let merged = merger.merged_samples().await;
        assert_eq!(merged.len(), 2);
    }

    #[tokio::test]
    async fn coordinate_less_history_records_are_skipped() {
        let mut orphan = reading(1, 99.0);
        orphan.lat = None;
        let store = HistoryStore::with_readings(vec![orphan, reading(2, 20.0), reading(3, 30.0)]);
        let merger = history_only_merger(store);

        let merged = merger.merged_samples().await;
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|s| (s.pm25 - 99.0).abs() > 1e-9));
    }

    #[tokio::test]
    async fn merged_set_may_stay_below_minimum() {
        let store = HistoryStore::with_readings(vec![reading(1, 10.0)]);
        let merger = history_only_merger(store);

        let merged = merger.merged_samples().await;
        assert_eq!(merged.len(), 1);
        assert!(!merged.is_usable());
    }

    #[tokio::test]
    async fn latest_falls_back_to_stored_reading() {
        let store = HistoryStore::with_readings(vec![reading(1, 73.6), reading(9, 12.0)]);
        let merger = history_only_merger(store);

        let latest = merger.latest_pm25().await;
        assert_eq!(latest.source, LatestSource::Database);
        assert!((latest.pm25 - 73.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn latest_with_no_data_anywhere_is_degraded_zero() {
        let merger = history_only_merger(HistoryStore::new());

        let latest = merger.latest_pm25().await;
        assert_eq!(latest.source, LatestSource::None);
        assert!(latest.pm25.abs() < f64::EPSILON);
    }
}
