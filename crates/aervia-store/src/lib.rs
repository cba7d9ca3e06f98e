//! Historical time-series store for the Aervia air-quality core.
//!
//! The store is an external collaborator from the core's point of view:
//! the merger and the gateway only ever read from it, ordered newest
//! first. The single write path is [`HistoryStore::append`], used by the
//! field-device ingest route, which is order-independent and never part
//! of an aggregation request.
//!
//! The backing implementation is in-memory behind a
//! [`tokio::sync::RwLock`]. Readings are kept sorted newest-first on
//! insert so every query path is a prefix scan.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use aervia_types::HistoricalReading;

/// Shared handle to the historical readings store.
///
/// Cloning is cheap; all clones see the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    readings: Arc<RwLock<Vec<HistoricalReading>>>,
}

impl HistoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with readings.
    ///
    /// Input order is irrelevant; readings are sorted newest-first.
    #[must_use]
    pub fn with_readings(mut readings: Vec<HistoricalReading>) -> Self {
        readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Self {
            readings: Arc::new(RwLock::new(readings)),
        }
    }

    /// Append one reading.
    ///
    /// Maintains the newest-first ordering regardless of arrival order,
    /// since field devices may deliver readings late.
    pub async fn append(&self, reading: HistoricalReading) {
        let mut readings = self.readings.write().await;
        let position = readings
            .iter()
            .position(|r| r.timestamp <= reading.timestamp)
            .unwrap_or(readings.len());
        readings.insert(position, reading);
        debug!(total = readings.len(), "reading appended");
    }

    /// Up to `limit` most recent readings, newest first.
    pub async fn recent(&self, limit: usize) -> Vec<HistoricalReading> {
        let readings = self.readings.read().await;
        readings.iter().take(limit).cloned().collect()
    }

    /// Up to `limit` readings taken at or after `cutoff`, newest first.
    pub async fn since(&self, cutoff: DateTime<Utc>, limit: usize) -> Vec<HistoricalReading> {
        let readings = self.readings.read().await;
        readings
            .iter()
            .take_while(|r| r.timestamp >= cutoff)
            .take(limit)
            .cloned()
            .collect()
    }

    /// The single most recent reading, if any exist.
    pub async fn latest(&self) -> Option<HistoricalReading> {
        let readings = self.readings.read().await;
        readings.first().cloned()
    }

    /// Number of stored readings.
    pub async fn len(&self) -> usize {
        self.readings.read().await.len()
    }

    /// Whether the store holds no readings.
    pub async fn is_empty(&self) -> bool {
        self.readings.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn reading(hours_ago: i64, pm25: f64) -> HistoricalReading {
        HistoricalReading::at(9.93, 76.26, pm25, Utc::now() - Duration::hours(hours_ago))
    }

    #[tokio::test]
    async fn recent_is_newest_first() {
        let store = HistoryStore::with_readings(vec![reading(3, 30.0), reading(1, 10.0), reading(2, 20.0)]);

        let pm: Vec<f64> = store.recent(10).await.iter().map(|r| r.pm25).collect();
        assert_eq!(pm, vec![10.0, 20.0, 30.0]);
    }

    #[tokio::test]
    async fn recent_respects_limit() {
        let store = HistoryStore::with_readings((0..10).map(|h| reading(h, 5.0)).collect());
        assert_eq!(store.recent(4).await.len(), 4);
    }

    #[tokio::test]
    async fn since_drops_older_readings() {
        let store = HistoryStore::with_readings(vec![reading(30, 30.0), reading(1, 10.0), reading(2, 20.0)]);

        let cutoff = Utc::now() - Duration::hours(24);
        let within: Vec<f64> = store.since(cutoff, 100).await.iter().map(|r| r.pm25).collect();
        assert_eq!(within, vec![10.0, 20.0]);
    }

    #[tokio::test]
    async fn append_keeps_ordering_for_late_arrivals() {
        let store = HistoryStore::new();
        store.append(reading(1, 10.0)).await;
        store.append(reading(5, 50.0)).await;
        store.append(reading(3, 30.0)).await;

        let pm: Vec<f64> = store.recent(10).await.iter().map(|r| r.pm25).collect();
        assert_eq!(pm, vec![10.0, 30.0, 50.0]);
    }

    #[tokio::test]
    async fn latest_on_empty_store_is_none() {
        let store = HistoryStore::new();
        assert!(store.latest().await.is_none());
        assert!(store.is_empty().await);
    }
}
