//! Station-registry source adapter.
//!
//! Queries a registry of real monitoring stations by radius around the
//! anchor coordinate (`GET {base}/locations?coordinates=lat,lon&radius=R&limit=N`)
//! and extracts one `(lat, lon, pm25)` sample per station that reports
//! both a coordinate and a usable PM2.5 value.
//!
//! This adapter never raises past its boundary: any transport or parse
//! failure yields an empty result and a warn log line.

use std::time::Duration;

use tracing::{debug, warn};

use aervia_types::{Coordinate, SpatialSample};

use crate::error::SourceError;

/// Well-known numeric identifier for the PM2.5 parameter in the
/// registry's parameter catalogue.
const PM25_PARAMETER_ID: u64 = 2;

/// Timeout for one registry query.
const FETCH_TIMEOUT: Duration = Duration::from_secs(8);

/// Configuration for the station-registry adapter.
#[derive(Debug, Clone)]
pub struct StationRegistryConfig {
    /// Base URL of the registry API.
    pub base_url: String,
    /// Search radius around the anchor, in meters.
    pub radius_meters: u32,
    /// Maximum number of stations to request.
    pub limit: u32,
}

impl Default for StationRegistryConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://api.openaq.org/v2"),
            radius_meters: 25_000,
            limit: 20,
        }
    }
}

/// Adapter for a network of real monitoring stations.
#[derive(Debug, Clone)]
pub struct StationRegistryAdapter {
    client: reqwest::Client,
    config: StationRegistryConfig,
}

impl StationRegistryAdapter {
    /// Create an adapter with the given configuration.
    #[must_use]
    pub fn new(config: StationRegistryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Fetch samples for all stations near the anchor.
    ///
    /// Returns an empty vec on any failure; the error is logged here
    /// and never propagated.
    pub async fn fetch(&self, anchor: Coordinate) -> Vec<SpatialSample> {
        match self.try_fetch(anchor).await {
            Ok(samples) => {
                debug!(count = samples.len(), "station registry samples acquired");
                samples
            }
            Err(e) => {
                warn!(error = %e, "station registry unavailable, continuing without it");
                Vec::new()
            }
        }
    }

    async fn try_fetch(&self, anchor: Coordinate) -> Result<Vec<SpatialSample>, SourceError> {
        let url = format!("{}/locations", self.config.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("coordinates", format!("{},{}", anchor.lat, anchor.lon)),
                ("radius", self.config.radius_meters.to_string()),
                ("limit", self.config.limit.to_string()),
            ])
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
        Ok(extract_station_samples(&json))
    }
}

/// Extract one sample per usable station from a registry response.
///
/// A station is usable when it carries a coordinate and a PM2.5
/// parameter; anything else is skipped silently. Value fields are
/// tried in priority order: last-observed, generic, rolling average.
fn extract_station_samples(json: &serde_json::Value) -> Vec<SpatialSample> {
    let Some(stations) = json.get("results").and_then(serde_json::Value::as_array) else {
        return Vec::new();
    };

    stations
        .iter()
        .filter_map(|station| {
            let coords = station.get("coordinates")?;
            let lat = coords.get("latitude").and_then(serde_json::Value::as_f64)?;
            let lon = coords.get("longitude").and_then(serde_json::Value::as_f64)?;
            let pm25 = station
                .get("parameters")
                .and_then(serde_json::Value::as_array)?
                .iter()
                .find(|p| is_pm25_parameter(p))
                .and_then(parameter_value)?;
            SpatialSample::new(lat, lon, pm25).ok()
        })
        .collect()
}

/// Whether a station parameter entry describes PM2.5.
///
/// Matches either on a name that normalizes to `pm25` or on the
/// registry's numeric parameter identifier.
fn is_pm25_parameter(parameter: &serde_json::Value) -> bool {
    let by_name = parameter
        .get("parameter")
        .and_then(serde_json::Value::as_str)
        .is_some_and(|name| name.eq_ignore_ascii_case("pm25"));
    let by_id = parameter
        .get("id")
        .and_then(serde_json::Value::as_u64)
        .is_some_and(|id| id == PM25_PARAMETER_ID);
    by_name || by_id
}

/// First present value field on a parameter entry, in priority order.
fn parameter_value(parameter: &serde_json::Value) -> Option<f64> {
    ["lastValue", "value", "average"]
        .iter()
        .find_map(|field| parameter.get(field).and_then(serde_json::Value::as_f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(lat: f64, lon: f64, parameters: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "name": "test-station",
            "coordinates": {"latitude": lat, "longitude": lon},
            "parameters": parameters,
        })
    }

    #[test]
    fn extracts_pm25_by_name_case_insensitive() {
        let json = serde_json::json!({
            "results": [station(9.93, 76.26, serde_json::json!([
                {"parameter": "PM25", "lastValue": 41.5}
            ]))]
        });
        let samples = extract_station_samples(&json);
        assert_eq!(samples.len(), 1);
        assert!(samples.first().is_some_and(|s| (s.pm25 - 41.5).abs() < 1e-9));
    }

    #[test]
    fn extracts_pm25_by_numeric_id() {
        let json = serde_json::json!({
            "results": [station(9.93, 76.26, serde_json::json!([
                {"parameter": "fine-particulates", "id": 2, "value": 33.0}
            ]))]
        });
        assert_eq!(extract_station_samples(&json).len(), 1);
    }

    #[test]
    fn value_field_priority_prefers_last_value() {
        let json = serde_json::json!({
            "results": [station(9.93, 76.26, serde_json::json!([
                {"parameter": "pm25", "lastValue": 10.0, "value": 20.0, "average": 30.0}
            ]))]
        });
        let samples = extract_station_samples(&json);
        assert!(samples.first().is_some_and(|s| (s.pm25 - 10.0).abs() < 1e-9));
    }

    #[test]
    fn falls_back_to_average_when_others_missing() {
        let json = serde_json::json!({
            "results": [station(9.93, 76.26, serde_json::json!([
                {"parameter": "pm25", "average": 30.0}
            ]))]
        });
        let samples = extract_station_samples(&json);
        assert!(samples.first().is_some_and(|s| (s.pm25 - 30.0).abs() < 1e-9));
    }

    #[test]
    fn skips_stations_without_coordinates_or_pm25() {
        let json = serde_json::json!({
            "results": [
                {"name": "no-coords", "parameters": [{"parameter": "pm25", "lastValue": 12.0}]},
                station(9.93, 76.26, serde_json::json!([{"parameter": "no2", "lastValue": 18.0}])),
                station(9.94, 76.27, serde_json::json!([{"parameter": "pm25", "lastValue": 22.0}])),
            ]
        });
        let samples = extract_station_samples(&json);
        assert_eq!(samples.len(), 1);
        assert!(samples.first().is_some_and(|s| (s.pm25 - 22.0).abs() < 1e-9));
    }

    #[test]
    fn malformed_body_yields_empty() {
        let json = serde_json::json!({"error": "rate limited"});
        assert!(extract_station_samples(&json).is_empty());
    }
}
