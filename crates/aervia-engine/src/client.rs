//! The reqwest-backed engine client.
//!
//! One method per engine endpoint, each with its own timeout and
//! degraded default. Timeouts scale with operation criticality: route
//! computation downloads street graphs and may legitimately take close
//! to a minute, while a forecast regression answering slowly is better
//! treated as absent.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::warn;

use aervia_types::{
    Coordinate, FeatureCollection, ForecastPoint, ForecastSeries, HeatmapGrid, HistoricalReading,
    ParkList, PredictedAqi, RouteOptions, SampleSet, ZoningDecision, ZoningRequest,
};

use crate::degraded::{Degraded, GatewayResult};
use crate::error::EngineError;

/// Timeout for kriging interpolation.
const HEATMAP_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for route computation (street graph download included).
const ROUTE_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for park ranking.
const PARK_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for trend forecasting.
const FORECAST_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for zoning analysis (second pipeline stage).
const ZONING_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for single-reading ML prediction.
const PREDICT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum number of historical readings sent to the forecast endpoint.
const MAX_FORECAST_HISTORY: usize = 1000;

/// Warning attached to the degraded heatmap when the merged set is
/// below the interpolation minimum.
const INSUFFICIENT_DATA_WARNING: &str =
    "Insufficient data for interpolation (minimum 3 sensor points)";

/// Client for the external spatial/ML computation engine.
#[derive(Debug, Clone)]
pub struct EngineClient {
    client: reqwest::Client,
    base_url: String,
}

impl EngineClient {
    /// Create a client for the engine at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Compute the kriging heatmap grid for a merged sample set.
    ///
    /// Short-circuits to the degraded grid, without an engine call,
    /// when the set is below the interpolation minimum.
    pub async fn heatmap(&self, samples: &SampleSet) -> GatewayResult<HeatmapGrid> {
        if !samples.is_usable() {
            return Err(Degraded::new(
                HeatmapGrid::insufficient(INSUFFICIENT_DATA_WARNING),
                INSUFFICIENT_DATA_WARNING,
            ));
        }

        let body = serde_json::to_value(samples.to_payload()).unwrap_or_default();
        match self.post("/kriging", HEATMAP_TIMEOUT, &body).await {
            Ok(grid) => Ok(grid),
            Err(e) => {
                warn!(error = %e, "kriging unavailable, serving empty grid");
                let reason = String::from("Interpolation engine unavailable");
                Err(Degraded::new(HeatmapGrid::insufficient(&reason), reason))
            }
        }
    }

    /// Compute one pollution-aware route as a GeoJSON feature collection.
    pub async fn green_route(
        &self,
        from: Coordinate,
        to: Coordinate,
        samples: &SampleSet,
    ) -> GatewayResult<FeatureCollection> {
        let body = route_body(from, to, samples);
        match self.post("/green-route", ROUTE_TIMEOUT, &body).await {
            Ok(collection) => Ok(collection),
            Err(e) => {
                warn!(error = %e, "green-route unavailable, serving empty collection");
                Err(Degraded::new(FeatureCollection::default(), e.to_string()))
            }
        }
    }

    /// Compute alternative route options between two points.
    pub async fn green_routes(
        &self,
        from: Coordinate,
        to: Coordinate,
        samples: &SampleSet,
    ) -> GatewayResult<RouteOptions> {
        let body = route_body(from, to, samples);
        match self.post("/green-routes", ROUTE_TIMEOUT, &body).await {
            Ok(routes) => Ok(routes),
            Err(e) => {
                warn!(error = %e, "green-routes unavailable, serving empty list");
                Err(Degraded::new(RouteOptions::default(), e.to_string()))
            }
        }
    }

    /// Rank clean parks near a point.
    pub async fn find_park(&self, at: Coordinate, samples: &SampleSet) -> GatewayResult<ParkList> {
        let body = serde_json::json!({
            "lat": at.lat,
            "lon": at.lon,
            "sensor_data": samples.to_payload(),
        });
        match self.post("/find-green-park", PARK_TIMEOUT, &body).await {
            Ok(parks) => Ok(parks),
            Err(e) => {
                warn!(error = %e, "park ranking unavailable, serving empty list");
                Err(Degraded::new(ParkList::default(), e.to_string()))
            }
        }
    }

    /// Forecast the AQI trend from historical readings.
    ///
    /// `history` is accepted newest-first as the store yields it; the
    /// request body is oldest-first, capped at [`MAX_FORECAST_HISTORY`].
    pub async fn forecast(&self, history: &[HistoricalReading]) -> GatewayResult<ForecastSeries> {
        let body = forecast_body(history);
        match self.post("/forecast", FORECAST_TIMEOUT, &body).await {
            Ok(series) => Ok(series),
            Err(e) => {
                warn!(error = %e, "forecast unavailable, serving empty series");
                Err(Degraded::new(ForecastSeries::default(), e.to_string()))
            }
        }
    }

    /// Two-stage zoning analysis: forecast the trend, then ask the
    /// zoning endpoint for a decision.
    ///
    /// If either stage fails the result is the fixed advisory default:
    /// operators must see "needs manual review", never a hard error.
    pub async fn zoning(
        &self,
        at: Coordinate,
        current_aqi: f64,
        history: &[HistoricalReading],
    ) -> GatewayResult<ZoningDecision> {
        let forecast: Vec<ForecastPoint> = match self.forecast(history).await {
            Ok(series) => series.forecast,
            Err(degraded) => {
                warn!(reason = %degraded.reason, "zoning forecast stage failed");
                return Err(Degraded::new(ZoningDecision::unavailable(), degraded.reason));
            }
        };

        let request = ZoningRequest {
            lat: at.lat,
            lon: at.lon,
            current_aqi,
            forecast,
        };
        let body = serde_json::to_value(&request).unwrap_or_default();
        match self.post("/zoning-analysis", ZONING_TIMEOUT, &body).await {
            Ok(decision) => Ok(decision),
            Err(e) => {
                warn!(error = %e, "zoning stage failed, serving advisory default");
                Err(Degraded::new(ZoningDecision::unavailable(), e.to_string()))
            }
        }
    }

    /// Predict the AQI for the latest stored reading.
    ///
    /// Three-tier degradation, always yielding a value:
    /// 1. the engine's ML prediction over the reading's pollutant fields
    /// 2. the reading's own PM2.5, floored at zero and rounded, as a
    ///    proxy AQI (known approximation, not a calibrated breakpoint
    ///    conversion)
    /// 3. zero, when no reading exists at all
    pub async fn predict(&self, latest: Option<&HistoricalReading>) -> PredictedAqi {
        let Some(reading) = latest else {
            return PredictedAqi { predicted_aqi: 0.0 };
        };

        let body = predict_body(reading);
        match self
            .post::<PredictedAqi>("/ml-predict", PREDICT_TIMEOUT, &body)
            .await
        {
            Ok(predicted) => predicted,
            Err(e) => {
                warn!(error = %e, "ml-predict unavailable, using pm25 proxy");
                PredictedAqi {
                    predicted_aqi: proxy_aqi(reading.pm25),
                }
            }
        }
    }

    /// POST a JSON body to an engine endpoint and parse the response.
    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        timeout: Duration,
        body: &serde_json::Value,
    ) -> Result<T, EngineError> {
        let url = format!("{}{path}", self.base_url);

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unable to read error body"));
            return Err(EngineError::Status { status, body });
        }

        let json: serde_json::Value = response.json().await?;
        Ok(serde_json::from_value(json)?)
    }
}

/// Shared request body for both routing endpoints.
fn route_body(from: Coordinate, to: Coordinate, samples: &SampleSet) -> serde_json::Value {
    serde_json::json!({
        "from": {"lat": from.lat, "lon": from.lon},
        "to": {"lat": to.lat, "lon": to.lon},
        "sensor_data": samples.to_payload(),
    })
}

/// Forecast request body: oldest-first `{timestamp, pm25}` pairs,
/// capped at [`MAX_FORECAST_HISTORY`] of the most recent readings.
fn forecast_body(newest_first: &[HistoricalReading]) -> serde_json::Value {
    let history: Vec<serde_json::Value> = newest_first
        .iter()
        .take(MAX_FORECAST_HISTORY)
        .rev()
        .map(|r| {
            serde_json::json!({
                "timestamp": r.timestamp.to_rfc3339(),
                "pm25": r.pm25,
            })
        })
        .collect();
    serde_json::json!({ "history": history })
}

/// ML prediction request body from the latest reading's pollutant fields.
fn predict_body(reading: &HistoricalReading) -> serde_json::Value {
    serde_json::json!({
        "pm25": reading.pm25,
        "pm10": reading.pm10,
        "no2": reading.no2,
        "so2": reading.so2,
        "co": reading.co,
        "o3": reading.o3,
    })
}

/// PM2.5 as a proxy AQI: floored at zero, rounded to the nearest whole
/// number.
fn proxy_aqi(pm25: f64) -> f64 {
    pm25.max(0.0).round()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};

    fn reading(hours_ago: i64, pm25: f64) -> HistoricalReading {
        let base = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).single().unwrap_or_default();
        HistoricalReading::at(9.93, 76.26, pm25, base - ChronoDuration::hours(hours_ago))
    }

    #[test]
    fn proxy_aqi_rounds_and_floors() {
        assert!((proxy_aqi(73.6) - 74.0).abs() < f64::EPSILON);
        assert!((proxy_aqi(73.4) - 73.0).abs() < f64::EPSILON);
        assert!(proxy_aqi(-5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn forecast_body_is_oldest_first() {
        let newest_first = vec![reading(0, 10.0), reading(1, 20.0), reading(2, 30.0)];
        let body = forecast_body(&newest_first);

        let history = body["history"].as_array().cloned().unwrap_or_default();
        let pm: Vec<f64> = history.iter().filter_map(|h| h["pm25"].as_f64()).collect();
        assert_eq!(pm, vec![30.0, 20.0, 10.0]);
    }

    #[test]
    fn forecast_body_caps_history_length() {
        let newest_first: Vec<HistoricalReading> =
            (0..1200).map(|h| reading(h, 5.0)).collect();
        let body = forecast_body(&newest_first);
        let count = body["history"].as_array().map_or(0, Vec::len);
        assert_eq!(count, 1000);
    }

    #[test]
    fn route_body_carries_parallel_sensor_vectors() {
        let samples = SampleSet::from(
            [
                aervia_types::SpatialSample::new(9.90, 76.25, 31.0),
                aervia_types::SpatialSample::new(9.92, 76.26, 32.0),
            ]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>(),
        );
        let from = Coordinate { lat: 9.9, lon: 76.2 };
        let to = Coordinate { lat: 10.0, lon: 76.3 };

        let body = route_body(from, to, &samples);
        assert!((body["from"]["lat"].as_f64().unwrap_or_default() - 9.9).abs() < 1e-9);
        assert_eq!(body["sensor_data"]["lats"].as_array().map_or(0, Vec::len), 2);
        assert_eq!(body["sensor_data"]["pm25"].as_array().map_or(0, Vec::len), 2);
    }

    #[test]
    fn predict_body_includes_secondary_pollutants() {
        let mut r = reading(0, 42.0);
        r.no2 = Some(18.0);
        let body = predict_body(&r);
        assert!((body["pm25"].as_f64().unwrap_or_default() - 42.0).abs() < 1e-9);
        assert!((body["no2"].as_f64().unwrap_or_default() - 18.0).abs() < 1e-9);
        assert!(body["pm10"].is_null());
    }
}
