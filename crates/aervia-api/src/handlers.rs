//! REST endpoint handlers for the sensor API.
//!
//! All engine-dependent handlers follow the same shape: assemble the
//! merged sensor payload, call the gateway, and serialize whichever
//! branch comes back -- engine output or degraded default -- as 200.
//! The only 4xx responses in this module come from caller-input
//! validation.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/sensor/heat` | Kriging heatmap grid |
//! | `POST` | `/api/sensor/green-route` | Single pollution-aware route |
//! | `POST` | `/api/sensor/green-routes` | Alternative route options |
//! | `POST` | `/api/sensor/park` | Ranked clean parks |
//! | `GET` | `/api/sensor/forecast` | AQI trend forecast |
//! | `POST` | `/api/sensor/zoning-analysis` | Industrial zoning decision |
//! | `GET` | `/api/sensor/predict` | Predicted AQI for the latest reading |
//! | `GET` | `/api/sensor/latest` | Current representative PM2.5 |
//! | `GET` | `/api/sensor/readings` | Raw recent readings |
//! | `POST` | `/api/sensor/ingest` | Append a field-device reading |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use chrono::Utc;
use serde::Deserialize;

use aervia_types::{Coordinate, HistoricalReading, SpatialSample};

use crate::error::ApiError;
use crate::state::AppState;

/// Historical readings handed to the forecast and zoning pipelines.
const FORECAST_HISTORY_LIMIT: usize = 1000;

/// Default and maximum counts for the raw readings endpoint.
const READINGS_DEFAULT_LIMIT: usize = 50;
const READINGS_MAX_LIMIT: usize = 1000;

// ---------------------------------------------------------------------------
// Request body / query structs
// ---------------------------------------------------------------------------

/// A possibly-incomplete coordinate from a request body.
#[derive(Debug, Default, Deserialize)]
pub struct CoordinateBody {
    /// Latitude, if supplied.
    pub lat: Option<f64>,
    /// Longitude, if supplied.
    pub lon: Option<f64>,
}

impl CoordinateBody {
    /// Validate into a [`Coordinate`], naming the field in the error.
    fn validate(&self, field: &str) -> Result<Coordinate, ApiError> {
        let lat = self
            .lat
            .ok_or_else(|| ApiError::InvalidInput(format!("'{field}.lat' is required")))?;
        let lon = self
            .lon
            .ok_or_else(|| ApiError::InvalidInput(format!("'{field}.lon' is required")))?;
        Coordinate::new(lat, lon)
            .map_err(|e| ApiError::InvalidInput(format!("invalid '{field}': {e}")))
    }
}

/// Body for both routing endpoints: `{from: {lat, lon}, to: {lat, lon}}`.
#[derive(Debug, Deserialize)]
pub struct RouteBody {
    /// Start of the route.
    pub from: Option<CoordinateBody>,
    /// End of the route.
    pub to: Option<CoordinateBody>,
}

impl RouteBody {
    /// Validate both endpoints of the requested route.
    fn validate(&self) -> Result<(Coordinate, Coordinate), ApiError> {
        let from = self
            .from
            .as_ref()
            .ok_or_else(|| ApiError::InvalidInput(String::from("'from' is required")))?
            .validate("from")?;
        let to = self
            .to
            .as_ref()
            .ok_or_else(|| ApiError::InvalidInput(String::from("'to' is required")))?
            .validate("to")?;
        Ok((from, to))
    }
}

/// Body for point-anchored endpoints: `{lat, lon}`.
#[derive(Debug, Deserialize)]
pub struct PointBody {
    /// Latitude of the point.
    pub lat: Option<f64>,
    /// Longitude of the point.
    pub lon: Option<f64>,
}

impl PointBody {
    fn validate(&self) -> Result<Coordinate, ApiError> {
        let body = CoordinateBody {
            lat: self.lat,
            lon: self.lon,
        };
        body.validate("body")
    }
}

/// Query parameters for `GET /api/sensor/readings`.
#[derive(Debug, Deserialize)]
pub struct ReadingsQuery {
    /// Maximum number of readings to return (default 50, capped at 1000).
    pub limit: Option<usize>,
}

/// Body for `POST /api/sensor/ingest`.
///
/// Mirrors [`HistoricalReading`] with an optional timestamp defaulted
/// to the ingest time, matching how field devices report.
#[derive(Debug, Deserialize)]
pub struct IngestBody {
    /// Latitude, if the device had a position fix.
    pub lat: Option<f64>,
    /// Longitude, if the device had a position fix.
    pub lon: Option<f64>,
    /// PM2.5 concentration.
    pub pm25: f64,
    /// PM10 concentration.
    pub pm10: Option<f64>,
    /// NO2 concentration.
    pub no2: Option<f64>,
    /// SO2 concentration.
    pub so2: Option<f64>,
    /// CO concentration.
    pub co: Option<f64>,
    /// O3 concentration.
    pub o3: Option<f64>,
    /// CO2 concentration.
    pub co2: Option<f64>,
    /// Oxygen percentage.
    pub oxygen: Option<f64>,
    /// Reading time; defaults to now.
    pub timestamp: Option<chrono::DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page listing the sensor API routes.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let stored = state.store.len().await;

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Aervia Sensor API</title>
</head>
<body>
    <h1>Aervia Sensor API</h1>
    <p>Status: RUNNING -- {stored} stored readings</p>
    <ul>
        <li>GET /api/sensor/heat -- kriging heatmap grid</li>
        <li>POST /api/sensor/green-route -- pollution-aware route</li>
        <li>POST /api/sensor/green-routes -- alternative routes</li>
        <li>POST /api/sensor/park -- ranked clean parks</li>
        <li>GET /api/sensor/forecast -- AQI trend forecast</li>
        <li>POST /api/sensor/zoning-analysis -- zoning decision</li>
        <li>GET /api/sensor/predict -- predicted AQI</li>
        <li>GET /api/sensor/latest -- current representative PM2.5</li>
        <li>GET /api/sensor/readings -- raw recent readings</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// Engine-dependent routes (always 200)
// ---------------------------------------------------------------------------

/// `GET /api/sensor/heat` -- interpolated pollution surface.
///
/// Returns the engine's grid, or an empty grid with a warning when the
/// merged sample set is insufficient or the engine is unreachable.
pub async fn heat(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let samples = state.merger.merged_samples().await;
    let grid = state
        .engine
        .heatmap(&samples)
        .await
        .unwrap_or_else(|degraded| degraded.payload);
    Json(grid)
}

/// `POST /api/sensor/green-route` -- single pollution-aware route.
pub async fn green_route(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RouteBody>,
) -> Result<impl IntoResponse, ApiError> {
    let (from, to) = body.validate()?;
    let samples = state.merger.merged_samples().await;
    let collection = state
        .engine
        .green_route(from, to, &samples)
        .await
        .unwrap_or_else(|degraded| degraded.payload);
    Ok(Json(collection))
}

/// `POST /api/sensor/green-routes` -- alternative route options.
pub async fn green_routes(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RouteBody>,
) -> Result<impl IntoResponse, ApiError> {
    let (from, to) = body.validate()?;
    let samples = state.merger.merged_samples().await;
    let options = state
        .engine
        .green_routes(from, to, &samples)
        .await
        .unwrap_or_else(|degraded| degraded.payload);
    Ok(Json(options))
}

/// `POST /api/sensor/park` -- ranked clean parks near a point.
pub async fn park(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PointBody>,
) -> Result<impl IntoResponse, ApiError> {
    let at = body.validate()?;
    let samples = state.merger.merged_samples().await;
    let parks = state
        .engine
        .find_park(at, &samples)
        .await
        .unwrap_or_else(|degraded| degraded.payload);
    Ok(Json(parks))
}

/// `GET /api/sensor/forecast` -- AQI trend forecast.
pub async fn forecast(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let history = state.store.recent(FORECAST_HISTORY_LIMIT).await;
    let series = state
        .engine
        .forecast(&history)
        .await
        .unwrap_or_else(|degraded| degraded.payload);
    Json(series)
}

/// `POST /api/sensor/zoning-analysis` -- industrial zoning decision.
///
/// Two-stage pipeline behind the gateway; any stage failure yields the
/// fixed manual-review advisory, never an error.
pub async fn zoning(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PointBody>,
) -> Result<impl IntoResponse, ApiError> {
    let at = body.validate()?;
    let current = state.merger.latest_pm25().await;
    let history = state.store.recent(FORECAST_HISTORY_LIMIT).await;
    let decision = state
        .engine
        .zoning(at, current.pm25, &history)
        .await
        .unwrap_or_else(|degraded| degraded.payload);
    Ok(Json(decision))
}

/// `GET /api/sensor/predict` -- predicted AQI for the latest reading.
pub async fn predict(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let latest = state.store.latest().await;
    let predicted = state.engine.predict(latest.as_ref()).await;
    Json(predicted)
}

// ---------------------------------------------------------------------------
// Store-backed routes
// ---------------------------------------------------------------------------

/// `GET /api/sensor/latest` -- current representative PM2.5 with its
/// provenance (`realtime`, `database`, or `none`).
pub async fn latest(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let reading = state.merger.latest_pm25().await;
    Json(reading)
}

/// `GET /api/sensor/readings` -- raw recent readings, newest first.
pub async fn readings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReadingsQuery>,
) -> impl IntoResponse {
    let limit = params
        .limit
        .unwrap_or(READINGS_DEFAULT_LIMIT)
        .min(READINGS_MAX_LIMIT);
    let readings = state.store.recent(limit).await;
    Json(readings)
}

/// `POST /api/sensor/ingest` -- append one field-device reading.
///
/// The only write path in the API. Coordinates are optional but must be
/// valid (and paired) when present; PM2.5 must satisfy the sample
/// invariants.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IngestBody>,
) -> Result<impl IntoResponse, ApiError> {
    match (body.lat, body.lon) {
        (Some(lat), Some(lon)) => {
            SpatialSample::new(lat, lon, body.pm25)
                .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
        }
        (None, None) => {
            if !body.pm25.is_finite() || body.pm25 < 0.0 {
                return Err(ApiError::InvalidInput(format!(
                    "invalid pm25 value: {}",
                    body.pm25
                )));
            }
        }
        _ => {
            return Err(ApiError::InvalidInput(String::from(
                "'lat' and 'lon' must be supplied together",
            )));
        }
    }

    let reading = HistoricalReading {
        lat: body.lat,
        lon: body.lon,
        pm25: body.pm25,
        pm10: body.pm10,
        no2: body.no2,
        so2: body.so2,
        co: body.co,
        o3: body.o3,
        co2: body.co2,
        oxygen: body.oxygen,
        timestamp: body.timestamp.unwrap_or_else(Utc::now),
    };
    state.store.append(reading).await;

    let stored = state.store.len().await;
    Ok(Json(serde_json::json!({
        "status": "ok",
        "stored": stored,
    })))
}
