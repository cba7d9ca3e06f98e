//! Request/response payloads for the spatial/ML engine.
//!
//! The engine is an opaque HTTP service. These types pin the shapes the
//! gateway constructs and forwards; route and park entries are kept as
//! raw JSON values since the engine's geometry is passed through to the
//! caller verbatim.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Heatmap (kriging grid)
// ---------------------------------------------------------------------------

/// Interpolated pollution surface returned by the engine's kriging
/// endpoint, or the degraded empty grid when interpolation is not
/// possible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatmapGrid {
    /// Row-major grid of interpolated PM2.5 values.
    #[serde(default)]
    pub grid: Vec<Vec<f64>>,
    /// Latitude axis of the grid.
    #[serde(default)]
    pub lat_range: Vec<f64>,
    /// Longitude axis of the grid.
    #[serde(default)]
    pub lon_range: Vec<f64>,
    /// Bounding box of the input samples, when the engine reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<serde_json::Value>,
    /// Reason the grid is empty, present only on the degraded path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl HeatmapGrid {
    /// The degraded empty grid carrying a warning for the caller.
    #[must_use]
    pub fn insufficient(warning: impl Into<String>) -> Self {
        Self {
            warning: Some(warning.into()),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Routing (GeoJSON)
// ---------------------------------------------------------------------------

/// A GeoJSON `FeatureCollection` as forwarded from the routing engine.
///
/// Feature geometry is opaque to this core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    /// Always the literal `"FeatureCollection"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Route features; empty on the degraded path.
    #[serde(default)]
    pub features: Vec<serde_json::Value>,
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self {
            kind: String::from("FeatureCollection"),
            features: Vec::new(),
        }
    }
}

/// Alternative route options returned by the multi-route endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteOptions {
    /// Candidate routes ranked by the engine; empty on the degraded path.
    #[serde(default)]
    pub routes: Vec<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Parks
// ---------------------------------------------------------------------------

/// Ranked clean parks near a point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParkList {
    /// Parks ranked by cleanliness and distance; empty on the degraded path.
    #[serde(default)]
    pub parks: Vec<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

/// One forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Predicted PM2.5 for that date.
    pub predicted_pm25: f64,
}

/// Predicted AQI trend series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    /// Forecast points, oldest first; empty on the degraded path.
    #[serde(default)]
    pub forecast: Vec<ForecastPoint>,
}

// ---------------------------------------------------------------------------
// Zoning
// ---------------------------------------------------------------------------

/// Request body for the two-stage zoning analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoningRequest {
    /// Latitude of the proposed site.
    pub lat: f64,
    /// Longitude of the proposed site.
    pub lon: f64,
    /// Current representative AQI at the site.
    pub current_aqi: f64,
    /// Forecast trend series from the first pipeline stage.
    pub forecast: Vec<ForecastPoint>,
}

/// Governance decision for an industrial zoning request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoningDecision {
    /// The verdict, e.g. `"Recommended"`, `"Rejected"`, `"Unavailable"`.
    pub decision: String,
    /// Human-readable justification.
    pub reason: String,
}

impl ZoningDecision {
    /// The fixed advisory returned when either pipeline stage fails.
    ///
    /// Operators must never see a hard error for a governance decision;
    /// absent automation reads as "needs manual review".
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            decision: String::from("Unavailable"),
            reason: String::from("Analysis engine offline. Manual review required."),
        }
    }
}

// ---------------------------------------------------------------------------
// Single-reading prediction
// ---------------------------------------------------------------------------

/// Predicted AQI for the latest stored reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictedAqi {
    /// The predicted value, non-negative.
    pub predicted_aqi: f64,
}
