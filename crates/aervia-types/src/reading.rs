//! Persisted historical sensor readings.
//!
//! A [`HistoricalReading`] is owned by the time-series store; this core
//! only reads it. The merger projects readings down to spatial samples
//! via [`HistoricalReading::as_sample`], skipping records without
//! coordinates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sample::SpatialSample;

/// One stored sensor reading with optional secondary pollutants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalReading {
    /// Latitude, absent for readings ingested without a position fix.
    pub lat: Option<f64>,
    /// Longitude, absent for readings ingested without a position fix.
    pub lon: Option<f64>,
    /// PM2.5 concentration.
    pub pm25: f64,
    /// PM10 concentration, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm10: Option<f64>,
    /// NO2 concentration, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no2: Option<f64>,
    /// SO2 concentration, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub so2: Option<f64>,
    /// CO concentration, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co: Option<f64>,
    /// O3 concentration, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub o3: Option<f64>,
    /// CO2 concentration, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co2: Option<f64>,
    /// Oxygen percentage, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oxygen: Option<f64>,
    /// When the reading was taken.
    pub timestamp: DateTime<Utc>,
}

impl HistoricalReading {
    /// Minimal reading with only the primary pollutant and a position.
    #[must_use]
    pub const fn at(lat: f64, lon: f64, pm25: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            lat: Some(lat),
            lon: Some(lon),
            pm25,
            pm10: None,
            no2: None,
            so2: None,
            co: None,
            o3: None,
            co2: None,
            oxygen: None,
            timestamp,
        }
    }

    /// Project this reading to a spatial sample.
    ///
    /// Returns `None` when either coordinate is missing or any value
    /// violates the sample invariants.
    #[must_use]
    pub fn as_sample(&self) -> Option<SpatialSample> {
        let lat = self.lat?;
        let lon = self.lon?;
        SpatialSample::new(lat, lon, self.pm25).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn projection_skips_missing_coordinates() {
        let reading = HistoricalReading {
            lat: None,
            lon: Some(76.26),
            pm25: 55.0,
            pm10: None,
            no2: None,
            so2: None,
            co: None,
            o3: None,
            co2: None,
            oxygen: None,
            timestamp: Utc::now(),
        };
        assert!(reading.as_sample().is_none());
    }

    #[test]
    fn projection_keeps_located_readings() {
        let reading = HistoricalReading::at(9.93, 76.26, 55.0, Utc::now());
        let sample = reading.as_sample();
        assert!(sample.is_some_and(|s| (s.pm25 - 55.0).abs() < f64::EPSILON));
    }

    #[test]
    fn optional_pollutants_default_when_absent() {
        let json = r#"{"lat": 9.9, "lon": 76.2, "pm25": 40.0, "timestamp": "2026-01-15T08:00:00Z"}"#;
        let reading: HistoricalReading =
            serde_json::from_str(json).unwrap_or_else(|_| HistoricalReading::at(0.0, 0.0, 0.0, Utc::now()));
        assert_eq!(reading.pm10, None);
        assert_eq!(reading.o3, None);
    }
}
