//! Spatial samples and sample sets.
//!
//! A [`SpatialSample`] is one `(lat, lon, pm25)` triple acquired from a
//! live source or projected from a stored reading. A [`SampleSet`] is the
//! canonical collection handed to the spatial engine, serialized as three
//! parallel vectors via [`SensorPayload`].
//!
//! All sample data is ephemeral: it is constructed at the start of a
//! request and discarded with the response.

use serde::{Deserialize, Serialize};

/// Minimum number of spatial samples required for interpolation.
///
/// Ordinary kriging is undefined below three points; a [`SampleSet`]
/// smaller than this is reported as insufficient rather than sent to
/// the engine.
pub const MIN_USABLE_SAMPLES: usize = 3;

/// Errors raised when constructing a sample from out-of-range values.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SampleError {
    /// Latitude outside `[-90, 90]`.
    #[error("latitude out of range: {0}")]
    Latitude(f64),

    /// Longitude outside `[-180, 180]`.
    #[error("longitude out of range: {0}")]
    Longitude(f64),

    /// A negative or non-finite PM2.5 concentration.
    #[error("invalid pm25 value: {0}")]
    Pm25(f64),
}

/// A geographic anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

impl Coordinate {
    /// Create a coordinate, validating both axes.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError::Latitude`] or [`SampleError::Longitude`]
    /// when an axis is non-finite or out of range.
    pub fn new(lat: f64, lon: f64) -> Result<Self, SampleError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(SampleError::Latitude(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(SampleError::Longitude(lon));
        }
        Ok(Self { lat, lon })
    }
}

/// One live pollution reading at a point: `(lat, lon, pm25)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialSample {
    /// Latitude in decimal degrees, `[-90, 90]`.
    pub lat: f64,
    /// Longitude in decimal degrees, `[-180, 180]`.
    pub lon: f64,
    /// PM2.5 concentration, non-negative.
    pub pm25: f64,
}

impl SpatialSample {
    /// Create a sample, validating the coordinate and concentration.
    ///
    /// # Errors
    ///
    /// Returns a [`SampleError`] naming the first invariant violated.
    pub fn new(lat: f64, lon: f64, pm25: f64) -> Result<Self, SampleError> {
        let coord = Coordinate::new(lat, lon)?;
        if !pm25.is_finite() || pm25 < 0.0 {
            return Err(SampleError::Pm25(pm25));
        }
        Ok(Self {
            lat: coord.lat,
            lon: coord.lon,
            pm25,
        })
    }
}

/// The parallel-vector wire shape the spatial engine consumes.
///
/// Invariant: `lats`, `lons`, and `pm25` always have identical length.
/// The only constructor is [`SampleSet::to_payload`], which preserves
/// this by construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorPayload {
    /// Latitudes, one per sample.
    pub lats: Vec<f64>,
    /// Longitudes, one per sample.
    pub lons: Vec<f64>,
    /// PM2.5 values, one per sample.
    pub pm25: Vec<f64>,
}

/// An unordered collection of spatial samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    samples: Vec<SpatialSample>,
}

impl SampleSet {
    /// Create an empty sample set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Number of samples in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the set holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whether the set satisfies the minimum cardinality for
    /// spatial interpolation (`len >= 3`).
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.samples.len() >= MIN_USABLE_SAMPLES
    }

    /// Append one sample.
    pub fn push(&mut self, sample: SpatialSample) {
        self.samples.push(sample);
    }

    /// Append all samples from an iterator, preserving order.
    pub fn extend<I: IntoIterator<Item = SpatialSample>>(&mut self, iter: I) {
        self.samples.extend(iter);
    }

    /// Iterate over the samples.
    pub fn iter(&self) -> std::slice::Iter<'_, SpatialSample> {
        self.samples.iter()
    }

    /// Arithmetic mean of the PM2.5 values, or `None` when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_pm25(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: f64 = self.samples.iter().map(|s| s.pm25).sum();
        Some(sum / self.samples.len() as f64)
    }

    /// Project into the parallel-vector payload the engine consumes.
    ///
    /// The three output vectors are guaranteed equal length.
    #[must_use]
    pub fn to_payload(&self) -> SensorPayload {
        SensorPayload {
            lats: self.samples.iter().map(|s| s.lat).collect(),
            lons: self.samples.iter().map(|s| s.lon).collect(),
            pm25: self.samples.iter().map(|s| s.pm25).collect(),
        }
    }
}

impl From<Vec<SpatialSample>> for SampleSet {
    fn from(samples: Vec<SpatialSample>) -> Self {
        Self { samples }
    }
}

impl IntoIterator for SampleSet {
    type Item = SpatialSample;
    type IntoIter = std::vec::IntoIter<SpatialSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.into_iter()
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a SpatialSample;
    type IntoIter = std::slice::Iter<'a, SpatialSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_rejects_out_of_range_latitude() {
        let result = SpatialSample::new(91.0, 76.2, 40.0);
        assert_eq!(result, Err(SampleError::Latitude(91.0)));
    }

    #[test]
    fn sample_rejects_negative_pm25() {
        let result = SpatialSample::new(9.9, 76.2, -1.0);
        assert_eq!(result, Err(SampleError::Pm25(-1.0)));
    }

    #[test]
    fn sample_rejects_non_finite_values() {
        assert!(SpatialSample::new(f64::NAN, 76.2, 40.0).is_err());
        assert!(SpatialSample::new(9.9, 76.2, f64::INFINITY).is_err());
    }

    #[test]
    fn usability_threshold_is_three() {
        let mut set = SampleSet::new();
        for sample in [
            SpatialSample::new(9.90, 76.26, 42.0),
            SpatialSample::new(9.91, 76.27, 44.0),
        ]
        .into_iter()
        .flatten()
        {
            set.push(sample);
        }
        assert!(!set.is_usable());

        if let Ok(third) = SpatialSample::new(9.92, 76.28, 46.0) {
            set.push(third);
        }
        assert!(set.is_usable());
    }

    #[test]
    fn payload_vectors_share_length() {
        let samples: Vec<SpatialSample> = [
            SpatialSample::new(9.90, 76.26, 42.0),
            SpatialSample::new(9.91, 76.27, 44.0),
            SpatialSample::new(9.92, 76.28, 46.0),
        ]
        .into_iter()
        .flatten()
        .collect();
        let set = SampleSet::from(samples);

        let payload = set.to_payload();
        assert_eq!(payload.lats.len(), 3);
        assert_eq!(payload.lons.len(), 3);
        assert_eq!(payload.pm25.len(), 3);
    }

    #[test]
    fn mean_pm25_empty_is_none() {
        assert_eq!(SampleSet::new().mean_pm25(), None);
    }
}
