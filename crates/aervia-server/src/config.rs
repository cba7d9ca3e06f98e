//! Configuration loading and typed config structures for the Aervia service.
//!
//! The canonical configuration lives in `aervia-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
///
/// Mirrors the structure of `aervia-config.yaml`. All fields have
/// defaults matching the known-good Kochi deployment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServiceConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Anchor coordinate the source cascade centers on.
    #[serde(default)]
    pub anchor: AnchorSection,

    /// Upstream data-source settings.
    #[serde(default)]
    pub sources: SourcesSection,

    /// Spatial/ML engine connection settings.
    #[serde(default)]
    pub engine: EngineSection,
}

impl ServiceConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `AERVIA_PORT` overrides `server.port`
    /// - `AERVIA_ENGINE_URL` overrides `engine.base_url`
    /// - `AERVIA_CITY_TOKEN` overrides `sources.city_token`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("AERVIA_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("AERVIA_ENGINE_URL") {
            self.engine.base_url = val;
        }
        if let Ok(val) = std::env::var("AERVIA_CITY_TOKEN") {
            self.sources.city_token = val;
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Address to bind the API listener to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port for the API listener.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Anchor coordinate configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnchorSection {
    /// Anchor latitude in degrees.
    #[serde(default = "default_anchor_lat")]
    pub lat: f64,

    /// Anchor longitude in degrees.
    #[serde(default = "default_anchor_lon")]
    pub lon: f64,
}

impl Default for AnchorSection {
    fn default() -> Self {
        Self {
            lat: default_anchor_lat(),
            lon: default_anchor_lon(),
        }
    }
}

/// Upstream data-source configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourcesSection {
    /// Base URL of the station registry API.
    #[serde(default = "default_registry_url")]
    pub registry_url: String,

    /// Station search radius around the anchor, in meters.
    #[serde(default = "default_radius_meters")]
    pub radius_meters: u32,

    /// Maximum number of stations to request per query.
    #[serde(default = "default_station_limit")]
    pub station_limit: u32,

    /// Base URL of the city AQI feed.
    #[serde(default = "default_city_feed_url")]
    pub city_feed_url: String,

    /// City identifier in the feed's namespace.
    #[serde(default = "default_city")]
    pub city: String,

    /// Access token for the city feed.
    #[serde(default = "default_city_token")]
    pub city_token: String,
}

impl Default for SourcesSection {
    fn default() -> Self {
        Self {
            registry_url: default_registry_url(),
            radius_meters: default_radius_meters(),
            station_limit: default_station_limit(),
            city_feed_url: default_city_feed_url(),
            city: default_city(),
            city_token: default_city_token(),
        }
    }
}

/// Spatial/ML engine connection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineSection {
    /// Base URL of the computation engine.
    #[serde(default = "default_engine_url")]
    pub base_url: String,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            base_url: default_engine_url(),
        }
    }
}

// ---- serde default helpers ----

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    5000
}

const fn default_anchor_lat() -> f64 {
    9.9312
}

const fn default_anchor_lon() -> f64 {
    76.2673
}

fn default_registry_url() -> String {
    String::from("https://api.openaq.org/v2")
}

const fn default_radius_meters() -> u32 {
    25_000
}

const fn default_station_limit() -> u32 {
    20
}

fn default_city_feed_url() -> String {
    String::from("https://api.waqi.info")
}

fn default_city() -> String {
    String::from("kochi")
}

fn default_city_token() -> String {
    String::from("demo")
}

fn default_engine_url() -> String {
    String::from("http://localhost:8000")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]

    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = ServiceConfig::parse("{}").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.anchor.lat, 9.9312);
        assert_eq!(config.sources.city, "kochi");
        assert_eq!(config.engine.base_url, "http://localhost:8000");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let yaml = "
server:
  port: 8080
sources:
  city: delhi
";
        let config = ServiceConfig::parse(yaml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.sources.city, "delhi");
        assert_eq!(config.sources.city_token, "demo");
    }

    #[test]
    fn invalid_yaml_is_rejected() {
        assert!(ServiceConfig::parse("server: [not a map").is_err());
    }
}
