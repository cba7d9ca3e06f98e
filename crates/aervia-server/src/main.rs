//! Aervia sensor service binary.
//!
//! This is the main entry point that wires together the source cascade,
//! the history store, the engine gateway, and the HTTP API. It loads
//! configuration, initializes all subsystems, and serves until killed.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `aervia-config.yaml`
//! 3. Validate the anchor coordinate
//! 4. Build the source adapters and the realtime aggregator
//! 5. Create the history store and warm it with one aggregation pass
//! 6. Create the engine gateway client
//! 7. Assemble application state and serve the API

mod config;
mod error;

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use aervia_api::{AppState, ServerConfig, start_server};
use aervia_engine::EngineClient;
use aervia_sources::{
    CityIndexAdapter, CityIndexConfig, RealtimeAggregator, SampleSource, SensorDataMerger,
    StationRegistryAdapter, StationRegistryConfig,
};
use aervia_store::HistoryStore;
use aervia_types::{Coordinate, HistoricalReading};

use crate::config::ServiceConfig;
use crate::error::StartupError;

/// Application entry point for the sensor service.
///
/// # Errors
///
/// Returns an error if any initialization step fails or the server
/// stops serving.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("aervia-server starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        port = config.server.port,
        city = config.sources.city,
        engine_url = config.engine.base_url,
        "Configuration loaded"
    );

    // 3. Validate the anchor coordinate.
    let anchor = Coordinate::new(config.anchor.lat, config.anchor.lon)
        .map_err(StartupError::from)?;
    info!(lat = anchor.lat, lon = anchor.lon, "Anchor coordinate validated");

    // 4. Build the source cascade: station registry first, city index
    //    as fallback with its last-resort scatter enabled.
    let registry = StationRegistryAdapter::new(StationRegistryConfig {
        base_url: config.sources.registry_url.clone(),
        radius_meters: config.sources.radius_meters,
        limit: config.sources.station_limit,
    });
    let city = CityIndexAdapter::new(CityIndexConfig {
        base_url: config.sources.city_feed_url.clone(),
        city: config.sources.city.clone(),
        token: config.sources.city_token.clone(),
        last_resort: true,
    });
    let aggregator = RealtimeAggregator::new(vec![
        SampleSource::StationRegistry(registry),
        SampleSource::CityIndex(city),
    ]);
    info!("Source cascade assembled");

    // 5. Create the history store and warm it with one aggregation
    //    pass, so forecast and prediction have data before the first
    //    ingest arrives. A failed warm pass is not fatal.
    let store = HistoryStore::new();
    warm_store(&aggregator, &store, anchor).await;

    // 6. Create the engine gateway client.
    let engine = EngineClient::new(config.engine.base_url.clone());
    info!(base_url = config.engine.base_url, "Engine gateway created");

    // 7. Assemble application state and serve.
    let merger = SensorDataMerger::new(aggregator, store.clone(), anchor);
    let state = Arc::new(AppState::new(merger, engine, store));
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };

    start_server(&server_config, state)
        .await
        .map_err(StartupError::from)?;

    info!("aervia-server shutdown complete");
    Ok(())
}

/// Load the service configuration from `aervia-config.yaml`.
///
/// Looks for the config file relative to the current working directory.
fn load_config() -> Result<ServiceConfig, StartupError> {
    let config_path = Path::new("aervia-config.yaml");
    if config_path.exists() {
        let config = ServiceConfig::from_file(config_path)?;
        Ok(config)
    } else {
        info!("Config file not found, using defaults");
        Ok(ServiceConfig::default())
    }
}

/// Seed the history store with one live aggregation pass.
///
/// Every acquired sample becomes one historical reading stamped now.
/// An empty pass leaves the store empty and logs a warning.
async fn warm_store(aggregator: &RealtimeAggregator, store: &HistoryStore, anchor: Coordinate) {
    let samples = aggregator.acquire(anchor).await;
    if samples.is_empty() {
        warn!("warm sync produced no samples, store starts empty");
        return;
    }

    let now = Utc::now();
    let count = samples.len();
    for sample in samples {
        store
            .append(HistoricalReading::at(
                sample.lat, sample.lon, sample.pm25, now,
            ))
            .await;
    }
    info!(count, "History store warmed from live sources");
}
