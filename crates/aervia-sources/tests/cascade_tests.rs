//! Integration tests for the realtime aggregation cascade.
//!
//! A small Axum server on an ephemeral port stands in for both
//! upstream providers, so the cascade runs against real HTTP without
//! touching the network.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;

use aervia_sources::{
    CityIndexAdapter, CityIndexConfig, RealtimeAggregator, SampleSource, StationRegistryAdapter,
    StationRegistryConfig,
};
use aervia_types::Coordinate;

const ANCHOR: Coordinate = Coordinate {
    lat: 9.9312,
    lon: 76.2673,
};

/// What the mock upstream should answer for each provider.
#[derive(Clone)]
struct MockUpstream {
    /// Station list, or `None` to answer 500.
    stations: Option<serde_json::Value>,
    /// City feed body, or `None` to answer 500.
    feed: Option<serde_json::Value>,
}

async fn locations(State(mock): State<MockUpstream>) -> impl IntoResponse {
    match mock.stations {
        Some(body) => (StatusCode::OK, Json(body)),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "registry down"})),
        ),
    }
}

async fn feed(State(mock): State<MockUpstream>) -> impl IntoResponse {
    match mock.feed {
        Some(body) => (StatusCode::OK, Json(body)),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "feed down"})),
        ),
    }
}

/// Start the mock upstream and return its address.
async fn start_mock(mock: MockUpstream) -> SocketAddr {
    let router = Router::new()
        .route("/locations", get(locations))
        .route("/feed/{city}/", get(feed))
        .with_state(mock);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

fn station_entry(lat: f64, lon: f64, pm25: f64) -> serde_json::Value {
    serde_json::json!({
        "coordinates": {"latitude": lat, "longitude": lon},
        "parameters": [{"parameter": "pm25", "lastValue": pm25}],
    })
}

/// Build the production-shaped cascade pointed at the mock upstream.
fn cascade(addr: SocketAddr, last_resort: bool) -> RealtimeAggregator {
    let base = format!("http://{addr}");
    let registry = StationRegistryAdapter::new(StationRegistryConfig {
        base_url: base.clone(),
        ..StationRegistryConfig::default()
    });
    let city = CityIndexAdapter::new(CityIndexConfig {
        base_url: base,
        last_resort,
        ..CityIndexConfig::default()
    });
    RealtimeAggregator::new(vec![
        SampleSource::StationRegistry(registry),
        SampleSource::CityIndex(city),
    ])
}

#[tokio::test]
async fn sufficient_registry_result_is_returned_unmodified() {
    let addr = start_mock(MockUpstream {
        stations: Some(serde_json::json!({"results": [
            station_entry(9.90, 76.25, 31.0),
            station_entry(9.92, 76.26, 32.0),
            station_entry(9.94, 76.27, 33.0),
        ]})),
        feed: None,
    })
    .await;

    let set = cascade(addr, true).acquire(ANCHOR).await;
    assert_eq!(set.len(), 3);

    let mut pm: Vec<f64> = set.iter().map(|s| s.pm25).collect();
    pm.sort_by(f64::total_cmp);
    assert_eq!(pm, vec![31.0, 32.0, 33.0]);
}

#[tokio::test]
async fn sparse_registry_partials_are_discarded_for_the_ring() {
    let addr = start_mock(MockUpstream {
        stations: Some(serde_json::json!({"results": [
            station_entry(9.90, 76.25, 7.0),
            station_entry(9.92, 76.26, 8.0),
        ]})),
        feed: Some(serde_json::json!({
            "status": "ok",
            "data": {"aqi": 80.0, "iaqi": {}},
        })),
    })
    .await;

    let set = cascade(addr, true).acquire(ANCHOR).await;
    // Exactly the synthesized ring: the two real points are dropped.
    assert_eq!(set.len(), 12);
    assert!(set.iter().all(|s| s.pm25 >= 80.0 * 0.85 && s.pm25 <= 80.0 * 1.15));
}

#[tokio::test]
async fn cascade_never_returns_one_or_two_samples() {
    let addr = start_mock(MockUpstream {
        stations: Some(serde_json::json!({"results": [station_entry(9.90, 76.25, 7.0)]})),
        feed: None,
    })
    .await;

    let set = cascade(addr, true).acquire(ANCHOR).await;
    // Registry had one point, the feed is down: the last-resort scatter
    // still yields five samples.
    assert_eq!(set.len(), 5);
    assert!(set.iter().all(|s| s.pm25 >= 40.0 && s.pm25 <= 70.0));
}

#[tokio::test]
async fn fully_failed_cascade_without_last_resort_is_empty() {
    let addr = start_mock(MockUpstream {
        stations: None,
        feed: None,
    })
    .await;

    let set = cascade(addr, false).acquire(ANCHOR).await;
    assert!(set.is_empty());
}
