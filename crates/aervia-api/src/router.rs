//! Axum router construction for the sensor API.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the sensor API server.
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // Sensor-data namespace
        .route("/api/sensor/heat", get(handlers::heat))
        .route("/api/sensor/green-route", post(handlers::green_route))
        .route("/api/sensor/green-routes", post(handlers::green_routes))
        .route("/api/sensor/park", post(handlers::park))
        .route("/api/sensor/forecast", get(handlers::forecast))
        .route("/api/sensor/zoning-analysis", post(handlers::zoning))
        .route("/api/sensor/predict", get(handlers::predict))
        .route("/api/sensor/latest", get(handlers::latest))
        .route("/api/sensor/readings", get(handlers::readings))
        .route("/api/sensor/ingest", post(handlers::ingest))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
