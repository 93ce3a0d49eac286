//! Urban API Service Library
//!
//! HTTP server that turns a bounding box into a land-cover image plus
//! population and built-up statistics drawn from Earth Engine.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod pipeline;
pub mod response;
pub mod state;

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use state::AppState;

/// Build the HTTP router.
pub fn build_router(state: Arc<AppState>, prometheus_handle: PrometheusHandle) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        // Browser client
        .route("/", get(handlers::pages::index_handler))
        .route("/message", get(handlers::pages::message_handler))
        .nest_service("/static", static_files)
        // Processing
        .route("/process", post(handlers::process::process_handler))
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(Extension(prometheus_handle))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
