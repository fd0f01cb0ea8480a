//! API Router configuration

use super::campaign_handler::{get_stats, start_autodial, stop_autodial};
use super::history_handler::{get_call_record, list_call_history};
use super::metrics_handler::metrics_handler;
use super::state::AppState;
use super::telephony_handler::{connect, disconnect, get_settings, get_status, health_check};
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the API router
pub fn build_router(state: AppState, prometheus_handle: Option<PrometheusHandle>) -> Router {
    let health_routes = Router::new().route("/health", get(health_check));

    // Device routes
    let telephony_routes = Router::new()
        .route("/api/connect", post(connect))
        .route("/api/disconnect", post(disconnect))
        .route("/api/status", get(get_status))
        .route("/api/settings", get(get_settings));

    // Campaign routes
    let campaign_routes = Router::new()
        .route("/api/start-autodial", post(start_autodial))
        .route("/api/stop-autodial", post(stop_autodial))
        .route("/api/stats", get(get_stats));

    let history_routes = Router::new()
        .route("/api/call-history", get(list_call_history))
        .route("/api/call-history/:id", get(get_call_record));

    let mut router = Router::new()
        .merge(health_routes)
        .merge(telephony_routes)
        .merge(campaign_routes)
        .merge(history_routes)
        .with_state(state);

    // Metrics route (separate state)
    if let Some(handle) = prometheus_handle {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics_handler))
                .with_state(handle),
        );
    }

    router
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
