use crate::api::{handlers, AppState};
use crate::config::Config;
use crate::metrics::track_metrics;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main router
pub fn build_router(state: AppState, config: &Config) -> Router {
    let mut router = Router::new()
        // Pages
        .route("/", get(handlers::index))
        .route("/bulk", get(handlers::bulk_page))
        .route("/predict", post(handlers::predict))
        .route("/predict_file", post(handlers::predict_file))
        .route("/download_results", post(handlers::download_results))
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::health_check))
        .route("/health/ready", get(handlers::readiness_check))
        // JSON API
        .route("/v1/predict", post(handlers::predict_json));

    if config.observability.prometheus_enabled {
        router = router.route("/metrics", get(handlers::metrics));
    }

    router
        // Add state
        .with_state(state)
        // Add middleware
        .layer(middleware::from_fn(track_metrics))
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
