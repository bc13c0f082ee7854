use predictive_maintenance::{
    api::{build_router, AppState},
    config::{Config, ObservabilityConfig},
    ml::ModelArtifacts,
    pipeline::PredictionService,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(observability: &ObservabilityConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "predictive_maintenance={},tower_http=info",
            observability.log_level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    // Initialize tracing
    init_tracing(&config.observability);

    if let Some(e) = config_error {
        tracing::warn!("Failed to load configuration: {}", e);
        tracing::warn!("Using default configuration");
    }

    tracing::info!(
        "Starting {} v{}",
        config.observability.service_name,
        env!("CARGO_PKG_VERSION")
    );

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        if let Err(e) = predictive_maintenance::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
            tracing::warn!("Continuing without metrics");
        }
    } else {
        tracing::info!("Prometheus metrics disabled in configuration");
    }

    // Load model artifacts
    let app_state = match ModelArtifacts::load(&config.models) {
        Ok(artifacts) => {
            predictive_maintenance::metrics::MODEL_LOADED.set(1.0);
            AppState::new(Arc::new(PredictionService::new(Arc::new(artifacts))))
        }
        Err(e) if config.models.require_artifacts => {
            tracing::error!(
                model_path = %config.models.model_path.display(),
                encoder_path = %config.models.encoder_path.display(),
                "Failed to load model artifacts: {}",
                e
            );
            return Err(e.into());
        }
        Err(e) => {
            tracing::error!("Failed to load model artifacts: {}", e);
            tracing::warn!("Starting in degraded mode, prediction routes will answer 503");
            predictive_maintenance::metrics::MODEL_LOADED.set(0.0);
            AppState::degraded()
        }
    };

    let app = build_router(app_state, &config);

    // Start HTTP server
    let http_addr = config.bind_address();
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("HTTP server listening on http://{}", http_addr);
    tracing::info!("   Form: http://{}/", http_addr);
    tracing::info!("   Bulk upload: http://{}/bulk", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);

    axum::serve(http_listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
