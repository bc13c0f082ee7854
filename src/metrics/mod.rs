//! Prometheus metrics for the prediction service.
//!
//! Covers:
//! - HTTP request count and latency (recorded by `middleware::track_metrics`)
//! - Predictions by mode and risk level
//! - Bulk table sizes and classifier latency
//! - Errors by component
//!
//! # Example
//! ```no_run
//! use predictive_maintenance::metrics::{self, PREDICTIONS_TOTAL};
//!
//! metrics::init_metrics().unwrap();
//! PREDICTIONS_TOTAL.with_label_values(&["form", "low"]).inc();
//! ```

pub mod middleware;

pub use middleware::track_metrics;

use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, GaugeVec, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
};

const NAMESPACE: &str = "predictive_maintenance";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    // ============================================================================
    // HTTP Metrics
    // ============================================================================

    /// Total number of HTTP requests received
    ///
    /// Labels: method, path, status_code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace(NAMESPACE),
        &["method", "path", "status_code"]
    ).expect("Failed to create HTTP_REQUESTS_TOTAL metric");

    /// HTTP request duration in seconds
    ///
    /// Labels: method, path
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric");

    /// Number of in-flight HTTP requests
    pub static ref HTTP_REQUESTS_IN_FLIGHT: Gauge = Gauge::with_opts(
        Opts::new("http_requests_in_flight", "Number of in-flight HTTP requests")
            .namespace(NAMESPACE)
    ).expect("Failed to create HTTP_REQUESTS_IN_FLIGHT metric");

    // ============================================================================
    // Prediction Metrics
    // ============================================================================

    /// Total number of predictions produced
    ///
    /// Labels: mode (form/bulk/api), risk (low/high)
    pub static ref PREDICTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("predictions_total", "Total number of predictions produced")
            .namespace(NAMESPACE),
        &["mode", "risk"]
    ).expect("Failed to create PREDICTIONS_TOTAL metric");

    /// Total number of rows scored through uploaded tables
    pub static ref BULK_ROWS_TOTAL: Counter = Counter::with_opts(
        Opts::new("bulk_rows_total", "Total number of rows scored from uploaded tables")
            .namespace(NAMESPACE)
    ).expect("Failed to create BULK_ROWS_TOTAL metric");

    /// Rows per uploaded table
    pub static ref BULK_TABLE_ROWS: Histogram = Histogram::with_opts(
        HistogramOpts::new("bulk_table_rows", "Rows per uploaded table")
            .namespace(NAMESPACE)
            .buckets(vec![1.0, 10.0, 100.0, 1000.0, 10000.0, 100000.0])
    ).expect("Failed to create BULK_TABLE_ROWS metric");

    /// Classifier call duration in seconds
    pub static ref INFERENCE_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new("inference_duration_seconds", "Classifier call duration in seconds")
            .namespace(NAMESPACE)
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0])
    ).expect("Failed to create INFERENCE_DURATION_SECONDS metric");

    /// 1 while model artifacts are loaded, 0 in degraded mode
    pub static ref MODEL_LOADED: Gauge = Gauge::with_opts(
        Opts::new("model_loaded", "Whether model artifacts are loaded")
            .namespace(NAMESPACE)
    ).expect("Failed to create MODEL_LOADED metric");

    // ============================================================================
    // Error Metrics
    // ============================================================================

    /// Total number of errors
    ///
    /// Labels: component, error_type
    pub static ref ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("errors_total", "Total number of errors")
            .namespace(NAMESPACE),
        &["component", "error_type"]
    ).expect("Failed to create ERRORS_TOTAL metric");

    // ============================================================================
    // System Metrics
    // ============================================================================

    /// Application build info
    ///
    /// Labels: version
    pub static ref BUILD_INFO: GaugeVec = GaugeVec::new(
        Opts::new("build_info", "Application build information")
            .namespace(NAMESPACE),
        &["version"]
    ).expect("Failed to create BUILD_INFO metric");
}

fn register<C>(collector: C) -> Result<(), prometheus::Error>
where
    C: prometheus::core::Collector + 'static,
{
    match PROMETHEUS_REGISTRY.register(Box::new(collector)) {
        Ok(()) | Err(prometheus::Error::AlreadyReg) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Register every metric with the Prometheus registry.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    register(HTTP_REQUESTS_TOTAL.clone())?;
    register(HTTP_REQUEST_DURATION_SECONDS.clone())?;
    register(HTTP_REQUESTS_IN_FLIGHT.clone())?;

    register(PREDICTIONS_TOTAL.clone())?;
    register(BULK_ROWS_TOTAL.clone())?;
    register(BULK_TABLE_ROWS.clone())?;
    register(INFERENCE_DURATION_SECONDS.clone())?;
    register(MODEL_LOADED.clone())?;

    register(ERRORS_TOTAL.clone())?;
    register(BUILD_INFO.clone())?;

    BUILD_INFO
        .with_label_values(&[env!("CARGO_PKG_VERSION")])
        .set(1.0);

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Generate Prometheus text format metrics for the /metrics endpoint
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}

/// Count an error against the component that produced it
pub fn record_error(component: &str, error_type: &str) {
    ERRORS_TOTAL
        .with_label_values(&[component, error_type])
        .inc();
}

/// Count one prediction
pub fn record_prediction(mode: &str, high_risk: bool) {
    let risk = if high_risk { "high" } else { "low" };
    PREDICTIONS_TOTAL.with_label_values(&[mode, risk]).inc();
}
