//! Common test utilities: a deterministic classifier, the label encoder the
//! model ships with, and helpers for building uploads.
#![allow(dead_code)]

use ndarray::Array2;
use predictive_maintenance::{
    api::{build_router, AppState},
    config::Config,
    error::Result,
    ml::{Classifier, LabelEncoder, ModelArtifacts, ModelMetadata, ModelType, FEATURE_COUNT},
    pipeline::PredictionService,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Classes in the order the encoder was fitted (sorted)
pub const CLASSES: [&str; 6] = [
    "Heat Dissipation Failure",
    "No Failure",
    "Overstrain Failure",
    "Power Failure",
    "Random Failures",
    "Tool Wear Failure",
];

pub const HEADER: &str = "Type,Air temperature [K],Process temperature [K],Rotational speed [rpm],Torque [Nm],Tool wear [min]";

/// Rules over the clipped features:
/// - torque above 60 Nm: overstrain
/// - tool wear above 200 min: tool wear
/// - process minus air temperature below 8.6 K: heat dissipation
/// - anything else: no failure
pub struct RuleClassifier {
    metadata: ModelMetadata,
    calls: AtomicUsize,
    rows_seen: AtomicUsize,
}

impl RuleClassifier {
    pub fn new() -> Self {
        Self {
            metadata: ModelMetadata::new("rule classifier", ModelType::External, FEATURE_COUNT),
            calls: AtomicUsize::new(0),
            rows_seen: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn rows_seen(&self) -> usize {
        self.rows_seen.load(Ordering::SeqCst)
    }
}

fn class_id(label: &str) -> usize {
    CLASSES.iter().position(|c| *c == label).unwrap_or(1)
}

impl Classifier for RuleClassifier {
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.rows_seen.fetch_add(features.nrows(), Ordering::SeqCst);

        Ok(features
            .rows()
            .into_iter()
            .map(|row| {
                let label = if row[4] > 60.0 {
                    "Overstrain Failure"
                } else if row[5] > 200.0 {
                    "Tool Wear Failure"
                } else if row[2] - row[1] < 8.6 {
                    "Heat Dissipation Failure"
                } else {
                    "No Failure"
                };
                class_id(label)
            })
            .collect())
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

pub fn encoder() -> LabelEncoder {
    LabelEncoder::new(CLASSES.iter().map(|c| c.to_string()).collect())
}

pub fn service_with(classifier: Arc<RuleClassifier>) -> PredictionService {
    PredictionService::new(Arc::new(ModelArtifacts::new(classifier, encoder())))
}

pub fn service() -> PredictionService {
    service_with(Arc::new(RuleClassifier::new()))
}

/// Router over a rule-classifier service with default configuration
pub fn app() -> axum::Router {
    app_with(Arc::new(RuleClassifier::new()))
}

pub fn app_with(classifier: Arc<RuleClassifier>) -> axum::Router {
    let state = AppState::new(Arc::new(service_with(classifier)));
    build_router(state, &Config::default())
}

/// Router for a server that failed to load its artifacts
pub fn degraded_app() -> axum::Router {
    build_router(AppState::degraded(), &Config::default())
}

/// CSV with the required header followed by `rows`
pub fn csv_table(rows: &[&str]) -> Vec<u8> {
    let mut text = HEADER.to_string();
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    text.into_bytes()
}

pub const BOUNDARY: &str = "----pm-test-boundary";

/// Multipart body with a single file part
pub fn multipart_body(field: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: text/csv\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

/// Parse Prometheus exposition format into metric name -> lines
pub fn parse_prometheus_output(output: &str) -> HashMap<String, Vec<String>> {
    let mut metrics = HashMap::new();
    let mut current_metric = String::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with("# HELP") || line.starts_with("# TYPE") {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() >= 3 {
                current_metric = parts[2].to_string();
                metrics
                    .entry(current_metric.clone())
                    .or_insert_with(Vec::new)
                    .push(line.to_string());
            }
        } else if !line.starts_with('#') && !current_metric.is_empty() {
            metrics
                .entry(current_metric.clone())
                .or_insert_with(Vec::new)
                .push(line.to_string());
        }
    }

    metrics
}

/// `application/x-www-form-urlencoded` body for the given pairs
pub fn form_encode(pairs: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(pairs).expect("form pairs always encode")
}
