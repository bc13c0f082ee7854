pub mod handlers;
pub mod routes;
pub mod views;

pub use routes::*;

use crate::error::{AppError, Result};
use crate::pipeline::PredictionService;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// `None` when the server runs without model artifacts
    pub service: Option<Arc<PredictionService>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(service: Arc<PredictionService>) -> Self {
        Self {
            service: Some(service),
            started_at: Instant::now(),
        }
    }

    /// State for a server that could not load its model artifacts
    pub fn degraded() -> Self {
        Self {
            service: None,
            started_at: Instant::now(),
        }
    }

    /// Prediction service, or `ModelUnavailable` in degraded mode
    pub fn service(&self) -> Result<Arc<PredictionService>> {
        self.service.clone().ok_or(AppError::ModelUnavailable)
    }

    pub fn is_ready(&self) -> bool {
        self.service.is_some()
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
