//! Prediction flows built on top of the loaded model artifacts:
//! single-record scoring, bulk table scoring and CSV export.

mod bulk;
mod error;
mod export;
mod single;

pub use error::BulkError;
pub use export::{export_csv, write_csv, EXPORT_FILENAME};

use crate::ml::{FeatureNormalizer, ModelArtifacts};
use std::sync::Arc;

/// Stateless prediction service. Cheap to clone; the artifacts are shared.
#[derive(Debug, Clone)]
pub struct PredictionService {
    artifacts: Arc<ModelArtifacts>,
    normalizer: FeatureNormalizer,
}

impl PredictionService {
    pub fn new(artifacts: Arc<ModelArtifacts>) -> Self {
        Self {
            artifacts,
            normalizer: FeatureNormalizer::new(),
        }
    }

    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    pub fn normalizer(&self) -> &FeatureNormalizer {
        &self.normalizer
    }
}
