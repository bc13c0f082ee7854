use crate::config::ModelsConfig;
use crate::error::{AppError, Result};
use crate::ml::classifier::{Classifier, SerializedModel};
use crate::ml::encoder::LabelEncoder;
use crate::ml::features::{feature_matrix, FEATURE_COUNT};
use crate::models::FeatureRecord;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Errors raised while loading the classifier or label encoder
#[derive(Debug, thiserror::Error)]
pub enum ArtifactLoadError {
    #[error("artifact not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("failed to read artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("label encoder {} declares no classes", path.display())]
    EmptyEncoder { path: PathBuf },

    #[error("model {} expects {found} features, this service produces {expected}", path.display())]
    FeatureMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },
}

/// Classifier and label encoder, loaded once and shared read-only
#[derive(Clone)]
pub struct ModelArtifacts {
    classifier: Arc<dyn Classifier>,
    encoder: LabelEncoder,
}

impl std::fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("model", &self.classifier.metadata().name)
            .field("model_type", &self.classifier.model_type())
            .field("classes", &self.encoder.classes())
            .finish()
    }
}

impl ModelArtifacts {
    pub fn new(classifier: Arc<dyn Classifier>, encoder: LabelEncoder) -> Self {
        Self {
            classifier,
            encoder,
        }
    }

    /// Load both artifacts from the configured paths
    pub fn load(config: &ModelsConfig) -> std::result::Result<Self, ArtifactLoadError> {
        let classifier = load_model(&config.model_path)?;
        let encoder = load_encoder(&config.encoder_path)?;

        let metadata = classifier.metadata();
        info!(
            model = %metadata.name,
            model_type = %metadata.model_type,
            version = %metadata.version,
            classes = encoder.n_classes(),
            "Model artifacts loaded"
        );

        Ok(Self::new(classifier, encoder))
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn encoder(&self) -> &LabelEncoder {
        &self.encoder
    }

    /// Score normalized records with a single classifier call and decode the labels.
    /// Output order matches input order.
    pub fn predict_labels(&self, records: &[FeatureRecord]) -> Result<Vec<String>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let features = feature_matrix(records)?;

        let start = Instant::now();
        let ids = self.classifier.predict(&features)?;
        crate::metrics::INFERENCE_DURATION_SECONDS.observe(start.elapsed().as_secs_f64());

        if ids.len() != records.len() {
            return Err(AppError::Inference(format!(
                "Model returned {} predictions for {} rows",
                ids.len(),
                records.len()
            )));
        }

        let labels = self.encoder.inverse_transform(&ids)?;
        debug!(rows = records.len(), "Inference completed");

        Ok(labels)
    }
}

fn read_artifact(path: &Path) -> std::result::Result<Vec<u8>, ArtifactLoadError> {
    std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactLoadError::Missing {
                path: path.to_path_buf(),
            }
        } else {
            ArtifactLoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Load a serialized classifier (bincode, or JSON for `.json` files)
pub fn load_model(path: &Path) -> std::result::Result<Arc<dyn Classifier>, ArtifactLoadError> {
    let bytes = read_artifact(path)?;

    let decoded: std::result::Result<SerializedModel, String> = if is_json(path) {
        serde_json::from_slice(&bytes).map_err(|e| e.to_string())
    } else {
        bincode::deserialize(&bytes).map_err(|e| e.to_string())
    };

    let classifier = decoded
        .map_err(|reason| ArtifactLoadError::Corrupt {
            path: path.to_path_buf(),
            reason,
        })?
        .into_classifier();

    let found = classifier.metadata().n_features;
    if found != FEATURE_COUNT {
        return Err(ArtifactLoadError::FeatureMismatch {
            path: path.to_path_buf(),
            expected: FEATURE_COUNT,
            found,
        });
    }

    Ok(classifier)
}

/// Load the label encoder class list
pub fn load_encoder(path: &Path) -> std::result::Result<LabelEncoder, ArtifactLoadError> {
    let bytes = read_artifact(path)?;

    let encoder: LabelEncoder =
        serde_json::from_slice(&bytes).map_err(|e| ArtifactLoadError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    if encoder.n_classes() == 0 {
        return Err(ArtifactLoadError::EmptyEncoder {
            path: path.to_path_buf(),
        });
    }

    Ok(encoder)
}

/// Write a classifier artifact in the format `load_model` expects for `path`
pub fn save_model(model: &SerializedModel, path: &Path) -> Result<()> {
    let bytes = if is_json(path) {
        serde_json::to_vec(model)?
    } else {
        bincode::serialize(model).map_err(|e| AppError::Serialization(e.to_string()))?
    };
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Write a label encoder artifact
pub fn save_encoder(encoder: &LabelEncoder, path: &Path) -> Result<()> {
    std::fs::write(path, serde_json::to_vec_pretty(encoder)?)?;
    Ok(())
}
