use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Model metadata stored alongside the serialized classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name
    pub name: String,

    /// Model version
    pub version: String,

    /// Model type
    pub model_type: ModelType,

    /// Training timestamp
    pub trained_at: chrono::DateTime<chrono::Utc>,

    /// Number of features the model expects
    pub n_features: usize,

    /// Hyperparameters
    #[serde(default)]
    pub hyperparameters: HashMap<String, String>,
}

impl ModelMetadata {
    pub fn new(name: impl Into<String>, model_type: ModelType, n_features: usize) -> Self {
        Self {
            name: name.into(),
            version: "1.0".to_string(),
            model_type,
            trained_at: chrono::Utc::now(),
            n_features,
            hyperparameters: HashMap::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

/// Model type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// Single CART decision tree
    DecisionTree,

    /// Random forest
    RandomForest,

    /// Anything supplied through the `Classifier` trait directly
    External,
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelType::DecisionTree => write!(f, "Decision Tree"),
            ModelType::RandomForest => write!(f, "Random Forest"),
            ModelType::External => write!(f, "External"),
        }
    }
}
