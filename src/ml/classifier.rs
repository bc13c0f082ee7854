use crate::error::{AppError, Result};
use crate::ml::models::{ModelMetadata, ModelType};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_classifier::RandomForestClassifier;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::DecisionTreeClassifier;
use std::sync::Arc;

/// Trait for pre-trained classifiers.
///
/// Implementations only score; fitting happens outside this service.
pub trait Classifier: Send + Sync {
    /// Predict one class id per feature row
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>>;

    /// Get model metadata
    fn metadata(&self) -> &ModelMetadata;

    /// Get model type
    fn model_type(&self) -> ModelType {
        self.metadata().model_type
    }
}

pub(crate) fn ndarray_to_densematrix(arr: &Array2<f64>) -> DenseMatrix<f64> {
    let shape = arr.shape();
    let data: Vec<f64> = arr.iter().copied().collect();
    DenseMatrix::new(shape[0], shape[1], data, false)
}

fn labels_to_ids(labels: Vec<i32>) -> Result<Vec<usize>> {
    labels
        .into_iter()
        .map(|label| {
            usize::try_from(label)
                .map_err(|_| AppError::Inference(format!("Model produced negative class id {}", label)))
        })
        .collect()
}

fn check_width(features: &Array2<f64>, metadata: &ModelMetadata) -> Result<()> {
    if features.ncols() != metadata.n_features {
        return Err(AppError::Inference(format!(
            "Model expects {} features, got {}",
            metadata.n_features,
            features.ncols()
        )));
    }
    Ok(())
}

/// Decision tree classifier
#[derive(Serialize, Deserialize)]
pub struct DecisionTreeModel {
    /// Model metadata
    metadata: ModelMetadata,

    /// Fitted tree
    model: DecisionTreeClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>,
}

impl DecisionTreeModel {
    /// Wrap an already fitted tree
    pub fn new(
        model: DecisionTreeClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>,
        metadata: ModelMetadata,
    ) -> Self {
        Self { metadata, model }
    }
}

impl Classifier for DecisionTreeModel {
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>> {
        check_width(features, &self.metadata)?;

        let x = ndarray_to_densematrix(features);
        let predictions = self
            .model
            .predict(&x)
            .map_err(|e| AppError::Inference(format!("Prediction failed: {}", e)))?;

        labels_to_ids(predictions)
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

/// Random forest classifier
#[derive(Serialize, Deserialize)]
pub struct RandomForestModel {
    /// Model metadata
    metadata: ModelMetadata,

    /// Fitted forest
    model: RandomForestClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>,
}

impl RandomForestModel {
    /// Wrap an already fitted forest
    pub fn new(
        model: RandomForestClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>,
        metadata: ModelMetadata,
    ) -> Self {
        Self { metadata, model }
    }
}

impl Classifier for RandomForestModel {
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>> {
        check_width(features, &self.metadata)?;

        let x = ndarray_to_densematrix(features);
        let predictions = self
            .model
            .predict(&x)
            .map_err(|e| AppError::Inference(format!("Prediction failed: {}", e)))?;

        labels_to_ids(predictions)
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

/// On-disk representation of the classifier artifact
#[derive(Serialize, Deserialize)]
pub enum SerializedModel {
    DecisionTree(DecisionTreeModel),
    RandomForest(RandomForestModel),
}

impl SerializedModel {
    pub fn into_classifier(self) -> Arc<dyn Classifier> {
        match self {
            SerializedModel::DecisionTree(model) => Arc::new(model),
            SerializedModel::RandomForest(model) => Arc::new(model),
        }
    }
}
