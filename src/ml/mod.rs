/// Machine learning layer for failure-type prediction
///
/// This module provides:
/// - Feature normalization and the fixed feature layout
/// - The `Classifier` trait with smartcore-backed implementations
/// - Label encoding between class ids and failure names
/// - Loading of the pre-trained artifacts from disk
///
/// Training happens elsewhere; the service only scores.

pub mod artifacts;
pub mod classifier;
pub mod encoder;
pub mod features;
pub mod models;

pub use artifacts::{load_encoder, load_model, ArtifactLoadError, ModelArtifacts};
pub use classifier::{Classifier, DecisionTreeModel, RandomForestModel, SerializedModel};
pub use encoder::LabelEncoder;
pub use features::{feature_matrix, parse_numeric, ClipRange, FeatureNormalizer, FeatureRanges, FEATURE_COUNT};
pub use models::{ModelMetadata, ModelType};
