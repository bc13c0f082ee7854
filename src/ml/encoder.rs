use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Maps classifier class ids to label names. Class id is the index into `classes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Class id for a label name
    pub fn transform(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|class| class == label)
    }

    /// Label names for class ids, failing on any id the encoder does not know
    pub fn inverse_transform(&self, ids: &[usize]) -> Result<Vec<String>> {
        ids.iter()
            .map(|&id| {
                self.classes.get(id).cloned().ok_or_else(|| {
                    AppError::Inference(format!(
                        "Class id {} is outside the encoder's {} classes",
                        id,
                        self.classes.len()
                    ))
                })
            })
            .collect()
    }
}
