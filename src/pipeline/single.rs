use super::PredictionService;
use crate::error::{AppError, Result};
use crate::models::{FeatureRecord, PredictionResult, RawFeatureInput};
use tracing::{debug, info};

impl PredictionService {
    /// Score a form submission.
    ///
    /// A blank numeric field yields `Ok(None)` without touching the model.
    /// A non-numeric field is a `Validation` error.
    pub fn predict_form(&self, input: &RawFeatureInput) -> Result<Option<PredictionResult>> {
        match self.normalizer.parse_form(input)? {
            Some(record) => self.predict_record(record).map(Some),
            None => {
                debug!("Form has blank fields, skipping prediction");
                Ok(None)
            }
        }
    }

    /// Clip and score one record
    pub fn predict_record(&self, record: FeatureRecord) -> Result<PredictionResult> {
        let record = self.normalizer.normalize(record);

        let label = self
            .artifacts
            .predict_labels(std::slice::from_ref(&record))?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Inference("Model returned no prediction".to_string()))?;

        let result = PredictionResult::from_label(label, record);

        info!(
            label = %result.label,
            risk = %result.risk_level,
            machine_type = %record.machine_type,
            "Single prediction completed"
        );

        Ok(result)
    }
}
