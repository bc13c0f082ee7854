use crate::error::{AppError, Result};
use crate::models::{BulkResult, PredictionResult, RawFeatureInput};
use crate::translation;
use askama::Template;
use axum::response::Html;

/// Single-record form page
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub inputs: RawFeatureInput,
    pub prediction_text: String,
    pub fail_type_text: String,
    /// "Low", "High" or empty when nothing was scored
    pub risk_level: String,
}

impl IndexTemplate {
    pub fn empty() -> Self {
        Self::blank(RawFeatureInput::default())
    }

    /// Inputs echoed back with no result
    pub fn blank(inputs: RawFeatureInput) -> Self {
        Self {
            inputs,
            prediction_text: String::new(),
            fail_type_text: String::new(),
            risk_level: String::new(),
        }
    }

    pub fn with_result(inputs: RawFeatureInput, result: &PredictionResult) -> Self {
        Self {
            inputs,
            prediction_text: result.prediction_text.clone(),
            fail_type_text: result.fail_type_text.clone(),
            risk_level: result.risk_level.to_string(),
        }
    }

    pub fn invalid_numbers(inputs: RawFeatureInput) -> Self {
        Self {
            inputs,
            prediction_text: translation::INVALID_NUMBERS.to_string(),
            fail_type_text: String::new(),
            risk_level: "High".to_string(),
        }
    }
}

/// Cell text of one scored row
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub cells: Vec<String>,
}

/// Bulk upload page, optionally with a scored table
#[derive(Template)]
#[template(path = "bulk.html")]
pub struct BulkTemplate {
    pub has_table: bool,
    pub columns: Vec<String>,
    pub rows: Vec<RowView>,
    /// Records-oriented JSON posted back by the download form
    pub raw_data_json: String,
}

impl BulkTemplate {
    pub fn empty() -> Self {
        Self {
            has_table: false,
            columns: Vec::new(),
            rows: Vec::new(),
            raw_data_json: String::new(),
        }
    }

    pub fn with_result(result: &BulkResult) -> Result<Self> {
        let raw_data_json = result
            .to_json()
            .map_err(|e| AppError::Internal(format!("Failed to serialize bulk result: {}", e)))?;

        Ok(Self {
            has_table: true,
            columns: result.table.columns.clone(),
            rows: result
                .table
                .rows
                .iter()
                .map(|cells| RowView {
                    cells: cells.clone(),
                })
                .collect(),
            raw_data_json,
        })
    }
}

/// Render a page into an HTML response
pub fn render<T: Template>(template: &T) -> Result<Html<String>> {
    Ok(Html(template.render()?))
}
