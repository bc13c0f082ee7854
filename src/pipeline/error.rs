use thiserror::Error;

/// Why an uploaded table could not be scored
#[derive(Error, Debug)]
pub enum BulkError {
    /// Required columns absent from the header
    #[error("missing columns: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// Header names that appear more than once
    #[error("duplicate columns: {}", duplicates.join(", "))]
    DuplicateColumns { duplicates: Vec<String> },

    /// A cell in a required numeric column is not a finite number.
    /// `row` counts data rows from 1.
    #[error("row {row}: column '{column}' has invalid value '{value}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    /// The upload is not well-formed CSV
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Header present but no data rows
    #[error("the file has no data rows")]
    Empty,

    /// The classifier or label encoder failed on a well-formed table
    #[error("inference failed: {0}")]
    Inference(String),
}

impl BulkError {
    /// True when the upload itself is at fault
    pub fn is_client_error(&self) -> bool {
        !matches!(self, BulkError::Inference(_))
    }

    /// Short stable name for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            BulkError::MissingColumns { .. } => "missing_columns",
            BulkError::DuplicateColumns { .. } => "duplicate_columns",
            BulkError::InvalidValue { .. } => "invalid_value",
            BulkError::Csv(_) => "malformed_csv",
            BulkError::Empty => "empty",
            BulkError::Inference(_) => "inference",
        }
    }
}
