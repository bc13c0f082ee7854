use crate::models::machine::FeatureRecord;
use crate::translation;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Column appended to bulk results with the localized diagnosis
pub const RESULT_COLUMN: &str = "النتيجة (التشخيص)";

/// Label the encoder uses for a healthy machine
pub const NO_FAILURE_LABEL: &str = "No Failure";

/// Failure classes the model was trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter, Display)]
pub enum FailureType {
    #[serde(rename = "No Failure")]
    #[strum(serialize = "No Failure")]
    NoFailure,

    #[serde(rename = "Heat Dissipation Failure")]
    #[strum(serialize = "Heat Dissipation Failure")]
    HeatDissipation,

    #[serde(rename = "Power Failure")]
    #[strum(serialize = "Power Failure")]
    Power,

    #[serde(rename = "Overstrain Failure")]
    #[strum(serialize = "Overstrain Failure")]
    Overstrain,

    #[serde(rename = "Tool Wear Failure")]
    #[strum(serialize = "Tool Wear Failure")]
    ToolWear,

    #[serde(rename = "Random Failures")]
    #[strum(serialize = "Random Failures")]
    Random,
}

/// Binary risk derived from the predicted label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
pub enum RiskLevel {
    Low,
    High,
}

impl RiskLevel {
    /// `Low` iff the label is exactly "No Failure"
    pub fn for_label(label: &str) -> Self {
        if label == NO_FAILURE_LABEL {
            RiskLevel::Low
        } else {
            RiskLevel::High
        }
    }

    pub fn is_high(&self) -> bool {
        matches!(self, RiskLevel::High)
    }
}

/// Outcome of scoring one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Label as returned by the encoder
    pub label: String,

    /// Display text for the label
    pub localized_label: String,

    /// Derived risk
    pub risk_level: RiskLevel,

    /// Headline status message
    pub prediction_text: String,

    /// Diagnosis naming the failure type, empty for low risk
    pub fail_type_text: String,

    /// Record after clipping
    pub record: FeatureRecord,
}

impl PredictionResult {
    pub fn from_label(label: String, record: FeatureRecord) -> Self {
        let localized_label = translation::translate(&label).to_string();
        let risk_level = RiskLevel::for_label(&label);

        let (prediction_text, fail_type_text) = match risk_level {
            RiskLevel::Low => (translation::STATUS_STABLE.to_string(), String::new()),
            RiskLevel::High => (
                translation::STATUS_FAULT_DETECTED.to_string(),
                translation::diagnosis(&localized_label),
            ),
        };

        Self {
            label,
            localized_label,
            risk_level,
            prediction_text,
            fail_type_text,
            record,
        }
    }
}

/// Classifier input and diagnosis for one uploaded row
#[derive(Debug, Clone, PartialEq)]
pub struct BulkRow {
    /// Record after clipping
    pub record: FeatureRecord,

    /// Localized label
    pub diagnosis: String,
}

/// Cell text of a scored table, shared by the rendered page and the CSV export.
///
/// Columns keep the uploaded order. Serialized as records-oriented JSON, one
/// object per row with keys in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl BulkTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse the records-oriented JSON produced by [`BulkTable::to_json`].
    ///
    /// Every record must carry the same keys as the first one.
    pub fn from_json(payload: &str) -> serde_json::Result<Self> {
        let records: Vec<serde_json::Map<String, serde_json::Value>> =
            serde_json::from_str(payload)?;

        let columns: Vec<String> = records
            .first()
            .map(|record| record.keys().cloned().collect())
            .unwrap_or_default();

        let rows = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                if record.len() != columns.len() {
                    return Err(de_error(format!(
                        "record {} has {} fields, expected {}",
                        index,
                        record.len(),
                        columns.len()
                    )));
                }
                columns
                    .iter()
                    .map(|column| match record.get(column) {
                        Some(value) => cell_text(value),
                        None => Err(de_error(format!(
                            "record {} is missing '{}'",
                            index, column
                        ))),
                    })
                    .collect()
            })
            .collect::<serde_json::Result<Vec<Vec<String>>>>()?;

        Ok(Self { columns, rows })
    }
}

fn de_error(message: String) -> serde_json::Error {
    <serde_json::Error as serde::de::Error>::custom(message)
}

fn cell_text(value: &serde_json::Value) -> serde_json::Result<String> {
    match value {
        serde_json::Value::String(text) => Ok(text.clone()),
        serde_json::Value::Null => Ok(String::new()),
        serde_json::Value::Number(number) => Ok(number.to_string()),
        serde_json::Value::Bool(flag) => Ok(flag.to_string()),
        other => Err(de_error(format!("unexpected nested value {}", other))),
    }
}

struct Record<'a> {
    columns: &'a [String],
    cells: &'a [String],
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, cell) in self.columns.iter().zip(self.cells) {
            map.serialize_entry(column, cell)?;
        }
        map.end()
    }
}

impl Serialize for BulkTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows.iter().map(|cells| Record {
            columns: &self.columns,
            cells,
        }))
    }
}

/// Scored upload in upload order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkResult {
    /// Uploaded table with clipped feature cells and the diagnosis column
    pub table: BulkTable,

    /// One entry per table row
    pub rows: Vec<BulkRow>,
}

impl BulkResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Records-oriented JSON used to carry the table to the export step
    pub fn to_json(&self) -> serde_json::Result<String> {
        self.table.to_json()
    }

    /// Number of rows whose diagnosis is not the healthy label
    pub fn high_risk_count(&self) -> usize {
        let healthy = translation::translate(NO_FAILURE_LABEL);
        self.rows.iter().filter(|row| row.diagnosis != healthy).count()
    }
}

/// Whole numbers keep one decimal place ("300.0"), others use the shortest exact form
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
