use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Column holding the machine quality variant
pub const COLUMN_TYPE: &str = "Type";
/// Ambient air temperature column
pub const COLUMN_AIR_TEMPERATURE: &str = "Air temperature [K]";
/// Process temperature column
pub const COLUMN_PROCESS_TEMPERATURE: &str = "Process temperature [K]";
/// Spindle speed column
pub const COLUMN_ROTATIONAL_SPEED: &str = "Rotational speed [rpm]";
/// Torque column
pub const COLUMN_TORQUE: &str = "Torque [Nm]";
/// Accumulated tool wear column
pub const COLUMN_TOOL_WEAR: &str = "Tool wear [min]";

/// Columns an uploaded table must carry, in feature order
pub const REQUIRED_COLUMNS: [&str; 6] = [
    COLUMN_TYPE,
    COLUMN_AIR_TEMPERATURE,
    COLUMN_PROCESS_TEMPERATURE,
    COLUMN_ROTATIONAL_SPEED,
    COLUMN_TORQUE,
    COLUMN_TOOL_WEAR,
];

/// Product quality variant of the machine
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    Display,
)]
#[strum(ascii_case_insensitive)]
pub enum MachineType {
    #[default]
    #[serde(rename = "L")]
    #[strum(to_string = "L", serialize = "Low")]
    Low,

    #[serde(rename = "M")]
    #[strum(to_string = "M", serialize = "Medium")]
    Medium,

    #[serde(rename = "H")]
    #[strum(to_string = "H", serialize = "High")]
    High,
}

impl MachineType {
    /// Map the form's numeric code. Unknown codes fall back to `Low`.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "1" => MachineType::Medium,
            "2" => MachineType::High,
            _ => MachineType::Low,
        }
    }

    /// Parse a table cell holding either a symbol (`L`/`M`/`H`) or a numeric code
    pub fn from_cell(cell: &str) -> Self {
        cell.trim()
            .parse()
            .unwrap_or_else(|_| Self::from_code(cell))
    }

    /// Single-letter symbol used in uploaded and exported tables
    pub fn symbol(&self) -> &'static str {
        match self {
            MachineType::Low => "L",
            MachineType::Medium => "M",
            MachineType::High => "H",
        }
    }

    /// Ordinal encoding fed to the classifier
    pub fn ordinal(&self) -> f64 {
        match self {
            MachineType::Low => 0.0,
            MachineType::Medium => 1.0,
            MachineType::High => 2.0,
        }
    }
}

/// One set of sensor readings for a machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    #[serde(rename = "Type")]
    pub machine_type: MachineType,

    #[serde(rename = "Air temperature [K]")]
    pub air_temperature: f64,

    #[serde(rename = "Process temperature [K]")]
    pub process_temperature: f64,

    #[serde(rename = "Rotational speed [rpm]")]
    pub rotational_speed: f64,

    #[serde(rename = "Torque [Nm]")]
    pub torque: f64,

    #[serde(rename = "Tool wear [min]")]
    pub tool_wear: f64,
}

impl FeatureRecord {
    /// Feature vector in classifier column order
    pub fn to_features(&self) -> [f64; 6] {
        [
            self.machine_type.ordinal(),
            self.air_temperature,
            self.process_temperature,
            self.rotational_speed,
            self.torque,
            self.tool_wear,
        ]
    }
}

/// Raw single-record form submission, kept as text so it can be echoed back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFeatureInput {
    #[serde(rename = "type", default = "default_type_code")]
    pub machine_type: String,

    #[serde(default)]
    pub air_temp: String,

    #[serde(default)]
    pub proc_temp: String,

    #[serde(default)]
    pub speed: String,

    #[serde(default)]
    pub torque: String,

    #[serde(default)]
    pub tool_wear: String,
}

impl RawFeatureInput {
    /// Numeric fields paired with their form names
    pub fn numeric_fields(&self) -> [(&'static str, &str); 5] {
        [
            ("air_temp", self.air_temp.as_str()),
            ("proc_temp", self.proc_temp.as_str()),
            ("speed", self.speed.as_str()),
            ("torque", self.torque.as_str()),
            ("tool_wear", self.tool_wear.as_str()),
        ]
    }

    /// True when any numeric field was submitted empty.
    ///
    /// Whitespace-only text is not blank; it fails numeric parsing instead.
    pub fn has_blank_field(&self) -> bool {
        self.numeric_fields()
            .iter()
            .any(|(_, value)| value.is_empty())
    }
}

impl Default for RawFeatureInput {
    fn default() -> Self {
        Self {
            machine_type: default_type_code(),
            air_temp: String::new(),
            proc_temp: String::new(),
            speed: String::new(),
            torque: String::new(),
            tool_wear: String::new(),
        }
    }
}

fn default_type_code() -> String {
    "0".to_string()
}
