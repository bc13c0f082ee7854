use crate::error::{AppError, Result};
use crate::models::{FeatureRecord, MachineType, RawFeatureInput};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Number of columns in the classifier's feature matrix
pub const FEATURE_COUNT: usize = 6;

/// Closed interval a sensor reading is clamped into
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipRange {
    pub min: f64,
    pub max: f64,
}

impl ClipRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clip(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

pub const AIR_TEMPERATURE_RANGE: ClipRange = ClipRange::new(280.0, 320.0);
pub const PROCESS_TEMPERATURE_RANGE: ClipRange = ClipRange::new(280.0, 330.0);
pub const ROTATIONAL_SPEED_RANGE: ClipRange = ClipRange::new(0.0, 5000.0);
pub const TORQUE_RANGE: ClipRange = ClipRange::new(0.0, 150.0);
pub const TOOL_WEAR_RANGE: ClipRange = ClipRange::new(0.0, 350.0);

/// Physical limits for every numeric feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRanges {
    pub air_temperature: ClipRange,
    pub process_temperature: ClipRange,
    pub rotational_speed: ClipRange,
    pub torque: ClipRange,
    pub tool_wear: ClipRange,
}

impl Default for FeatureRanges {
    fn default() -> Self {
        Self {
            air_temperature: AIR_TEMPERATURE_RANGE,
            process_temperature: PROCESS_TEMPERATURE_RANGE,
            rotational_speed: ROTATIONAL_SPEED_RANGE,
            torque: TORQUE_RANGE,
            tool_wear: TOOL_WEAR_RANGE,
        }
    }
}

/// Turns raw readings into clipped feature records
#[derive(Debug, Clone, Default)]
pub struct FeatureNormalizer {
    ranges: FeatureRanges,
}

impl FeatureNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ranges(&self) -> &FeatureRanges {
        &self.ranges
    }

    /// Parse a form submission.
    ///
    /// Returns `Ok(None)` when any numeric field is blank and a validation
    /// error when a field is present but not a finite number. The returned
    /// record is not yet clipped.
    pub fn parse_form(&self, input: &RawFeatureInput) -> Result<Option<FeatureRecord>> {
        if input.has_blank_field() {
            return Ok(None);
        }

        let [air, process, speed, torque, wear] = input.numeric_fields().map(|(field, value)| {
            parse_numeric(value).ok_or_else(|| {
                AppError::Validation(format!(
                    "field '{}' must be a number, got '{}'",
                    field, value
                ))
            })
        });

        Ok(Some(FeatureRecord {
            machine_type: MachineType::from_code(&input.machine_type),
            air_temperature: air?,
            process_temperature: process?,
            rotational_speed: speed?,
            torque: torque?,
            tool_wear: wear?,
        }))
    }

    /// Clamp every numeric field into its range
    pub fn normalize(&self, record: FeatureRecord) -> FeatureRecord {
        FeatureRecord {
            machine_type: record.machine_type,
            air_temperature: self.ranges.air_temperature.clip(record.air_temperature),
            process_temperature: self
                .ranges
                .process_temperature
                .clip(record.process_temperature),
            rotational_speed: self.ranges.rotational_speed.clip(record.rotational_speed),
            torque: self.ranges.torque.clip(record.torque),
            tool_wear: self.ranges.tool_wear.clip(record.tool_wear),
        }
    }

    /// Clamp a whole table in place
    pub fn normalize_all(&self, records: &mut [FeatureRecord]) {
        for record in records.iter_mut() {
            *record = self.normalize(*record);
        }
    }

    pub fn is_normalized(&self, record: &FeatureRecord) -> bool {
        self.ranges.air_temperature.contains(record.air_temperature)
            && self
                .ranges
                .process_temperature
                .contains(record.process_temperature)
            && self.ranges.rotational_speed.contains(record.rotational_speed)
            && self.ranges.torque.contains(record.torque)
            && self.ranges.tool_wear.contains(record.tool_wear)
    }
}

/// Parse a finite number, tolerating surrounding whitespace
pub fn parse_numeric(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
}

/// Stack records into an `n × FEATURE_COUNT` matrix
pub fn feature_matrix(records: &[FeatureRecord]) -> Result<Array2<f64>> {
    let values: Vec<f64> = records.iter().flat_map(|r| r.to_features()).collect();

    Array2::from_shape_vec((records.len(), FEATURE_COUNT), values)
        .map_err(|e| AppError::Internal(format!("Failed to create feature array: {}", e)))
}
