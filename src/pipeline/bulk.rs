use super::{BulkError, PredictionService};
use crate::metrics;
use crate::ml::parse_numeric;
use crate::models::{
    format_number, BulkResult, BulkRow, BulkTable, FeatureRecord, MachineType, RiskLevel,
    COLUMN_TYPE, REQUIRED_COLUMNS, RESULT_COLUMN,
};
use crate::translation;
use std::collections::HashSet;
use tracing::{info, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Uploaded table before scoring
struct ParsedTable {
    columns: Vec<String>,
    /// Index of each required column in `columns`
    positions: [usize; 6],
    cells: Vec<Vec<String>>,
    records: Vec<FeatureRecord>,
}

impl PredictionService {
    /// Score an uploaded CSV table.
    ///
    /// Every row is clipped and the whole table goes through the classifier in
    /// a single call. Row order and count are preserved. All uploaded columns
    /// are kept: the numeric feature cells are replaced by their clipped
    /// values and the diagnosis column is appended (or overwritten when the
    /// upload already has one).
    pub fn predict_table(&self, bytes: &[u8]) -> Result<BulkResult, BulkError> {
        let ParsedTable {
            mut columns,
            positions,
            mut cells,
            mut records,
        } = match parse_table(bytes) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Uploaded table rejected");
                metrics::record_error("bulk", e.kind());
                return Err(e);
            }
        };

        self.normalizer.normalize_all(&mut records);

        let labels = self.artifacts.predict_labels(&records).map_err(|e| {
            metrics::record_error("bulk", "inference");
            BulkError::Inference(e.to_string())
        })?;

        let result_index = match columns.iter().position(|column| column == RESULT_COLUMN) {
            Some(index) => index,
            None => {
                columns.push(RESULT_COLUMN.to_string());
                columns.len() - 1
            }
        };

        let mut rows = Vec::with_capacity(records.len());
        for ((row_cells, record), label) in cells.iter_mut().zip(&records).zip(&labels) {
            let features = record.to_features();
            for slot in 1..REQUIRED_COLUMNS.len() {
                row_cells[positions[slot]] = format_number(features[slot]);
            }

            let diagnosis = translation::translate(label).to_string();
            if result_index < row_cells.len() {
                row_cells[result_index] = diagnosis.clone();
            } else {
                row_cells.push(diagnosis.clone());
            }

            metrics::record_prediction("bulk", RiskLevel::for_label(label).is_high());
            rows.push(BulkRow {
                record: *record,
                diagnosis,
            });
        }

        let result = BulkResult {
            table: BulkTable { columns, rows: cells },
            rows,
        };

        metrics::BULK_ROWS_TOTAL.inc_by(result.len() as f64);
        metrics::BULK_TABLE_ROWS.observe(result.len() as f64);
        info!(
            rows = result.len(),
            columns = result.table.columns.len(),
            high_risk = result.high_risk_count(),
            "Bulk prediction completed"
        );

        Ok(result)
    }
}

/// Read every cell and the required features of every data row
fn parse_table(bytes: &[u8]) -> Result<ParsedTable, BulkError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let columns: Vec<String> = reader.headers()?.iter().map(String::from).collect();

    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for column in &columns {
        if !seen.insert(column.as_str()) && !duplicates.contains(column) {
            duplicates.push(column.clone());
        }
    }
    if !duplicates.is_empty() {
        return Err(BulkError::DuplicateColumns { duplicates });
    }

    let mut positions = [0usize; 6];
    let mut missing = Vec::new();
    for (slot, column) in positions.iter_mut().zip(REQUIRED_COLUMNS.iter()) {
        match columns.iter().position(|header| header == column) {
            Some(index) => *slot = index,
            None => missing.push(column.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(BulkError::MissingColumns { missing });
    }

    let mut cells = Vec::new();
    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        let row_number = index + 1;

        let cell = |position: usize| row.get(position).unwrap_or("");
        let number = |slot: usize| -> Result<f64, BulkError> {
            let value = cell(positions[slot]);
            parse_numeric(value).ok_or_else(|| BulkError::InvalidValue {
                row: row_number,
                column: REQUIRED_COLUMNS[slot].to_string(),
                value: value.to_string(),
            })
        };

        let type_cell = cell(positions[0]);
        if type_cell.is_empty() {
            return Err(BulkError::InvalidValue {
                row: row_number,
                column: COLUMN_TYPE.to_string(),
                value: String::new(),
            });
        }

        records.push(FeatureRecord {
            machine_type: MachineType::from_cell(type_cell),
            air_temperature: number(1)?,
            process_temperature: number(2)?,
            rotational_speed: number(3)?,
            torque: number(4)?,
            tool_wear: number(5)?,
        });
        cells.push(row.iter().map(String::from).collect());
    }

    if records.is_empty() {
        return Err(BulkError::Empty);
    }

    Ok(ParsedTable {
        columns,
        positions,
        cells,
        records,
    })
}
