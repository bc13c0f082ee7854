use crate::error::{AppError, Result};
use crate::models::BulkTable;
use tracing::debug;

/// Download name for exported results
pub const EXPORT_FILENAME: &str = "maintenance_results.csv";

/// Turn the serialized table carried by the bulk page back into CSV.
///
/// A payload that is not a records-oriented JSON table is a `Serialization`
/// error.
pub fn export_csv(payload: &str) -> Result<Vec<u8>> {
    let table = BulkTable::from_json(payload)?;
    debug!(
        rows = table.len(),
        columns = table.columns.len(),
        "Exporting bulk result"
    );
    write_csv(&table)
}

/// CSV with the same header and cell text as the rendered table
pub fn write_csv(table: &BulkTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush CSV export: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RESULT_COLUMN;

    fn table() -> BulkTable {
        BulkTable {
            columns: vec![
                "UDI".to_string(),
                "Product ID".to_string(),
                "Type".to_string(),
                "Torque [Nm]".to_string(),
                RESULT_COLUMN.to_string(),
            ],
            rows: vec![
                vec![
                    "1".to_string(),
                    "H29424".to_string(),
                    "H".to_string(),
                    "40.25".to_string(),
                    "لا يوجد عطل".to_string(),
                ],
                vec![
                    "2".to_string(),
                    "L47181".to_string(),
                    "L".to_string(),
                    "150.0".to_string(),
                    "عطل, مع فاصلة".to_string(),
                ],
            ],
        }
    }

    #[test]
    fn test_export_matches_rendered_cells() {
        let table = table();
        let payload = table.to_json().unwrap();

        let bytes = export_csv(&payload).unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());

        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(header, table.columns);
        assert_eq!(header.last().map(String::as_str), Some(RESULT_COLUMN));

        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        assert_eq!(rows, table.rows);
    }

    #[test]
    fn test_empty_table_exports_one_line() {
        let bytes = export_csv("[]").unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_malformed_payload_is_serialization_error() {
        assert!(matches!(
            export_csv("not json"),
            Err(AppError::Serialization(_))
        ));
        assert!(matches!(
            export_csv(r#"{"rows": 3}"#),
            Err(AppError::Serialization(_))
        ));
        assert!(matches!(
            export_csv(r#"[{"a": "1"}, {"b": "2"}]"#),
            Err(AppError::Serialization(_))
        ));
    }
}
