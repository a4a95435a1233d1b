//! CSV ingestion with light type inference.
//!
//! Numeric-looking cells become JSON numbers, empty cells become null,
//! everything else stays a string. Event codes with leading zeros stay
//! textual so "012" is not collapsed to 12.

use std::io::Read;
use std::path::Path;

use serde_json::Value;

use super::{Dataset, Row};
use crate::errors::{CourierResult, DatasetError};

impl Dataset {
    /// Load a dataset from a CSV file on disk.
    pub fn from_csv_path(path: impl AsRef<Path>) -> CourierResult<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_csv_reader(file)
    }

    /// Load a dataset from any CSV byte stream. The first record is the
    /// header; headers become column names verbatim.
    pub fn from_csv_reader<R: Read>(reader: R) -> CourierResult<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let columns: Vec<String> = rdr
            .headers()
            .map_err(|e| DatasetError::CsvParseFailed {
                reason: e.to_string(),
            })?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record.map_err(|e| DatasetError::CsvParseFailed {
                reason: e.to_string(),
            })?;
            if record.len() > columns.len() {
                return Err(DatasetError::RaggedRecord {
                    record: i + 1,
                    expected: columns.len(),
                    actual: record.len(),
                }
                .into());
            }

            let mut row = Row::with_capacity(columns.len());
            for (name, cell) in columns.iter().zip(record.iter()) {
                row.insert(name.clone(), infer_cell(cell));
            }
            // Short records: remaining columns are null.
            for name in columns.iter().skip(record.len()) {
                row.insert(name.clone(), Value::Null);
            }
            rows.push(row);
        }

        Ok(Self::new(columns, rows))
    }
}

/// Infer a typed value from one raw CSV cell.
fn infer_cell(cell: &str) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    // "012" stays a string; identifiers with leading zeros must round-trip.
    let leading_zero = trimmed.len() > 1 && trimmed.starts_with('0');
    if !leading_zero {
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Number(i.into());
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if let Some(n) = serde_json::Number::from_f64(f) {
                return Value::Number(n);
            }
        }
    }
    Value::String(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE: &str = "\
MAILITM_FID,EVENT_TYPE_CD,EVENT_TYPE_NM,date
RR123456789FR,12,Delivered,2024-03-01
RR987654321FR,10,Received,
";

    #[test]
    fn parses_headers_and_rows() {
        let ds = Dataset::from_csv_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(
            ds.columns(),
            ["MAILITM_FID", "EVENT_TYPE_CD", "EVENT_TYPE_NM", "date"]
        );
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn infers_numbers_and_nulls() {
        let ds = Dataset::from_csv_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(ds.rows()[0]["EVENT_TYPE_CD"], json!(12));
        assert_eq!(ds.rows()[1]["date"], Value::Null);
        assert_eq!(ds.rows()[0]["MAILITM_FID"], json!("RR123456789FR"));
    }

    #[test]
    fn leading_zero_codes_stay_textual() {
        assert_eq!(infer_cell("012"), json!("012"));
        assert_eq!(infer_cell("0"), json!(0));
        assert_eq!(infer_cell("3.5"), json!(3.5));
    }

    #[test]
    fn short_records_pad_with_null() {
        let csv = "a,b,c\n1,2\n";
        let ds = Dataset::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(ds.rows()[0]["c"], Value::Null);
    }
}
