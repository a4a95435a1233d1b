/// Dataset ingestion errors.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("csv parse failed: {reason}")]
    CsvParseFailed { reason: String },

    #[error("csv record {record} has {actual} fields, header has {expected}")]
    RaggedRecord {
        record: usize,
        expected: usize,
        actual: usize,
    },
}
