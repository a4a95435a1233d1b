//! Tabular dataset model: ordered rows of named scalar values.

mod loader;

use std::collections::HashMap;

use serde_json::Value;

/// One dataset row: column name → scalar value.
pub type Row = HashMap<String, Value>;

/// An in-memory tabular dataset.
///
/// Column order is preserved from ingestion. A dataset is immutable once
/// indexed; replacing the data means replacing the whole dataset and forcing
/// an index rebuild.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Column names, in original order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

/// Render a scalar cell for display: `"12"`, `"3.5"`, `"Delivered"`.
///
/// Nulls render empty so callers can join non-null fields without holes.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Whether a cell counts as present: non-null and, for strings, non-blank.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}
