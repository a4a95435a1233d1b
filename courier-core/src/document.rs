//! Documents: the text+metadata units the similarity index is built over.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The document families produced from one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// One document per dataset row.
    Row,
    /// One document per distinct event code.
    EventCodeSummary,
    /// One document per distinct establishment.
    EstablishmentSummary,
    /// Exactly one document per dataset.
    DatasetOverview,
}

/// A retrievable unit: rendered text plus the metadata it was derived from.
///
/// Never mutated after creation; owned by the index that was built over it
/// and aligned 1:1 by position with that index's vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub metadata: HashMap<String, Value>,
    pub kind: DocumentKind,
}

impl Document {
    pub fn new(text: String, metadata: HashMap<String, Value>, kind: DocumentKind) -> Self {
        Self {
            text,
            metadata,
            kind,
        }
    }
}
