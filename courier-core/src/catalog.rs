//! Catalog of known entity values, used to validate query mentions.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Known entity values extracted once per dataset.
///
/// Read-only after construction and always derived from the same dataset
/// snapshot as the current index. Ordered collections keep summary listings
/// and diversity iteration deterministic across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Distinct event codes.
    pub event_codes: BTreeSet<String>,
    /// Event code → display name (first non-null name wins).
    pub event_code_names: BTreeMap<String, String>,
    /// Distinct postal establishments.
    pub establishments: BTreeSet<String>,
    /// Distinct mail item identifiers, whitespace-trimmed.
    pub item_ids: BTreeSet<String>,
}

impl Catalog {
    /// Resolved display name for a code, falling back to the code itself.
    pub fn code_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.event_code_names
            .get(code)
            .map(String::as_str)
            .unwrap_or(code)
    }
}
