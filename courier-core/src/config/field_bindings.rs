use serde::{Deserialize, Serialize};

use super::defaults;

/// Column-name bindings tying the document builder to a dataset layout.
///
/// Every binding is optional: a `None` binding, or a bound column that the
/// dataset does not carry, switches the dependent document family or catalog
/// field off instead of failing the build.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldBindings {
    /// Column holding the event code.
    pub event_code: Option<String>,
    /// Column holding the human-readable event name.
    pub event_name: Option<String>,
    /// Column holding the postal establishment.
    pub establishment: Option<String>,
    /// Column holding the mail item identifier.
    pub item_id: Option<String>,
    /// Column holding the event date.
    pub event_date: Option<String>,
}

impl Default for FieldBindings {
    fn default() -> Self {
        Self {
            event_code: Some(defaults::DEFAULT_EVENT_CODE_COLUMN.to_string()),
            event_name: Some(defaults::DEFAULT_EVENT_NAME_COLUMN.to_string()),
            establishment: Some(defaults::DEFAULT_ESTABLISHMENT_COLUMN.to_string()),
            item_id: Some(defaults::DEFAULT_ITEM_ID_COLUMN.to_string()),
            event_date: Some(defaults::DEFAULT_EVENT_DATE_COLUMN.to_string()),
        }
    }
}

impl FieldBindings {
    /// Bindings with every column switched off.
    pub fn none() -> Self {
        Self {
            event_code: None,
            event_name: None,
            establishment: None,
            item_id: None,
            event_date: None,
        }
    }
}
