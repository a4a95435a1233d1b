//! Direct lookup: exact, non-fuzzy match of a query number against the
//! dataset's code column.
//!
//! The first catalog-checked number actually present in the data wins; one
//! code per query. Emits a synthetic summary at similarity 1.0 plus the
//! matching code-summary document at 0.99.

use std::collections::HashMap;

use serde_json::json;
use tracing::debug;

use courier_core::config::defaults::{SCORE_DIRECT_LOOKUP, SCORE_DIRECT_SUMMARY};
use courier_core::config::FieldBindings;
use courier_core::dataset::{is_present, value_text, Dataset};
use courier_core::document::DocumentKind;
use courier_core::models::{ContextSource, RetrievedContext};
use courier_index::DatasetIndex;

use crate::intent::numeric_tokens;

/// Run the direct-lookup stage for one query.
pub fn direct_lookup(
    query: &str,
    dataset: &Dataset,
    index: &DatasetIndex,
    bindings: &FieldBindings,
) -> Vec<RetrievedContext> {
    let Some(code_col) = bindings
        .event_code
        .as_deref()
        .filter(|col| dataset.has_column(col))
    else {
        return Vec::new();
    };

    for code in numeric_tokens(query) {
        let count = dataset
            .rows()
            .iter()
            .filter(|row| {
                row.get(code_col)
                    .filter(|v| is_present(v))
                    .map(value_text)
                    .as_deref()
                    == Some(code.as_str())
            })
            .count();
        if count == 0 {
            continue;
        }

        let name = index.catalog.code_name(&code).to_string();
        debug!(code = code.as_str(), count, "direct lookup hit");

        let mut results = vec![RetrievedContext {
            content: format!("Event Code {code} ({name}): {count} records in the dataset"),
            metadata: HashMap::from([
                ("event_code".to_string(), json!(code)),
                ("event_name".to_string(), json!(name)),
                ("match_count".to_string(), json!(count)),
            ]),
            similarity: SCORE_DIRECT_LOOKUP,
            source: ContextSource::DirectLookup,
        }];

        if let Some(summary) = index.documents.iter().find(|d| {
            d.kind == DocumentKind::EventCodeSummary
                && d.metadata.get("event_code").map(value_text).as_deref() == Some(code.as_str())
        }) {
            results.push(RetrievedContext {
                content: summary.text.clone(),
                metadata: summary.metadata.clone(),
                similarity: SCORE_DIRECT_SUMMARY,
                source: ContextSource::DirectLookupSummary,
            });
        }

        // First matching code wins; later numbers are served by the final
        // selection's per-code coverage rule instead.
        return results;
    }

    Vec::new()
}
