//! Diversity backfill: coverage-driven, not relevance-driven.
//!
//! When a query asks about event types in general, every catalog code
//! should be represented in the context. Codes missing from the current
//! result set get one representative document each, capped at twice the
//! requested result count.

use std::collections::BTreeSet;

use tracing::debug;

use courier_core::config::defaults::{DIVERSITY_CAP_FACTOR, SCORE_DIVERSITY};
use courier_core::config::FieldBindings;
use courier_core::dataset::value_text;
use courier_core::document::DocumentKind;
use courier_core::intent::QueryIntent;
use courier_core::models::{ContextSource, RetrievedContext};
use courier_index::DatasetIndex;

/// Append one representative document per uncovered catalog code.
///
/// Only runs for generic event-type queries with no specific code
/// mentioned. Returns how many results were appended.
pub fn backfill(
    results: &mut Vec<RetrievedContext>,
    intent: &QueryIntent,
    index: &DatasetIndex,
    bindings: &FieldBindings,
    top_k: usize,
) -> usize {
    if !intent.about_event_type || !intent.mentioned_codes.is_empty() {
        return 0;
    }

    let cap = top_k * DIVERSITY_CAP_FACTOR;
    let covered: BTreeSet<String> = results
        .iter()
        .filter_map(|r| result_code(r, bindings))
        .collect();

    let mut appended = 0;
    for code in &index.catalog.event_codes {
        if results.len() >= cap {
            break;
        }
        if covered.contains(code) {
            continue;
        }
        if let Some(doc) = representative(index, bindings, code) {
            results.push(RetrievedContext {
                content: doc.text.clone(),
                metadata: doc.metadata.clone(),
                similarity: SCORE_DIVERSITY,
                source: ContextSource::Diversity,
            });
            appended += 1;
        }
    }

    if appended > 0 {
        debug!(appended, "diversity backfill added uncovered codes");
    }
    appended
}

/// Event code carried by a result, whether from a summary document
/// (`event_code`) or a raw row (the bound code column).
pub fn result_code(result: &RetrievedContext, bindings: &FieldBindings) -> Option<String> {
    if let Some(code) = result.metadata.get("event_code") {
        return Some(value_text(code));
    }
    bindings
        .event_code
        .as_deref()
        .and_then(|col| result.metadata.get(col))
        .map(value_text)
}

/// Best available document for a code: its summary, else the first raw row.
fn representative<'a>(
    index: &'a DatasetIndex,
    bindings: &FieldBindings,
    code: &str,
) -> Option<&'a courier_core::document::Document> {
    index
        .documents
        .iter()
        .find(|d| {
            d.kind == DocumentKind::EventCodeSummary
                && d.metadata.get("event_code").map(value_text).as_deref() == Some(code)
        })
        .or_else(|| {
            let code_col = bindings.event_code.as_deref()?;
            index.documents.iter().find(|d| {
                d.kind == DocumentKind::Row
                    && d.metadata.get(code_col).map(value_text).as_deref() == Some(code)
            })
        })
}
