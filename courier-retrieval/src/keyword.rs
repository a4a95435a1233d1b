//! Keyword search: intent-driven, mutually exclusive branches.
//!
//! The ladder is tried in priority order and exactly one branch fires per
//! query: explicit codes, implicit catalog-valid numbers, item ids,
//! establishments, overview, generic event types.

use tracing::debug;

use courier_core::config::defaults::{
    GENERIC_EVENT_SUMMARY_LIMIT, KEYWORD_ROW_FALLBACK_LIMIT, SCORE_ESTABLISHMENT_ROW,
    SCORE_ESTABLISHMENT_SUMMARY, SCORE_EVENT_TYPE_SUMMARY, SCORE_ITEM_ROW, SCORE_KEYWORD_ROW,
    SCORE_KEYWORD_SUMMARY, SCORE_NUMBER_ROW, SCORE_NUMBER_SUMMARY, SCORE_OVERVIEW,
};
use courier_core::config::FieldBindings;
use courier_core::dataset::value_text;
use courier_core::document::{Document, DocumentKind};
use courier_core::intent::QueryIntent;
use courier_core::models::{ContextSource, RetrievedContext};
use courier_index::DatasetIndex;

/// Run the keyword stage; at most one branch produces results.
pub fn keyword_search(
    intent: &QueryIntent,
    index: &DatasetIndex,
    bindings: &FieldBindings,
) -> Vec<RetrievedContext> {
    if !intent.mentioned_codes.is_empty() {
        // Branch (a): explicit event-code intent; branch (b): the same
        // numbers arrived without any event keyword, slightly less certain.
        let (summary_score, row_score, source) = if intent.explicit_event_keyword {
            (SCORE_KEYWORD_SUMMARY, SCORE_KEYWORD_ROW, ContextSource::Keyword)
        } else {
            (SCORE_NUMBER_SUMMARY, SCORE_NUMBER_ROW, ContextSource::KeywordNumber)
        };
        debug!(codes = ?intent.mentioned_codes, "keyword branch: event codes");
        return code_results(intent, index, bindings, summary_score, row_score, source);
    }

    if !intent.mentioned_item_ids.is_empty() {
        debug!(ids = ?intent.mentioned_item_ids, "keyword branch: item ids");
        return item_results(intent, index, bindings);
    }

    if !intent.mentioned_establishments.is_empty() {
        debug!(
            establishments = ?intent.mentioned_establishments,
            "keyword branch: establishments"
        );
        return establishment_results(intent, index, bindings);
    }

    if intent.wants_overview {
        debug!("keyword branch: overview");
        return index
            .documents
            .iter()
            .filter(|d| d.kind == DocumentKind::DatasetOverview)
            .map(|d| context_from(d, SCORE_OVERVIEW, ContextSource::Keyword))
            .collect();
    }

    if intent.about_event_type {
        debug!("keyword branch: generic event types");
        let mut summaries: Vec<&Document> = index
            .documents
            .iter()
            .filter(|d| d.kind == DocumentKind::EventCodeSummary)
            .collect();
        summaries.sort_by_key(|d| d.metadata.get("event_code").map(value_text));
        return summaries
            .into_iter()
            .take(GENERIC_EVENT_SUMMARY_LIMIT)
            .map(|d| context_from(d, SCORE_EVENT_TYPE_SUMMARY, ContextSource::Keyword))
            .collect();
    }

    Vec::new()
}

fn code_results(
    intent: &QueryIntent,
    index: &DatasetIndex,
    bindings: &FieldBindings,
    summary_score: f32,
    row_score: f32,
    source: ContextSource,
) -> Vec<RetrievedContext> {
    let mut results = Vec::new();
    for code in &intent.mentioned_codes {
        let summary = index.documents.iter().find(|d| {
            d.kind == DocumentKind::EventCodeSummary
                && d.metadata.get("event_code").map(value_text).as_deref() == Some(code.as_str())
        });
        match summary {
            Some(doc) => results.push(context_from(doc, summary_score, source)),
            None => {
                // No summary document: fall back to raw rows with this code.
                results.extend(
                    rows_with_value(index, bindings.event_code.as_deref(), code)
                        .take(KEYWORD_ROW_FALLBACK_LIMIT)
                        .map(|d| context_from(d, row_score, source)),
                );
            }
        }
    }
    results
}

fn item_results(
    intent: &QueryIntent,
    index: &DatasetIndex,
    bindings: &FieldBindings,
) -> Vec<RetrievedContext> {
    let mut results = Vec::new();
    for id in &intent.mentioned_item_ids {
        results.extend(
            index
                .documents
                .iter()
                .filter(|d| d.kind == DocumentKind::Row)
                .filter(|d| {
                    let bound = bindings
                        .item_id
                        .as_deref()
                        .and_then(|col| d.metadata.get(col))
                        .map(value_text);
                    bound.as_deref() == Some(id.as_str()) || d.text.contains(id.as_str())
                })
                .map(|d| context_from(d, SCORE_ITEM_ROW, ContextSource::Keyword)),
        );
    }
    results
}

fn establishment_results(
    intent: &QueryIntent,
    index: &DatasetIndex,
    bindings: &FieldBindings,
) -> Vec<RetrievedContext> {
    let mut results = Vec::new();
    for est in &intent.mentioned_establishments {
        let summary = index.documents.iter().find(|d| {
            d.kind == DocumentKind::EstablishmentSummary
                && d.metadata.get("establishment").map(value_text).as_deref()
                    == Some(est.as_str())
        });
        match summary {
            Some(doc) => {
                results.push(context_from(doc, SCORE_ESTABLISHMENT_SUMMARY, ContextSource::Keyword))
            }
            None => {
                results.extend(
                    rows_with_value(index, bindings.establishment.as_deref(), est)
                        .take(KEYWORD_ROW_FALLBACK_LIMIT)
                        .map(|d| context_from(d, SCORE_ESTABLISHMENT_ROW, ContextSource::Keyword)),
                );
            }
        }
    }
    results
}

/// Row documents whose bound column renders to the given value.
fn rows_with_value<'a>(
    index: &'a DatasetIndex,
    column: Option<&'a str>,
    value: &'a str,
) -> impl Iterator<Item = &'a Document> + 'a {
    index
        .documents
        .iter()
        .filter(|d| d.kind == DocumentKind::Row)
        .filter(move |d| {
            column
                .and_then(|col| d.metadata.get(col))
                .map(value_text)
                .as_deref()
                == Some(value)
        })
}

fn context_from(document: &Document, similarity: f32, source: ContextSource) -> RetrievedContext {
    RetrievedContext {
        content: document.text.clone(),
        metadata: document.metadata.clone(),
        similarity,
        source,
    }
}
