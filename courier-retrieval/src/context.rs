//! Context formatting for the downstream language model.
//!
//! Exact matches come first under a fixed header; everything else goes
//! under a generic information header. Blocks are deliberately unnumbered
//! so the model cannot anchor on context indices. A diagnostics footer
//! records where each block came from and which query numbers were
//! recognized.

use std::collections::{BTreeMap, BTreeSet};

use courier_core::catalog::Catalog;
use courier_core::dataset::value_text;
use courier_core::models::{ContextSource, RetrievedContext};

use crate::intent::numeric_tokens;

/// Fixed sentinel for an empty result set.
pub const NO_CONTEXT_SENTINEL: &str = "No relevant context found in the data.";

const EXACT_HEADER: &str = "Exact matches found in the data:";
const GENERAL_HEADER: &str = "Relevant information from the data:";

/// Serialize ranked results into the context block handed to the model.
pub fn format_context(results: &[RetrievedContext], query: &str, catalog: &Catalog) -> String {
    if results.is_empty() {
        return NO_CONTEXT_SENTINEL.to_string();
    }

    let is_direct = |r: &RetrievedContext| {
        matches!(
            r.source,
            ContextSource::DirectLookup | ContextSource::DirectLookupSummary
        )
    };

    let mut out = String::new();

    let direct: Vec<&RetrievedContext> = results.iter().filter(|r| is_direct(r)).collect();
    if !direct.is_empty() {
        out.push_str(EXACT_HEADER);
        for result in &direct {
            out.push_str("\n\n");
            out.push_str(&result.content);
        }
        out.push_str("\n\n");
    }

    let general: Vec<&RetrievedContext> = results.iter().filter(|r| !is_direct(r)).collect();
    if !general.is_empty() {
        out.push_str(GENERAL_HEADER);
        for result in &general {
            out.push_str("\n\n");
            out.push_str(&result.content);
        }
        out.push_str("\n\n");
    }

    out.push_str(&diagnostics_footer(results, query, catalog));
    out
}

/// Per-source counts, event codes present in result metadata, and the
/// query's bare numbers annotated with catalog validity.
fn diagnostics_footer(results: &[RetrievedContext], query: &str, catalog: &Catalog) -> String {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for result in results {
        *counts.entry(result.source.label()).or_default() += 1;
    }
    let sources: Vec<String> = counts
        .iter()
        .map(|(label, count)| format!("{label}={count}"))
        .collect();

    // Any metadata value that is a known event code counts as coverage,
    // whether it came from a summary document or a raw row.
    let mut codes: BTreeSet<String> = BTreeSet::new();
    for result in results {
        for (key, value) in &result.metadata {
            // Positional and count fields can collide with real codes.
            if matches!(
                key.as_str(),
                "row_index" | "record_count" | "match_count" | "total_records"
            ) {
                continue;
            }
            let rendered = value_text(value);
            if catalog.event_codes.contains(&rendered) {
                codes.insert(rendered);
            }
        }
    }

    let numbers = numeric_tokens(query);
    let annotated: Vec<String> = numbers
        .iter()
        .map(|n| {
            if catalog.event_codes.contains(n) {
                format!("{n} (valid event code)")
            } else {
                format!("{n} (not in catalog)")
            }
        })
        .collect();

    let mut footer = String::from("---\nRetrieval diagnostics:\n");
    footer.push_str(&format!("sources: {}\n", sources.join(", ")));
    footer.push_str(&format!(
        "event codes in context: {}\n",
        if codes.is_empty() {
            "none".to_string()
        } else {
            codes.into_iter().collect::<Vec<_>>().join(", ")
        }
    ));
    footer.push_str(&format!(
        "numeric tokens in query: {}",
        if annotated.is_empty() {
            "none".to_string()
        } else {
            annotated.join(", ")
        }
    ));
    footer
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::{BTreeMap as Map, BTreeSet as Set, HashMap};

    fn catalog() -> Catalog {
        Catalog {
            event_codes: Set::from(["10".into(), "12".into()]),
            event_code_names: Map::from([("12".to_string(), "Delivered".to_string())]),
            establishments: Set::new(),
            item_ids: Set::new(),
        }
    }

    fn result(content: &str, source: ContextSource) -> RetrievedContext {
        RetrievedContext {
            content: content.to_string(),
            metadata: HashMap::new(),
            similarity: 0.9,
            source,
        }
    }

    #[test]
    fn empty_results_return_sentinel() {
        assert_eq!(
            format_context(&[], "anything", &catalog()),
            NO_CONTEXT_SENTINEL
        );
    }

    #[test]
    fn direct_results_render_first_under_exact_header() {
        let results = vec![
            result("vector info", ContextSource::Vector),
            result("Event Code 12 (Delivered): 6 records", ContextSource::DirectLookup),
        ];
        let out = format_context(&results, "code 12", &catalog());

        let exact = out.find(EXACT_HEADER).expect("exact header");
        let general = out.find(GENERAL_HEADER).expect("general header");
        assert!(exact < general);
        assert!(out.contains("Event Code 12 (Delivered): 6 records"));
    }

    #[test]
    fn blocks_are_not_numbered() {
        let results = vec![
            result("first block", ContextSource::Keyword),
            result("second block", ContextSource::Vector),
        ];
        let out = format_context(&results, "", &catalog());
        assert!(!out.contains("1. "));
        assert!(!out.contains("2. "));
    }

    #[test]
    fn footer_counts_sources_and_annotates_numbers() {
        let mut with_code = result("summary", ContextSource::Keyword);
        with_code
            .metadata
            .insert("event_code".to_string(), json!("12"));
        let results = vec![with_code, result("other", ContextSource::Vector)];

        let out = format_context(&results, "about 12 and 99", &catalog());
        assert!(out.contains("sources: keyword=1, vector=1"));
        assert!(out.contains("event codes in context: 12"));
        assert!(out.contains("12 (valid event code)"));
        assert!(out.contains("99 (not in catalog)"));
    }

    #[test]
    fn numeric_metadata_counts_as_code_coverage() {
        let mut row = result("row doc", ContextSource::Vector);
        row.metadata.insert("EVENT_TYPE_CD".to_string(), json!(10));
        let out = format_context(&[row], "", &catalog());
        assert!(out.contains("event codes in context: 10"));
        assert!(out.contains("numeric tokens in query: none"));
    }
}
