//! Pure query classification against the dataset catalog.
//!
//! Token extraction plus fixed keyword vocabularies. A number or identifier
//! only becomes a mention when the catalog actually contains it; a
//! catalog-valid code with no event keyword still sets the event-code flag.

use std::sync::LazyLock;

use regex::Regex;

use courier_core::catalog::Catalog;
use courier_core::intent::QueryIntent;

/// Bare integer tokens: potential event codes.
static INTEGER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d+\b").unwrap());

/// Long uppercase alphanumeric tokens: potential mail item identifiers.
static ITEM_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[A-Z0-9]{10,}\b").unwrap());

/// Keywords flagging a query as being about a specific event code.
const EVENT_CODE_KEYWORDS: &[&str] = &["event code", "code"];

/// Keywords flagging a query as being about event types in general.
const EVENT_TYPE_KEYWORDS: &[&str] = &[
    "event type",
    "event types",
    "type of event",
    "types of event",
    "kind of event",
    "kinds of event",
    "what events",
];

/// Keywords for postal establishments.
const ESTABLISHMENT_KEYWORDS: &[&str] = &["establishment", "postal", "office", "facility"];

/// Keywords for individual mail items.
const ITEM_KEYWORDS: &[&str] = &["mail item", "package", "parcel", "track", "shipment"];

/// Keywords for whole-dataset questions.
const OVERVIEW_KEYWORDS: &[&str] = &["overview", "summary", "summarize", "dataset", "describe"];

/// Bare integer tokens of a query, in query order.
pub fn numeric_tokens(query: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for m in INTEGER_RE.find_iter(query) {
        let token = m.as_str().to_string();
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens
}

/// Potential mail item identifiers (long uppercase alphanumerics).
pub fn item_id_tokens(query: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for m in ITEM_ID_RE.find_iter(query) {
        let token = m.as_str().trim().to_string();
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Classify one query string against the catalog. Pure and infallible.
pub fn classify(query: &str, catalog: &Catalog) -> QueryIntent {
    let lowered = query.to_lowercase();

    let mut intent = QueryIntent {
        explicit_event_keyword: contains_any(&lowered, EVENT_CODE_KEYWORDS),
        about_event_type: contains_any(&lowered, EVENT_TYPE_KEYWORDS),
        about_establishment: contains_any(&lowered, ESTABLISHMENT_KEYWORDS),
        about_mail_item: contains_any(&lowered, ITEM_KEYWORDS),
        wants_overview: contains_any(&lowered, OVERVIEW_KEYWORDS),
        ..QueryIntent::default()
    };
    intent.about_event_code = intent.explicit_event_keyword;

    // Numbers are only mentions when the dataset actually knows them.
    intent.mentioned_codes = numeric_tokens(query)
        .into_iter()
        .filter(|code| catalog.event_codes.contains(code))
        .collect();

    // A catalog-valid code without any event keyword is implicit intent.
    if !intent.about_event_code && !intent.mentioned_codes.is_empty() {
        intent.about_event_code = true;
    }

    // The item-id pattern runs on the raw query; identifiers are uppercase.
    intent.mentioned_item_ids = item_id_tokens(query)
        .into_iter()
        .filter(|id| catalog.item_ids.contains(id))
        .collect();

    // Establishment mentions are catalog values appearing in the query.
    intent.mentioned_establishments = catalog
        .establishments
        .iter()
        .filter(|est| lowered.contains(&est.to_lowercase()))
        .cloned()
        .collect();

    intent
}
