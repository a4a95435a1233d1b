//! Query intent: what a free-text question is asking about.

/// Request-scoped classification of one query string.
///
/// Mention lists are catalog-validated: a token only appears here when the
/// dataset actually contains it. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryIntent {
    /// Query asks about a specific event code.
    pub about_event_code: bool,
    /// `about_event_code` was triggered by an explicit keyword rather than
    /// inferred from a catalog-valid number in the query.
    pub explicit_event_keyword: bool,
    /// Query asks about event types in general.
    pub about_event_type: bool,
    /// Query asks about a postal establishment.
    pub about_establishment: bool,
    /// Query asks about an individual mail item.
    pub about_mail_item: bool,
    /// Query asks for a dataset-level overview.
    pub wants_overview: bool,
    /// Catalog-valid event codes found in the query, in query order.
    pub mentioned_codes: Vec<String>,
    /// Catalog establishments found in the query.
    pub mentioned_establishments: Vec<String>,
    /// Catalog-valid mail item identifiers found in the query.
    pub mentioned_item_ids: Vec<String>,
}

impl QueryIntent {
    /// Whether any flag or mention was detected at all.
    pub fn is_blank(&self) -> bool {
        !self.about_event_code
            && !self.about_event_type
            && !self.about_establishment
            && !self.about_mail_item
            && !self.wants_overview
            && self.mentioned_codes.is_empty()
            && self.mentioned_establishments.is_empty()
            && self.mentioned_item_ids.is_empty()
    }
}
