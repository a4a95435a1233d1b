use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which retrieval strategy produced a context block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextSource {
    DirectLookup,
    DirectLookupSummary,
    Keyword,
    KeywordNumber,
    Vector,
    Diversity,
}

impl ContextSource {
    /// Tie-break priority at equal similarity; lower ranks first.
    pub fn priority(&self) -> u8 {
        match self {
            Self::DirectLookup => 0,
            Self::DirectLookupSummary => 1,
            Self::Keyword | Self::KeywordNumber => 2,
            Self::Vector => 3,
            Self::Diversity => 4,
        }
    }

    /// Stable label for diagnostics output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DirectLookup => "direct_lookup",
            Self::DirectLookupSummary => "direct_lookup_summary",
            Self::Keyword => "keyword",
            Self::KeywordNumber => "keyword_number",
            Self::Vector => "vector",
            Self::Diversity => "diversity",
        }
    }
}

/// One ranked context block returned by retrieval. Transient, produced per
/// query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedContext {
    pub content: String,
    pub metadata: HashMap<String, Value>,
    /// Similarity in [0, 1]; synthetic paths carry fixed confidences.
    pub similarity: f32,
    pub source: ContextSource,
}

impl RetrievedContext {
    /// Ranking order: similarity descending, then source priority.
    pub fn ranking_cmp(&self, other: &Self) -> Ordering {
        other
            .similarity
            .partial_cmp(&self.similarity)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.source.priority().cmp(&other.source.priority()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(similarity: f32, source: ContextSource) -> RetrievedContext {
        RetrievedContext {
            content: String::new(),
            metadata: HashMap::new(),
            similarity,
            source,
        }
    }

    #[test]
    fn ranks_by_similarity_first() {
        let mut results = vec![
            ctx(0.5, ContextSource::DirectLookup),
            ctx(0.9, ContextSource::Vector),
        ];
        results.sort_by(RetrievedContext::ranking_cmp);
        assert_eq!(results[0].similarity, 0.9);
    }

    #[test]
    fn source_priority_breaks_ties() {
        let mut results = vec![
            ctx(0.9, ContextSource::Diversity),
            ctx(0.9, ContextSource::Vector),
            ctx(0.9, ContextSource::Keyword),
            ctx(0.9, ContextSource::DirectLookup),
        ];
        results.sort_by(RetrievedContext::ranking_cmp);
        let order: Vec<_> = results.iter().map(|r| r.source).collect();
        assert_eq!(
            order,
            [
                ContextSource::DirectLookup,
                ContextSource::Keyword,
                ContextSource::Vector,
                ContextSource::Diversity,
            ]
        );
    }
}
