use serde::{Deserialize, Serialize};

use super::defaults;

/// Retrieval subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Default number of context blocks returned per query.
    pub top_k: usize,
    /// Over-fetch multiplier for the vector-search stage.
    pub vector_overfetch: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: defaults::DEFAULT_TOP_K,
            vector_overfetch: defaults::VECTOR_OVERFETCH,
        }
    }
}
