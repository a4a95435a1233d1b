use serde::{Deserialize, Serialize};

use super::defaults;

/// Similarity-index subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Root directory for persisted per-dataset indices.
    pub root_dir: String,
    /// Row-count threshold above which embedding runs in chunks.
    pub chunk_size: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            root_dir: defaults::DEFAULT_INDEX_ROOT.to_string(),
            chunk_size: defaults::DEFAULT_CHUNK_SIZE,
        }
    }
}
