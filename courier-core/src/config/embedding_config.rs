use serde::{Deserialize, Serialize};

use super::defaults;

/// Embedding subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding provider: "local", "openai", "together", "huggingface".
    pub provider: String,
    /// Model name or ID for the selected provider.
    pub model: String,
    /// Override for the embedding dimensions; `None` uses the provider default.
    pub dimensions: Option<usize>,
    /// Batch size for embedding operations.
    pub batch_size: usize,
    /// Timeout for a single remote embedding call.
    pub timeout_secs: u64,
    /// Retry attempts for a failing remote call.
    pub max_retries: u32,
    /// In-memory embedding cache max entries.
    pub cache_capacity: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: defaults::DEFAULT_EMBEDDING_PROVIDER.to_string(),
            model: defaults::DEFAULT_LOCAL_MODEL.to_string(),
            dimensions: None,
            batch_size: defaults::DEFAULT_EMBEDDING_BATCH_SIZE,
            timeout_secs: defaults::DEFAULT_REMOTE_TIMEOUT_SECS,
            max_retries: defaults::DEFAULT_REMOTE_MAX_RETRIES,
            cache_capacity: defaults::DEFAULT_CACHE_CAPACITY,
        }
    }
}
