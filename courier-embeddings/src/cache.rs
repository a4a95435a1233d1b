//! In-memory embedding cache.
//!
//! Injected into the engine, never process-global. Keys are a blake3 hash
//! of provider, model, and text so a configuration switch can never serve
//! vectors computed under a different model.

use moka::sync::Cache;

/// Embedding cache keyed by (provider, model, text).
pub struct EmbeddingCache {
    cache: Cache<String, Vec<f32>>,
}

impl EmbeddingCache {
    /// Create a cache with the given max entry count.
    pub fn new(capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Cache key for one (provider, model, text) triple.
    pub fn key(provider: &str, model: &str, text: &str) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(provider.as_bytes());
        hasher.update(&[0x1f]);
        hasher.update(model.as_bytes());
        hasher.update(&[0x1f]);
        hasher.update(text.as_bytes());
        hasher.finalize().to_hex().to_string()
    }

    pub fn get(&self, key: &str) -> Option<Vec<f32>> {
        self.cache.get(key)
    }

    pub fn insert(&self, key: String, vector: Vec<f32>) {
        self.cache.insert(key, vector);
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invalidate all entries.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}
