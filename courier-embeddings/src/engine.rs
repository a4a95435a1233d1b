//! EmbeddingEngine — the public entry point of courier-embeddings.
//!
//! Wraps provider selection, the fallback chain, and the injected cache.
//! Failures degrade at this boundary: when every provider in the chain
//! fails, the caller gets a zero-vector of the declared dimension and a
//! degradation event, never an error.

use std::sync::Mutex;

use courier_core::config::EmbeddingConfig;
use courier_core::models::DegradationEvent;
use tracing::{debug, info, warn};

use crate::cache::EmbeddingCache;
use crate::chain::FallbackChain;
use crate::providers::{self, CredentialStore, HashedTfProvider};

/// The main embedding engine.
pub struct EmbeddingEngine {
    chain: FallbackChain,
    cache: EmbeddingCache,
    config: EmbeddingConfig,
    dimensions: usize,
    primary_is_local: bool,
    events: Mutex<Vec<DegradationEvent>>,
}

impl EmbeddingEngine {
    /// Create an engine from configuration, resolving credentials through
    /// the given store. A remote backend without its credential silently
    /// becomes the local provider (recorded as a degradation event).
    pub fn new(
        config: EmbeddingConfig,
        cache: EmbeddingCache,
        credentials: &dyn CredentialStore,
    ) -> Self {
        let selection = providers::create_provider(&config, credentials);
        let dimensions = selection.provider.dimensions();
        let primary_is_local = selection.is_local;

        let mut events = Vec::new();
        if let Some(requested) = selection.downgraded_from {
            events.push(DegradationEvent::now(
                "embeddings",
                format!("{requested} backend unavailable at construction"),
                "local",
            ));
        }

        let mut chain = FallbackChain::new();
        chain.push(selection.provider);
        if !primary_is_local {
            // The local fallback mirrors the primary's dimensions so a mid-
            // build fallback cannot corrupt the index geometry.
            chain.push(Box::new(HashedTfProvider::new(dimensions)));
        }

        info!(
            provider = config.provider.as_str(),
            model = config.model.as_str(),
            dims = dimensions,
            chain = chain.len(),
            "embedding engine initialized"
        );

        Self {
            chain,
            cache,
            config,
            dimensions,
            primary_is_local,
            events: Mutex::new(events),
        }
    }

    /// Assemble an engine from an explicit chain. Intended for tests and
    /// callers that construct providers themselves.
    pub fn from_parts(chain: FallbackChain, cache: EmbeddingCache, config: EmbeddingConfig) -> Self {
        let dimensions = config
            .dimensions
            .filter(|d| *d > 0)
            .unwrap_or_else(|| chain.dimensions());
        let primary_is_local = config.provider == "local";
        Self {
            chain,
            cache,
            config,
            dimensions,
            primary_is_local,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Embed one text. Infallible: chain exhaustion yields a zero-vector.
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let key = EmbeddingCache::key(&self.config.provider, &self.config.model, text);
        if let Some(hit) = self.cache.get(&key) {
            debug!("embedding cache hit");
            return hit;
        }

        match self.chain.embed(text) {
            Ok(vector) => {
                self.cache.insert(key, vector.clone());
                vector
            }
            Err(e) => {
                warn!(error = %e, "all embedding providers failed, using zero vector");
                self.record(DegradationEvent::now("embeddings", e.to_string(), "zero-vector"));
                vec![0.0; self.dimensions]
            }
        }
    }

    /// Embed a batch of texts in `batch_size` slices.
    ///
    /// A local primary embeds each slice in a single provider call; remote
    /// primaries are called one text at a time so one failing item cannot
    /// abort the batch. Failures degrade to zero-vectors per item.
    pub fn embed_batch(&self, texts: &[String], batch_size: usize) -> Vec<Vec<f32>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for slice in texts.chunks(batch_size.max(1)) {
            if self.primary_is_local {
                match self.chain.embed_batch(slice) {
                    Ok(batch) => vectors.extend(batch),
                    Err(e) => {
                        warn!(error = %e, items = slice.len(), "batch embed failed, using zero vectors");
                        self.record(DegradationEvent::now(
                            "embeddings",
                            e.to_string(),
                            "zero-vector",
                        ));
                        vectors.extend(slice.iter().map(|_| vec![0.0; self.dimensions]));
                    }
                }
            } else {
                for text in slice {
                    vectors.push(self.embed_one(text));
                }
            }
        }
        vectors
    }

    /// Declared embedding dimensionality.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Configured provider identifier (as recorded in index descriptors).
    pub fn provider_name(&self) -> &str {
        &self.config.provider
    }

    /// Configured model identifier (as recorded in index descriptors).
    pub fn model_name(&self) -> &str {
        &self.config.model
    }

    /// Name of the provider currently answering requests.
    pub fn active_provider(&self) -> &str {
        self.chain.active_name()
    }

    /// Batch size the engine was configured with.
    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    /// Drain all accumulated degradation events (engine + chain).
    pub fn drain_degradation_events(&self) -> Vec<DegradationEvent> {
        let mut events = {
            let mut own = self.events.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *own)
        };
        events.extend(self.chain.drain_events());
        events
    }

    fn record(&self, event: DegradationEvent) {
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        events.push(event);
    }
}
