//! Fallback chain for embedding generation.
//!
//! Providers are tried in priority order; every fallback is recorded as a
//! degradation event. The chain itself can still fail when every provider
//! does; converting that into a zero-vector is the engine's job.

use std::sync::Mutex;

use courier_core::errors::{CourierResult, EmbeddingError};
use courier_core::models::DegradationEvent;
use courier_core::traits::IEmbeddingProvider;
use tracing::warn;

/// Ordered provider chain with drainable degradation events.
pub struct FallbackChain {
    providers: Vec<Box<dyn IEmbeddingProvider>>,
    events: Mutex<Vec<DegradationEvent>>,
}

impl Default for FallbackChain {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackChain {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Append a provider to the end of the chain.
    pub fn push(&mut self, provider: Box<dyn IEmbeddingProvider>) {
        self.providers.push(provider);
    }

    /// Dimensions of the first provider (the chain's declared dimensions).
    pub fn dimensions(&self) -> usize {
        self.providers.first().map_or(0, |p| p.dimensions())
    }

    /// Name of the first currently-available provider.
    pub fn active_name(&self) -> &str {
        self.providers
            .iter()
            .find(|p| p.is_available())
            .map(|p| p.name())
            .unwrap_or("none")
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Embed one text through the chain.
    pub fn embed(&self, text: &str) -> CourierResult<Vec<f32>> {
        self.run(|p| p.embed(text))
    }

    /// Embed a batch through the chain in one provider call.
    pub fn embed_batch(&self, texts: &[String]) -> CourierResult<Vec<Vec<f32>>> {
        self.run(|p| p.embed_batch(texts))
    }

    fn run<T>(
        &self,
        op: impl Fn(&dyn IEmbeddingProvider) -> CourierResult<T>,
    ) -> CourierResult<T> {
        let mut last_error = None;

        for (i, provider) in self.providers.iter().enumerate() {
            if !provider.is_available() {
                continue;
            }
            match op(provider.as_ref()) {
                Ok(result) => {
                    if i > 0 {
                        let primary = self
                            .providers
                            .first()
                            .map(|p| p.name().to_string())
                            .unwrap_or_default();
                        self.record(DegradationEvent::now(
                            "embeddings",
                            format!("{primary} failed or unavailable"),
                            provider.name(),
                        ));
                    }
                    return Ok(result);
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "provider failed, trying next in chain"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            EmbeddingError::ProviderUnavailable {
                provider: "all providers exhausted".to_string(),
            }
            .into()
        }))
    }

    fn record(&self, event: DegradationEvent) {
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        events.push(event);
    }

    /// Drain accumulated degradation events.
    pub fn drain_events(&self) -> Vec<DegradationEvent> {
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A provider that always fails.
    struct FailingProvider;
    impl IEmbeddingProvider for FailingProvider {
        fn embed(&self, _text: &str) -> CourierResult<Vec<f32>> {
            Err(EmbeddingError::InferenceFailed {
                reason: "mock failure".to_string(),
            }
            .into())
        }
        fn embed_batch(&self, _texts: &[String]) -> CourierResult<Vec<Vec<f32>>> {
            Err(EmbeddingError::InferenceFailed {
                reason: "mock failure".to_string(),
            }
            .into())
        }
        fn dimensions(&self) -> usize {
            64
        }
        fn name(&self) -> &str {
            "failing-mock"
        }
        fn is_available(&self) -> bool {
            true
        }
    }

    /// A provider that always succeeds with ones.
    struct OnesProvider {
        dims: usize,
    }
    impl IEmbeddingProvider for OnesProvider {
        fn embed(&self, _text: &str) -> CourierResult<Vec<f32>> {
            Ok(vec![1.0; self.dims])
        }
        fn embed_batch(&self, texts: &[String]) -> CourierResult<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0; self.dims]).collect())
        }
        fn dimensions(&self) -> usize {
            self.dims
        }
        fn name(&self) -> &str {
            "ones-mock"
        }
        fn is_available(&self) -> bool {
            true
        }
    }

    #[test]
    fn primary_success_records_no_event() {
        let mut chain = FallbackChain::new();
        chain.push(Box::new(OnesProvider { dims: 8 }));
        chain.push(Box::new(FailingProvider));

        let vector = chain.embed("test").unwrap();
        assert_eq!(vector.len(), 8);
        assert!(chain.drain_events().is_empty());
    }

    #[test]
    fn fallback_records_degradation() {
        let mut chain = FallbackChain::new();
        chain.push(Box::new(FailingProvider));
        chain.push(Box::new(OnesProvider { dims: 16 }));

        let vector = chain.embed("test").unwrap();
        assert_eq!(vector.len(), 16);

        let events = chain.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].fallback_used, "ones-mock");
        assert_eq!(events[0].component, "embeddings");
        // Drained once; nothing left.
        assert!(chain.drain_events().is_empty());
    }

    #[test]
    fn all_failing_is_an_error() {
        let mut chain = FallbackChain::new();
        chain.push(Box::new(FailingProvider));
        chain.push(Box::new(FailingProvider));
        assert!(chain.embed("test").is_err());
    }

    #[test]
    fn batch_falls_back_too() {
        let mut chain = FallbackChain::new();
        chain.push(Box::new(FailingProvider));
        chain.push(Box::new(OnesProvider { dims: 4 }));

        let texts = vec!["a".to_string(), "b".to_string()];
        let vectors = chain.embed_batch(&texts).unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(chain.drain_events().len(), 1);
    }

    #[test]
    fn empty_chain_is_an_error() {
        let chain = FallbackChain::new();
        assert!(chain.is_empty());
        assert!(chain.embed("test").is_err());
        assert_eq!(chain.active_name(), "none");
    }
}
