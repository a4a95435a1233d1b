//! Local hashed term-frequency embedding provider.
//!
//! Produces deterministic dense vectors via the hashing trick: terms are
//! hashed into fixed-dimension buckets with a hash-derived sign, weighted by
//! term frequency, then L2-normalized. Not as semantically rich as a neural
//! model, but always available and fully offline.

use std::collections::HashMap;

use courier_core::errors::CourierResult;
use courier_core::traits::IEmbeddingProvider;

use courier_core::config::defaults::DEFAULT_LOCAL_DIMENSIONS;

/// Local embedding provider; the universal fallback of every chain.
pub struct HashedTfProvider {
    dimensions: usize,
}

impl HashedTfProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// Build a provider from a local model identifier of the form
    /// `hashed-tf-<dims>`. Unparsable identifiers use the default dimensions.
    pub fn from_model_name(model: &str) -> Self {
        let dimensions = model
            .rsplit('-')
            .next()
            .and_then(|d| d.parse::<usize>().ok())
            .filter(|d| *d > 0)
            .unwrap_or(DEFAULT_LOCAL_DIMENSIONS);
        Self::new(dimensions)
    }

    /// FNV-1a hash of a term.
    fn hash_term(term: &str) -> u64 {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= u64::from(*b);
            h = h.wrapping_mul(0x100000001b3);
        }
        h
    }

    /// Lowercase alphanumeric terms, single characters dropped.
    fn tokenize(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|s| s.len() >= 2)
            .map(str::to_lowercase)
            .collect()
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let tokens = Self::tokenize(text);
        let mut vector = vec![0.0f32; self.dimensions];
        if tokens.is_empty() {
            return vector;
        }

        let mut counts: HashMap<&str, f32> = HashMap::new();
        for token in &tokens {
            *counts.entry(token.as_str()).or_default() += 1.0;
        }

        let total = tokens.len() as f32;
        for (term, count) in &counts {
            let h = Self::hash_term(term);
            let bucket = (h as usize) % self.dimensions;
            // Sign bit from the hash keeps colliding terms from always
            // reinforcing each other.
            let sign = if h & 1 == 0 { 1.0 } else { -1.0 };
            let weight = (count / total) * (1.0 + (term.len() as f32).ln());
            vector[bucket] += sign * weight;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vector {
                *v /= norm;
            }
        }

        vector
    }
}

impl IEmbeddingProvider for HashedTfProvider {
    fn embed(&self, text: &str) -> CourierResult<Vec<f32>> {
        Ok(self.vectorize(text))
    }

    fn embed_batch(&self, texts: &[String]) -> CourierResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hashed-tf"
    }

    fn is_available(&self) -> bool {
        true
    }
}
