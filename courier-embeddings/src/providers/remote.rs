//! Remote embedding providers over HTTP.
//!
//! One blocking client per provider with a bounded timeout and bounded
//! retries with backoff. A provider that exhausts its retries marks itself
//! unavailable so the fallback chain stops trying it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use courier_core::errors::{CourierError, CourierResult, EmbeddingError};
use courier_core::traits::IEmbeddingProvider;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Supported remote embedding APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteModel {
    /// OpenAI text-embedding-3-small.
    OpenAiSmall,
    /// Together AI m2-bert retrieval model.
    TogetherM2Bert,
    /// HuggingFace Inference API feature extraction.
    HuggingFaceFeatureExtraction,
}

impl RemoteModel {
    pub fn default_dimensions(&self) -> usize {
        match self {
            Self::OpenAiSmall => 1536,
            Self::TogetherM2Bert => 1024,
            Self::HuggingFaceFeatureExtraction => 768,
        }
    }

    pub fn default_model_name(&self) -> &'static str {
        match self {
            Self::OpenAiSmall => "text-embedding-3-small",
            Self::TogetherM2Bert => "togethercomputer/m2-bert-80M-8k-retrieval",
            Self::HuggingFaceFeatureExtraction => "sentence-transformers/all-mpnet-base-v2",
        }
    }

    /// Environment variable the credential store is queried with.
    pub fn credential_name(&self) -> &'static str {
        match self {
            Self::OpenAiSmall => "OPENAI_API_KEY",
            Self::TogetherM2Bert => "TOGETHER_API_KEY",
            Self::HuggingFaceFeatureExtraction => "HUGGINGFACE_API_KEY",
        }
    }

    fn endpoint(&self, model_name: &str) -> String {
        match self {
            Self::OpenAiSmall => "https://api.openai.com/v1/embeddings".to_string(),
            Self::TogetherM2Bert => "https://api.together.xyz/v1/embeddings".to_string(),
            Self::HuggingFaceFeatureExtraction => format!(
                "https://api-inference.huggingface.co/pipeline/feature-extraction/{model_name}"
            ),
        }
    }
}

#[derive(Serialize)]
struct OpenAiStyleRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a str,
    options: FeatureExtractionOptions,
}

#[derive(Serialize)]
struct FeatureExtractionOptions {
    wait_for_model: bool,
}

/// Remote embedding provider with timeout, retry, and an availability latch.
pub struct RemoteProvider {
    model: RemoteModel,
    model_name: String,
    api_key: String,
    endpoint: String,
    dimensions: usize,
    client: reqwest::blocking::Client,
    available: AtomicBool,
    max_retries: u32,
}

impl RemoteProvider {
    pub fn new(
        model: RemoteModel,
        model_name: String,
        api_key: String,
        dimensions: Option<usize>,
        timeout_secs: u64,
        max_retries: u32,
    ) -> CourierResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("http client build failed: {e}"),
            })?;

        Ok(Self {
            endpoint: model.endpoint(&model_name),
            dimensions: dimensions.unwrap_or_else(|| model.default_dimensions()),
            model,
            model_name,
            api_key,
            client,
            available: AtomicBool::new(true),
            max_retries,
        })
    }

    /// Reset the availability latch, e.g. after a configuration change.
    pub fn reset_availability(&self) {
        self.available.store(true, Ordering::Relaxed);
    }

    fn request_embedding(&self, text: &str) -> CourierResult<Vec<f32>> {
        if !self.available.load(Ordering::Relaxed) {
            return Err(EmbeddingError::ProviderUnavailable {
                provider: self.name().to_string(),
            }
            .into());
        }

        let mut last_err: Option<CourierError> = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(100 * 2u64.pow(attempt - 1));
                std::thread::sleep(delay);
                debug!(attempt, provider = self.name(), "retrying embedding request");
            }

            match self.send_request(text) {
                Ok(vector) => return Ok(vector),
                Err(e) => {
                    warn!(
                        attempt,
                        provider = self.name(),
                        error = %e,
                        "remote embedding request failed"
                    );
                    last_err = Some(e);
                }
            }
        }

        self.available.store(false, Ordering::Relaxed);
        Err(last_err.unwrap_or_else(|| {
            EmbeddingError::InferenceFailed {
                reason: "all retries exhausted".to_string(),
            }
            .into()
        }))
    }

    fn send_request(&self, text: &str) -> CourierResult<Vec<f32>> {
        let request = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");

        let request = match self.model {
            RemoteModel::HuggingFaceFeatureExtraction => {
                request.json(&FeatureExtractionRequest {
                    inputs: text,
                    options: FeatureExtractionOptions {
                        wait_for_model: true,
                    },
                })
            }
            _ => request.json(&OpenAiStyleRequest {
                model: &self.model_name,
                input: text,
            }),
        };

        let response = request
            .send()
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("http error: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(EmbeddingError::InferenceFailed {
                reason: format!("api returned {status}: {body}"),
            }
            .into());
        }

        let body: Value = response
            .json()
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("json parse error: {e}"),
            })?;

        self.parse_embedding(&body)
    }

    fn parse_embedding(&self, body: &Value) -> CourierResult<Vec<f32>> {
        let vector = match self.model {
            // Feature-extraction responses are either a flat vector or a
            // list with the sentence vector nested one level deep.
            RemoteModel::HuggingFaceFeatureExtraction => match body {
                Value::Array(items) if items.first().is_some_and(Value::is_array) => {
                    items.first().and_then(json_vector)
                }
                Value::Array(_) => json_vector(body),
                _ => None,
            },
            // OpenAI-style: { "data": [ { "embedding": [...] } ] }.
            _ => body.pointer("/data/0/embedding").and_then(json_vector),
        };

        let vector = vector.ok_or_else(|| EmbeddingError::InferenceFailed {
            reason: "malformed embedding payload".to_string(),
        })?;

        if vector.len() != self.dimensions {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            }
            .into());
        }
        Ok(vector)
    }
}

/// Extract a float vector from a JSON array.
fn json_vector(value: &Value) -> Option<Vec<f32>> {
    value.as_array().map(|items| {
        items
            .iter()
            .filter_map(Value::as_f64)
            .map(|f| f as f32)
            .collect()
    })
}

impl IEmbeddingProvider for RemoteProvider {
    fn embed(&self, text: &str) -> CourierResult<Vec<f32>> {
        self.request_embedding(text)
    }

    fn embed_batch(&self, texts: &[String]) -> CourierResult<Vec<Vec<f32>>> {
        // Remote calls go one item at a time; the engine's batch loop relies
        // on this so a single failing item cannot abort a whole batch.
        texts.iter().map(|t| self.request_embedding(t)).collect()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        self.model.default_model_name()
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }
}
