//! Provider construction and credential-driven downgrade.
//!
//! A remote backend whose credential is absent silently downgrades to the
//! local embedder with a warning; misconfiguration is never an error.

pub mod hashed_tf;
pub mod remote;

pub use hashed_tf::HashedTfProvider;
pub use remote::{RemoteModel, RemoteProvider};

use courier_core::config::EmbeddingConfig;
use courier_core::traits::IEmbeddingProvider;
use tracing::{info, warn};

/// Credential lookup boundary: the store supplies API keys by name.
pub trait CredentialStore {
    fn get(&self, name: &str) -> Option<String>;
}

/// Credential store backed by process environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialStore for EnvCredentials {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }
}

/// Credential store with no keys at all; forces the local provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialStore for NoCredentials {
    fn get(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Outcome of provider construction.
pub struct ProviderSelection {
    pub provider: Box<dyn IEmbeddingProvider>,
    /// Whether the selected provider runs fully locally.
    pub is_local: bool,
    /// Set when the requested backend was downgraded to local.
    pub downgraded_from: Option<String>,
}

/// Build the configured provider, downgrading to local when the requested
/// remote backend cannot be used.
pub fn create_provider(
    config: &EmbeddingConfig,
    credentials: &dyn CredentialStore,
) -> ProviderSelection {
    match config.provider.as_str() {
        "openai" => remote_or_local(RemoteModel::OpenAiSmall, config, credentials),
        "together" => remote_or_local(RemoteModel::TogetherM2Bert, config, credentials),
        "huggingface" => {
            remote_or_local(RemoteModel::HuggingFaceFeatureExtraction, config, credentials)
        }
        "local" => {
            info!(provider = "local", "using local hashed-tf embedding provider");
            ProviderSelection {
                provider: local_provider(config),
                is_local: true,
                downgraded_from: None,
            }
        }
        other => {
            warn!(provider = other, "unknown embedding provider, using local");
            ProviderSelection {
                provider: local_provider(config),
                is_local: true,
                downgraded_from: Some(other.to_string()),
            }
        }
    }
}

fn remote_or_local(
    model: RemoteModel,
    config: &EmbeddingConfig,
    credentials: &dyn CredentialStore,
) -> ProviderSelection {
    let credential_name = model.credential_name();
    let api_key = match credentials.get(credential_name) {
        Some(key) => key,
        None => {
            warn!(
                provider = config.provider.as_str(),
                credential = credential_name,
                "credential not found, falling back to local embeddings"
            );
            return ProviderSelection {
                provider: local_provider(config),
                is_local: true,
                downgraded_from: Some(config.provider.clone()),
            };
        }
    };

    // The hashed-tf family names the local embedder; a remote backend left
    // with that model setting gets its own default instead.
    let model_name = if config.model.is_empty() || config.model.starts_with("hashed-tf") {
        model.default_model_name().to_string()
    } else {
        config.model.clone()
    };

    match RemoteProvider::new(
        model,
        model_name,
        api_key,
        config.dimensions,
        config.timeout_secs,
        config.max_retries,
    ) {
        Ok(provider) => {
            info!(
                provider = config.provider.as_str(),
                model = provider.name(),
                dims = provider.dimensions(),
                "remote embedding provider configured"
            );
            ProviderSelection {
                provider: Box::new(provider),
                is_local: false,
                downgraded_from: None,
            }
        }
        Err(e) => {
            warn!(error = %e, "remote provider setup failed, falling back to local");
            ProviderSelection {
                provider: local_provider(config),
                is_local: true,
                downgraded_from: Some(config.provider.clone()),
            }
        }
    }
}

fn local_provider(config: &EmbeddingConfig) -> Box<dyn IEmbeddingProvider> {
    let provider = match config.dimensions {
        Some(dims) => HashedTfProvider::new(dims),
        None => HashedTfProvider::from_model_name(&config.model),
    };
    Box::new(provider)
}

/// Recommended local model identifiers, smallest first.
pub fn recommended_local_models() -> &'static [&'static str] {
    &[
        "hashed-tf-256",
        "hashed-tf-384",
        "hashed-tf-512",
        "hashed-tf-768",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedCredentials;
    impl CredentialStore for FixedCredentials {
        fn get(&self, _name: &str) -> Option<String> {
            Some("key".to_string())
        }
    }

    fn config(provider: &str) -> EmbeddingConfig {
        EmbeddingConfig {
            provider: provider.to_string(),
            model: String::new(),
            ..EmbeddingConfig::default()
        }
    }

    #[test]
    fn missing_credential_downgrades_to_local() {
        let selection = create_provider(&config("openai"), &NoCredentials);
        assert!(selection.is_local);
        assert_eq!(selection.downgraded_from.as_deref(), Some("openai"));
        assert_eq!(selection.provider.name(), "hashed-tf");
    }

    #[test]
    fn present_credential_selects_remote() {
        let selection = create_provider(&config("together"), &FixedCredentials);
        assert!(!selection.is_local);
        assert!(selection.downgraded_from.is_none());
        assert_eq!(selection.provider.dimensions(), 1024);
    }

    #[test]
    fn local_provider_never_downgrades() {
        let selection = create_provider(&config("local"), &NoCredentials);
        assert!(selection.is_local);
        assert!(selection.downgraded_from.is_none());
    }

    #[test]
    fn unknown_provider_downgrades_with_note() {
        let selection = create_provider(&config("mystery"), &FixedCredentials);
        assert!(selection.is_local);
        assert_eq!(selection.downgraded_from.as_deref(), Some("mystery"));
    }

    #[test]
    fn dimension_override_applies_to_local() {
        let mut cfg = config("local");
        cfg.dimensions = Some(64);
        let selection = create_provider(&cfg, &NoCredentials);
        assert_eq!(selection.provider.dimensions(), 64);
    }
}
