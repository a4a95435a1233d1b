//! Configuration for the Courier engine.
//!
//! Each subsystem has its own `#[serde(default)]` struct; `CourierConfig`
//! aggregates them and can be loaded from a TOML string.

pub mod defaults;
mod embedding_config;
mod field_bindings;
mod index_config;
mod retrieval_config;

pub use embedding_config::EmbeddingConfig;
pub use field_bindings::FieldBindings;
pub use index_config::IndexConfig;
pub use retrieval_config::RetrievalConfig;

use serde::{Deserialize, Serialize};

/// Aggregate configuration for the whole engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CourierConfig {
    pub embedding: EmbeddingConfig,
    pub index: IndexConfig,
    pub retrieval: RetrievalConfig,
    pub fields: FieldBindings,
}

impl CourierConfig {
    /// Parse a configuration from a TOML string.
    ///
    /// Missing sections and fields fall back to defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}
