//! # courier-embeddings
//!
//! Multi-provider embedding generation for the Courier retrieval engine.
//! A remote backend (OpenAI, Together, HuggingFace) falls back to the local
//! hashed term-frequency embedder; total failure degrades to zero-vectors.
//! Nothing at this crate's public boundary ever returns an error.
//!
//! ## Architecture
//!
//! ```text
//! EmbeddingEngine
//! ├── FallbackChain (primary → local)
//! │   ├── RemoteProvider (openai | together | huggingface)
//! │   └── HashedTfProvider (local, always available)
//! ├── EmbeddingCache (moka, injected, keyed by provider+model+text)
//! └── DegradationEvent accumulation (drainable)
//! ```

pub mod cache;
pub mod chain;
pub mod engine;
pub mod providers;

pub use cache::EmbeddingCache;
pub use chain::FallbackChain;
pub use engine::EmbeddingEngine;
pub use providers::{
    CredentialStore, EnvCredentials, HashedTfProvider, NoCredentials, RemoteModel, RemoteProvider,
};
