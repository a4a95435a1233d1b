//! # courier-index
//!
//! Turns a tabular dataset into indexed document views and maintains one
//! persisted similarity index per dataset.
//!
//! ## Architecture
//!
//! ```text
//! IndexStore
//! ├── DocumentBuilder (rows, code summaries, establishment summaries, overview)
//! ├── EmbeddingEngine (courier-embeddings, chunked batches)
//! ├── FlatIpIndex (inner product over L2-normalized vectors)
//! └── Persistence (index.json + documents.json + descriptor.json, rename-atomic)
//! ```

pub mod builder;
pub mod flat;
pub mod store;

pub use builder::DocumentBuilder;
pub use flat::FlatIpIndex;
pub use store::{DatasetIndex, IndexStore};
