//! # courier-core
//!
//! Foundation crate for the Courier retrieval engine.
//! Defines the dataset model, document and catalog types, query intent,
//! retrieval results, configuration, errors, and shared traits.
//! Every other crate in the workspace depends on this.

pub mod catalog;
pub mod config;
pub mod dataset;
pub mod document;
pub mod errors;
pub mod intent;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use catalog::Catalog;
pub use config::CourierConfig;
pub use dataset::Dataset;
pub use document::{Document, DocumentKind};
pub use errors::{CourierError, CourierResult};
pub use intent::QueryIntent;
pub use models::{ContextSource, DegradationEvent, IndexDescriptor, RetrievedContext};
