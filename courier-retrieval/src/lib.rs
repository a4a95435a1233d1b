//! # courier-retrieval
//!
//! The query engine: intent classification, hybrid retrieval, and context
//! formatting. Four strategies feed one ranked, deduplicated result list;
//! any failure inside the pipeline degrades to an empty context.
//!
//! ## Architecture
//!
//! ```text
//! RetrievalEngine
//! ├── intent::classify (keyword vocab + catalog-validated mentions)
//! ├── direct (exact event-code lookup, similarity 1.0)
//! ├── keyword (intent-driven branch ladder, first match wins)
//! ├── vector (flat index, 3× over-fetch, content-string dedup)
//! ├── diversity (per-code backfill up to 2× top_k)
//! └── context (fixed headers + diagnostics footer)
//! ```

pub mod context;
pub mod direct;
pub mod diversity;
pub mod engine;
pub mod intent;
pub mod keyword;

pub use context::format_context;
pub use engine::RetrievalEngine;
