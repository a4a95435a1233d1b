//! Error taxonomy for the Courier engine.
//!
//! One thiserror enum per subsystem, unified under `CourierError`. Public
//! engine boundaries degrade instead of failing (zero-vectors, boolean build
//! results, empty contexts); these types cover the fallible paths inside.

mod dataset_error;
mod embedding_error;
mod index_error;
mod retrieval_error;

pub use dataset_error::DatasetError;
pub use embedding_error::EmbeddingError;
pub use index_error::IndexError;
pub use retrieval_error::RetrievalError;

/// Unified error type for the whole workspace.
#[derive(Debug, thiserror::Error)]
pub enum CourierError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result alias used across the workspace.
pub type CourierResult<T> = Result<T, CourierError>;
