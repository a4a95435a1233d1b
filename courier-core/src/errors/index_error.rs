/// Similarity-index subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("vector has {actual} dimensions, index expects {expected}")]
    VectorDimension { expected: usize, actual: usize },

    #[error("query has {actual} dimensions, index expects {expected}")]
    QueryDimension { expected: usize, actual: usize },

    #[error("persisted artifacts for dataset {dataset_id} are inconsistent: {reason}")]
    CorruptArtifacts { dataset_id: String, reason: String },
}
