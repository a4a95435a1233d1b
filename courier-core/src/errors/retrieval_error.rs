/// Retrieval subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("no index available: build an index before retrieving")]
    IndexNotBuilt,
}
