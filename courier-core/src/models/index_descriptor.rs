use serde::{Deserialize, Serialize};

/// Descriptor persisted beside an index: which configuration built it.
///
/// A cached index is only valid for the (provider, model, dimension) it was
/// built with; a loaded descriptor whose dimension differs from the active
/// provider's forces a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub provider: String,
    pub model: String,
    pub dimension: usize,
    pub document_count: usize,
}
