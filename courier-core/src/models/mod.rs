//! Shared model types crossing crate boundaries.

mod degradation_event;
mod index_descriptor;
mod retrieved_context;

pub use degradation_event::DegradationEvent;
pub use index_descriptor::IndexDescriptor;
pub use retrieved_context::{ContextSource, RetrievedContext};
