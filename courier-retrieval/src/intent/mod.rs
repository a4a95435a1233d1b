//! Query intent classification.

mod classifier;

pub use classifier::{classify, item_id_tokens, numeric_tokens};
