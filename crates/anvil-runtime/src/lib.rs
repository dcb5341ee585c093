//! Anvil Runtime - recipe execution
//!
//! Walks a staged recipe against its dataset, computing each stage's
//! features (sequentially or on a bounded worker pool) and merging their
//! columns into the output table at stage boundaries.

pub mod error;
pub mod executor;

pub use error::{ForgeError, Result};
pub use executor::Forge;
