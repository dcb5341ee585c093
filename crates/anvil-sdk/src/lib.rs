//! Anvil SDK - high-level API for the Anvil feature engine
//!
//! The [`Blacksmith`] facade builds staged execution plans from requested
//! features and forges them against a dataset, producing an enriched table.

pub mod blacksmith;
pub mod config;
pub mod error;

// Re-export main types
pub use blacksmith::Blacksmith;
pub use config::ForgeConfig;
pub use error::{Result, SdkError};

// Re-export commonly used types from dependencies
pub use anvil_core::{
    BoxError, CoreError, Dataset, EntityType, EntityView, Feature, FeatureBuilder, Recipe, Row,
    Stage, Table, Value,
};
pub use anvil_graph::GraphError;
pub use anvil_runtime::{Forge, ForgeError};
