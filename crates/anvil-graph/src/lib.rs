//! Anvil Graph - dependency resolution and recipe planning
//!
//! Expands a requested feature list into its transitive dependency closure,
//! detects cycles and output-name collisions, and partitions the closure
//! into a deterministic staged execution plan (a [`anvil_core::Recipe`]).

pub mod builder;
pub mod error;
pub mod graph;

pub use builder::build_recipes;
pub use error::GraphError;
pub use graph::DependencyGraph;
