//! Graph builder error types

use thiserror::Error;

/// Recipe building error
#[derive(Error, Debug)]
pub enum GraphError {
    /// The dependency relation contains a cycle
    #[error("Cyclic dependency detected: {}", path.join(" -> "))]
    CyclicDependency { path: Vec<String> },

    /// Two structurally distinct features declare the same output column
    #[error("Duplicate column name '{name}' declared by distinct features")]
    DuplicateColumn { name: String },
}

pub type Result<T> = std::result::Result<T, GraphError>;
