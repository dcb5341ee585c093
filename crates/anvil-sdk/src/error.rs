//! SDK error types

use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Recipe building error
    #[error("Graph error: {0}")]
    Graph(#[from] anvil_graph::GraphError),

    /// Recipe execution error
    #[error("Forge error: {0}")]
    Forge(#[from] anvil_runtime::ForgeError),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
