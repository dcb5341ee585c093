//! Runtime error types

use anvil_core::{BoxError, CoreError};
use thiserror::Error;

/// Forge execution error
#[derive(Error, Debug)]
pub enum ForgeError {
    /// The dataset does not declare the requested entity type
    #[error("Unsupported entity type: {0}")]
    UnsupportedEntityType(String),

    /// Table-level failure (bad column, length mismatch) from the core layer
    #[error("Table error: {0}")]
    Table(CoreError),

    /// A compute step produced no column at all
    #[error("Feature '{feature}' did not populate its column")]
    MissingColumn { feature: String },

    /// A compute step left some record without a value
    #[error("Feature '{feature}' produced no value for row {row}")]
    MissingValue { feature: String, row: usize },

    /// A feature's compute function failed
    #[error("Feature '{feature}' failed to compute")]
    Compute {
        feature: String,
        #[source]
        source: BoxError,
    },

    /// A stage output could not be committed to the working table
    #[error("Merge failed for feature '{feature}': {message}")]
    Merge { feature: String, message: String },

    /// A worker task panicked or was cancelled
    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<CoreError> for ForgeError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnsupportedEntityType(name) => ForgeError::UnsupportedEntityType(name),
            other => ForgeError::Table(other),
        }
    }
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, ForgeError>;
