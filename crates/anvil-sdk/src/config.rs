//! Configuration types for the Blacksmith

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Forge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgeConfig {
    /// Worker-pool size for concurrent stage execution
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl ForgeConfig {
    /// Create a configuration sized to the available parallelism
    pub fn new() -> Self {
        Self {
            workers: default_workers(),
        }
    }

    /// Set the worker-pool size (minimum 1)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
