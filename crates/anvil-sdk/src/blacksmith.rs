//! The Blacksmith facade
//!
//! One entry point for the whole engine: `build_recipes` plans a staged
//! execution for the requested features, `forge` executes a plan against
//! its dataset and returns the enriched table. Recipes are immutable and
//! may be forged any number of times, in either execution mode, with
//! identical results.

use crate::config::ForgeConfig;
use crate::error::Result;
use anvil_core::{Dataset, Feature, Recipe, Table};
use anvil_runtime::Forge;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// High-level feature engine facade
pub struct Blacksmith {
    config: ForgeConfig,
    executor: Forge,
}

impl Blacksmith {
    /// Create a blacksmith with the default configuration
    pub fn new() -> Self {
        Self::with_config(ForgeConfig::default())
    }

    /// Create a blacksmith with an explicit configuration
    pub fn with_config(config: ForgeConfig) -> Self {
        let executor = Forge::with_workers(config.workers);
        Self { config, executor }
    }

    /// Current configuration
    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    /// Build execution plans for the requested features.
    ///
    /// Expands the transitive dependency closure, rejects cycles and
    /// output-name collisions, and partitions the closure into stages.
    /// `concurrent_paths` only affects how the plan is later scheduled,
    /// never its shape or its result.
    pub fn build_recipes(
        &self,
        dataset: Arc<dyn Dataset>,
        features: &[Arc<Feature>],
        concurrent_paths: bool,
    ) -> Result<Vec<Recipe>> {
        let recipes = anvil_graph::build_recipes(dataset, features, concurrent_paths)?;
        for recipe in &recipes {
            info!(
                requested = features.len(),
                nodes = recipe.feature_count(),
                stages = recipe.stage_count(),
                concurrent = concurrent_paths,
                "built recipe"
            );
        }
        Ok(recipes)
    }

    /// Execute a recipe and return the enriched table
    pub async fn forge(&self, recipe: &Recipe) -> Result<Table> {
        let started = Instant::now();
        let table = self.executor.forge(recipe).await?;
        debug!(
            columns = table.num_columns(),
            rows = table.num_rows(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "forged recipe"
        );
        Ok(table)
    }
}

impl Default for Blacksmith {
    fn default() -> Self {
        Self::new()
    }
}
