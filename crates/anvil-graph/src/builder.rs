//! Recipe building
//!
//! `build_recipes` is the planner entry point: it expands the requested
//! features into their transitive closure and partitions the closure into a
//! staged, deterministic execution plan. The `concurrent` flag is recorded
//! on the recipe for the executor; it never changes the stage partition, so
//! both execution modes share one plan shape and one result.

use crate::error::Result;
use crate::graph::DependencyGraph;
use anvil_core::{Dataset, Feature, Recipe};
use std::sync::Arc;

/// Build execution plans for the requested features.
///
/// Returns one recipe per invocation; the sequence-returning contract keeps
/// batch building possible without changing the per-batch algorithm. Cycle
/// and name-collision errors abort the whole build; no partial recipe is
/// returned.
pub fn build_recipes(
    dataset: Arc<dyn Dataset>,
    features: &[Arc<Feature>],
    concurrent: bool,
) -> Result<Vec<Recipe>> {
    let graph = DependencyGraph::from_features(features)?;
    let stages = graph.stages()?;
    Ok(vec![Recipe::new(stages, concurrent, dataset)])
}
