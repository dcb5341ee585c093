//! Recipe: the staged execution plan
//!
//! A recipe is produced by the dependency graph builder and consumed
//! read-only by the executor. It is immutable once built and may be forged
//! any number of times; cloning shares the underlying nodes and dataset.

use crate::dataset::Dataset;
use crate::feature::Feature;
use std::fmt;
use std::sync::Arc;

/// One dependency level: features with no edges among them, all of whose
/// dependencies live in earlier stages
#[derive(Clone)]
pub struct Stage {
    features: Vec<Arc<Feature>>,
}

impl Stage {
    pub fn new(features: Vec<Arc<Feature>>) -> Self {
        Self { features }
    }

    /// Stage members in deterministic tie-break order
    pub fn features(&self) -> &[Arc<Feature>] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.features.iter().map(|feature| feature.name()))
            .finish()
    }
}

/// Immutable, staged execution plan for a set of features
#[derive(Clone)]
pub struct Recipe {
    stages: Vec<Stage>,
    concurrent: bool,
    dataset: Arc<dyn Dataset>,
}

impl Recipe {
    pub fn new(stages: Vec<Stage>, concurrent: bool, dataset: Arc<dyn Dataset>) -> Self {
        Self {
            stages,
            concurrent,
            dataset,
        }
    }

    /// Stages in execution order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Whether the executor may fan stage members out onto workers
    pub fn is_concurrent(&self) -> bool {
        self.concurrent
    }

    /// The dataset this recipe was built against
    pub fn dataset(&self) -> &Arc<dyn Dataset> {
        &self.dataset
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Total number of feature nodes across all stages
    pub fn feature_count(&self) -> usize {
        self.stages.iter().map(Stage::len).sum()
    }
}

impl fmt::Debug for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recipe")
            .field("stages", &self.stages)
            .field("concurrent", &self.concurrent)
            .finish()
    }
}
