//! Recipe executor ("forge")
//!
//! Walks the stages of a recipe in order. Stage members are computed against
//! entity views resolved from the current working table, each worker filling
//! a private output buffer; once the whole stage has returned, the buffers
//! are committed to the working table in stage member order. The stage
//! boundary is the only synchronization point: no compute step ever writes
//! to the shared table, and stage k+1 starts only after stage k has fully
//! committed.

use crate::error::{ForgeError, Result};
use anvil_core::{Dataset, EntityType, EntityView, Feature, Recipe, Stage, Table, Value};
use std::collections::{HashMap, VecDeque};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::debug;

/// Recipe executor with a bounded worker pool
pub struct Forge {
    workers: usize,
}

/// Private result buffer for one stage member
struct StageOutput {
    feature: Arc<Feature>,
    values: Vec<Value>,
    /// Join key name and per-view-row key values, for grouped views
    join: Option<(String, Vec<Value>)>,
}

impl Forge {
    /// Create an executor sized to the available parallelism
    pub fn new() -> Self {
        Self {
            workers: default_workers(),
        }
    }

    /// Create an executor with an explicit worker-pool size (minimum 1)
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Worker-pool size used for concurrent stages
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Execute a recipe, returning the enriched output table.
    ///
    /// The input table is never mutated; a fresh working table is enriched
    /// per call, so a recipe can be forged repeatedly with identical
    /// results. Any stage failure aborts the whole call and no partial
    /// table is returned.
    pub async fn forge(&self, recipe: &Recipe) -> Result<Table> {
        let started = Instant::now();
        let mut working = recipe.dataset().table().clone();

        for (stage_idx, stage) in recipe.stages().iter().enumerate() {
            let views = resolve_stage_views(recipe.dataset(), stage, &working)?;

            let outputs = if recipe.is_concurrent() && stage.len() > 1 {
                self.run_stage_concurrent(stage, &views).await?
            } else {
                run_stage_sequential(stage, &views)?
            };

            // Commit in stage member order, never completion order
            for output in outputs {
                merge_output(&mut working, output)?;
            }
            debug!(stage = stage_idx, features = stage.len(), "stage committed");
        }

        debug!(
            stages = recipe.stage_count(),
            features = recipe.feature_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "forge complete"
        );
        Ok(working)
    }

    async fn run_stage_concurrent(
        &self,
        stage: &Stage,
        views: &HashMap<EntityType, Arc<EntityView>>,
    ) -> Result<Vec<StageOutput>> {
        let mut join_set: JoinSet<(usize, Result<StageOutput>)> = JoinSet::new();
        let mut pending: VecDeque<(usize, Arc<Feature>, Arc<EntityView>)> = stage
            .features()
            .iter()
            .enumerate()
            .map(|(idx, feature)| {
                (
                    idx,
                    Arc::clone(feature),
                    Arc::clone(&views[feature.entity_type()]),
                )
            })
            .collect();
        let mut slots: Vec<Option<StageOutput>> = (0..stage.len()).map(|_| None).collect();

        // Keep at most `workers` tasks in flight
        for _ in 0..self.workers.min(stage.len()) {
            if let Some((idx, feature, view)) = pending.pop_front() {
                join_set.spawn(async move { (idx, compute_feature(&feature, &view)) });
            }
        }

        while let Some(joined) = join_set.join_next().await {
            let (idx, result) = match joined {
                Ok(completed) => completed,
                Err(join_err) => {
                    join_set.detach_all();
                    return Err(ForgeError::Join(join_err));
                }
            };
            match result {
                Ok(output) => {
                    slots[idx] = Some(output);
                    if let Some((next_idx, feature, view)) = pending.pop_front() {
                        join_set.spawn(async move { (next_idx, compute_feature(&feature, &view)) });
                    }
                }
                Err(err) => {
                    // Fail fast: stop dispatching, let started siblings
                    // finish detached, discard their results
                    join_set.detach_all();
                    return Err(err);
                }
            }
        }

        let mut outputs = Vec::with_capacity(slots.len());
        for (idx, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(output) => outputs.push(output),
                None => {
                    return Err(ForgeError::Merge {
                        feature: stage.features()[idx].name().to_string(),
                        message: "stage worker returned no output".to_string(),
                    });
                }
            }
        }
        Ok(outputs)
    }
}

impl Default for Forge {
    fn default() -> Self {
        Self::new()
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Resolve one view per distinct entity type in the stage, against the
/// current working table
fn resolve_stage_views(
    dataset: &Arc<dyn Dataset>,
    stage: &Stage,
    working: &Table,
) -> Result<HashMap<EntityType, Arc<EntityView>>> {
    let mut views = HashMap::new();
    for feature in stage.features() {
        if !views.contains_key(feature.entity_type()) {
            let view = dataset.resolve_view(feature.entity_type(), working)?;
            views.insert(feature.entity_type().clone(), Arc::new(view));
        }
    }
    Ok(views)
}

fn run_stage_sequential(
    stage: &Stage,
    views: &HashMap<EntityType, Arc<EntityView>>,
) -> Result<Vec<StageOutput>> {
    stage
        .features()
        .iter()
        .map(|feature| compute_feature(feature, &views[feature.entity_type()]))
        .collect()
}

/// Compute one feature against its resolved view.
///
/// Dispatch is by capability: the vectorized table function when the node
/// carries one, the per-record row function otherwise. Either path must
/// yield a value for every record of the view.
fn compute_feature(feature: &Arc<Feature>, view: &EntityView) -> Result<StageOutput> {
    let rows = view.table.num_rows();

    let values = if let Some(table_fn) = feature.table_fn() {
        let produced = table_fn(&view.table).map_err(|source| ForgeError::Compute {
            feature: feature.name().to_string(),
            source,
        })?;
        let column = produced
            .column(feature.name())
            .ok_or_else(|| ForgeError::MissingColumn {
                feature: feature.name().to_string(),
            })?;
        if column.len() != rows {
            return Err(ForgeError::Merge {
                feature: feature.name().to_string(),
                message: format!("produced {} values for {} records", column.len(), rows),
            });
        }
        column.to_vec()
    } else {
        let row_fn = feature.row_fn();
        let mut values = Vec::with_capacity(rows);
        for (idx, mut row) in view.table.rows().enumerate() {
            row_fn(&mut row).map_err(|source| ForgeError::Compute {
                feature: feature.name().to_string(),
                source,
            })?;
            let value = row
                .remove(feature.name())
                .ok_or_else(|| ForgeError::MissingValue {
                    feature: feature.name().to_string(),
                    row: idx,
                })?;
            values.push(value);
        }
        values
    };

    let join = match &view.join_key {
        Some(key) => {
            let keys = view
                .table
                .column(key)
                .ok_or_else(|| ForgeError::Merge {
                    feature: feature.name().to_string(),
                    message: format!("grouped view lost its join key column '{key}'"),
                })?
                .to_vec();
            Some((key.clone(), keys))
        }
        None => None,
    };

    Ok(StageOutput {
        feature: Arc::clone(feature),
        values,
        join,
    })
}

/// Commit one stage output into the working table.
///
/// Row-granularity outputs append positionally; grouped outputs broadcast
/// onto canonical rows through the view's join key.
fn merge_output(working: &mut Table, output: StageOutput) -> Result<()> {
    let name = output.feature.name().to_string();
    match output.join {
        None => {
            if output.values.len() != working.num_rows() {
                return Err(ForgeError::Merge {
                    feature: name,
                    message: format!(
                        "produced {} values for {} rows",
                        output.values.len(),
                        working.num_rows()
                    ),
                });
            }
            working.push_column(name, output.values)?;
        }
        Some((key, keys)) => {
            if keys.len() != output.values.len() {
                return Err(ForgeError::Merge {
                    feature: name,
                    message: format!(
                        "{} group keys for {} values",
                        keys.len(),
                        output.values.len()
                    ),
                });
            }
            let lookup: HashMap<String, Value> = keys
                .iter()
                .map(Value::lookup_key)
                .zip(output.values)
                .collect();
            let canonical = working
                .column(&key)
                .ok_or_else(|| ForgeError::Merge {
                    feature: name.clone(),
                    message: format!("canonical table has no join key column '{key}'"),
                })?;
            let broadcast = canonical
                .iter()
                .map(|row_key| {
                    lookup
                        .get(&row_key.lookup_key())
                        .cloned()
                        .ok_or_else(|| ForgeError::Merge {
                            feature: name.clone(),
                            message: format!("no group value for key {}", row_key.lookup_key()),
                        })
                })
                .collect::<Result<Vec<Value>>>()?;
            working.push_column(name, broadcast)?;
        }
    }
    Ok(())
}
