//! Arena-indexed dependency graph
//!
//! Nodes live in a flat arena and edges are integer indices, never owning
//! references, so shared dependencies (a DAG, not a tree) need no special
//! ownership handling. Nodes are deduplicated by feature identity: a feature
//! reachable through several downstream consumers appears exactly once.

use crate::error::{GraphError, Result};
use anvil_core::{Feature, Stage};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

pub(crate) struct Node {
    pub(crate) feature: Arc<Feature>,
    /// Arena indices of direct dependencies
    pub(crate) deps: Vec<usize>,
}

/// Transitive closure of a requested feature list
pub struct DependencyGraph {
    nodes: Vec<Node>,
    index: HashMap<u64, usize>,
}

impl std::fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("nodes", &self.nodes.len())
            .field(
                "features",
                &self
                    .nodes
                    .iter()
                    .map(|n| n.feature.name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    White,
    Gray,
    Black,
}

impl DependencyGraph {
    /// Collect the full closure reachable from `requested`, deduplicating by
    /// identity and rejecting output-name collisions.
    ///
    /// Dependencies are inserted before their dependents, so arena order is
    /// the deterministic discovery order used for intra-stage tie-breaks.
    pub fn from_features(requested: &[Arc<Feature>]) -> Result<Self> {
        let mut graph = Self {
            nodes: Vec::new(),
            index: HashMap::new(),
        };
        let mut by_name: HashMap<String, u64> = HashMap::new();
        for feature in requested {
            graph.add(feature, &mut by_name)?;
        }
        Ok(graph)
    }

    fn add(&mut self, feature: &Arc<Feature>, by_name: &mut HashMap<String, u64>) -> Result<usize> {
        if let Some(&idx) = self.index.get(&feature.identity()) {
            return Ok(idx);
        }

        match by_name.get(feature.name()) {
            Some(&identity) if identity != feature.identity() => {
                return Err(GraphError::DuplicateColumn {
                    name: feature.name().to_string(),
                });
            }
            Some(_) => {}
            None => {
                by_name.insert(feature.name().to_string(), feature.identity());
            }
        }

        let mut deps = Vec::with_capacity(feature.dependencies().len());
        for dep in feature.dependencies() {
            deps.push(self.add(dep, by_name)?);
        }

        let idx = self.nodes.len();
        self.nodes.push(Node {
            feature: Arc::clone(feature),
            deps,
        });
        self.index.insert(feature.identity(), idx);
        Ok(idx)
    }

    /// Number of nodes in the closure
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether a feature with this identity is part of the closure
    pub fn contains(&self, feature: &Feature) -> bool {
        self.index.contains_key(&feature.identity())
    }

    /// Partition the closure into stages by topological depth.
    ///
    /// Depth is `1 + max(dep depths)`, `0` for leaves, which yields the
    /// minimal stage count consistent with the dependency order. Members of
    /// one stage are ordered by arena index. A cycle in the adjacency is
    /// reported with its path.
    pub fn stages(&self) -> Result<Vec<Stage>> {
        let mut marks = vec![Mark::White; self.nodes.len()];
        let mut depths = vec![0usize; self.nodes.len()];
        let mut trail: Vec<usize> = Vec::new();

        for idx in 0..self.nodes.len() {
            self.assign_depth(idx, &mut marks, &mut depths, &mut trail)?;
        }

        let mut by_depth: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for idx in 0..self.nodes.len() {
            by_depth.entry(depths[idx]).or_default().push(idx);
        }

        Ok(by_depth
            .into_values()
            .map(|indices| {
                Stage::new(
                    indices
                        .into_iter()
                        .map(|idx| Arc::clone(&self.nodes[idx].feature))
                        .collect(),
                )
            })
            .collect())
    }

    fn assign_depth(
        &self,
        idx: usize,
        marks: &mut [Mark],
        depths: &mut [usize],
        trail: &mut Vec<usize>,
    ) -> Result<usize> {
        match marks[idx] {
            Mark::Black => return Ok(depths[idx]),
            Mark::Gray => {
                let start = trail.iter().position(|&i| i == idx).unwrap_or(0);
                let mut path: Vec<String> = trail[start..]
                    .iter()
                    .map(|&i| self.nodes[i].feature.name().to_string())
                    .collect();
                path.push(self.nodes[idx].feature.name().to_string());
                return Err(GraphError::CyclicDependency { path });
            }
            Mark::White => {}
        }

        marks[idx] = Mark::Gray;
        trail.push(idx);

        let mut depth = 0;
        for dep_pos in 0..self.nodes[idx].deps.len() {
            let dep = self.nodes[idx].deps[dep_pos];
            depth = depth.max(1 + self.assign_depth(dep, marks, depths, trail)?);
        }

        trail.pop();
        marks[idx] = Mark::Black;
        depths[idx] = depth;
        Ok(depth)
    }
}
