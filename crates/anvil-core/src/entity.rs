//! Entity types and scope views
//!
//! An `EntityType` names the granularity a feature is computed against; an
//! `EntityView` is the concrete table projection for that granularity,
//! resolved from the working table by the dataset collaborator.

use crate::error::{CoreError, Result};
use crate::types::{Table, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Reference to an entity granularity supported by a dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityType(String);

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The table projection a feature computes against.
///
/// `join_key = None` means the view is at canonical row granularity and
/// computed columns merge back positionally. `join_key = Some(key)` means the
/// view is grouped: each view row stands for all canonical rows sharing the
/// same value in the `key` column, and computed columns broadcast back
/// through that key.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityView {
    pub table: Table,
    pub join_key: Option<String>,
}

impl EntityView {
    /// Canonical row-level view
    pub fn rows(table: Table) -> Self {
        Self {
            table,
            join_key: None,
        }
    }

    /// Grouped view over an already-grouped table; `key` must be one of its
    /// columns.
    pub fn grouped(table: Table, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if !table.has_column(&key) {
            return Err(CoreError::ColumnNotFound(key));
        }
        Ok(Self {
            table,
            join_key: Some(key),
        })
    }

    /// Build a grouped view with one row per distinct value of `key`,
    /// keeping the first occurrence of every other column.
    ///
    /// Datasets needing real aggregates build their own grouped table and
    /// wrap it with [`EntityView::grouped`].
    pub fn group_first_by(table: &Table, key: &str) -> Result<Self> {
        let keys = table
            .column(key)
            .ok_or_else(|| CoreError::ColumnNotFound(key.to_string()))?;

        let mut seen = HashSet::new();
        let mut picked = Vec::new();
        for (i, k) in keys.iter().enumerate() {
            if seen.insert(k.lookup_key()) {
                picked.push(i);
            }
        }

        let mut grouped = Table::new();
        for name in table.column_names() {
            let source = table
                .column(name)
                .ok_or_else(|| CoreError::ColumnNotFound(name.clone()))?;
            let values: Vec<Value> = picked.iter().map(|&i| source[i].clone()).collect();
            grouped.push_column(name.clone(), values)?;
        }
        Self::grouped(grouped, key)
    }
}
