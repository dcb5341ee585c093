//! In-memory column-ordered table
//!
//! A `Table` is a set of equal-length named columns with a stable column
//! order. Feature computation reads rows as `Row` maps and the executor
//! appends computed columns; original columns are never rewritten.

use crate::error::{CoreError, Result};
use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single record, keyed by column name
pub type Row = HashMap<String, Value>;

/// Column-ordered table of values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Column names in display order
    names: Vec<String>,
    /// Column storage, keyed by name
    columns: HashMap<String, Vec<Value>>,
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from (name, values) pairs, preserving order
    pub fn from_columns(
        columns: impl IntoIterator<Item = (impl Into<String>, Vec<Value>)>,
    ) -> Result<Self> {
        let mut table = Self::new();
        for (name, values) in columns {
            table.push_column(name, values)?;
        }
        Ok(table)
    }

    /// Append a column. Fails if the name is taken or the length disagrees
    /// with the existing columns.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<()> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(CoreError::ColumnExists(name));
        }
        if !self.names.is_empty() && values.len() != self.num_rows() {
            return Err(CoreError::ColumnLengthMismatch {
                column: name,
                expected: self.num_rows(),
                actual: values.len(),
            });
        }
        self.names.push(name.clone());
        self.columns.insert(name, values);
        Ok(())
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    /// Whether a column with this name exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Column names in order
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.names
            .first()
            .and_then(|n| self.columns.get(n))
            .map(|c| c.len())
            .unwrap_or(0)
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.names.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// Single cell access
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        self.columns.get(column).and_then(|c| c.get(row))
    }

    /// Materialize one row as a map
    pub fn row(&self, index: usize) -> Option<Row> {
        if index >= self.num_rows() {
            return None;
        }
        let mut row = Row::with_capacity(self.names.len());
        for name in &self.names {
            row.insert(name.clone(), self.columns[name][index].clone());
        }
        Some(row)
    }

    /// Iterate over all rows
    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        (0..self.num_rows()).filter_map(move |i| self.row(i))
    }
}
