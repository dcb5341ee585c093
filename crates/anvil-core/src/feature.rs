//! Feature nodes
//!
//! A `Feature` is an immutable description of one derived column: its name,
//! the features it depends on, and its compute capability. Capability is
//! carried as attached functions (a required row-level function, an optional
//! table-level one) rather than a type hierarchy, so externally supplied
//! closures and pre-packaged constructors go through the same dispatch.

use crate::entity::EntityType;
use crate::error::{CoreError, Result};
use crate::types::{Row, Table};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Boxed error type returned by user-supplied compute functions
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Row-level compute: populate the feature's column entry on one record
pub type RowFn = Arc<dyn Fn(&mut Row) -> std::result::Result<(), BoxError> + Send + Sync>;

/// Table-level compute: return the view with the feature's column populated
pub type TableFn = Arc<dyn Fn(&Table) -> std::result::Result<Table, BoxError> + Send + Sync>;

/// Immutable description of one derived column
pub struct Feature {
    name: String,
    description: String,
    entity_type: EntityType,
    dependencies: Vec<Arc<Feature>>,
    row_fn: RowFn,
    table_fn: Option<TableFn>,
    /// Content hash over (name, entity type, dependency identities, compute
    /// function identities), fixed at build time
    identity: u64,
}

impl Feature {
    /// Start building a feature for the given output column and entity type
    pub fn builder(name: impl Into<String>, entity_type: EntityType) -> FeatureBuilder {
        FeatureBuilder {
            name: name.into(),
            description: String::new(),
            entity_type,
            dependencies: Vec::new(),
            row_fn: None,
            table_fn: None,
        }
    }

    /// Output column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Entity granularity this feature computes against
    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    /// Direct dependencies, in declaration order
    pub fn dependencies(&self) -> &[Arc<Feature>] {
        &self.dependencies
    }

    /// Row-level compute function
    pub fn row_fn(&self) -> &RowFn {
        &self.row_fn
    }

    /// Table-level compute function, when the feature carries one
    pub fn table_fn(&self) -> Option<&TableFn> {
        self.table_fn.as_ref()
    }

    /// Whether the vectorized path is available
    pub fn has_table_fn(&self) -> bool {
        self.table_fn.is_some()
    }

    /// Structural identity of this node
    pub fn identity(&self) -> u64 {
        self.identity
    }

    fn compute_identity(
        name: &str,
        entity_type: &EntityType,
        dependencies: &[Arc<Feature>],
        row_fn: &RowFn,
        table_fn: Option<&TableFn>,
    ) -> u64 {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        entity_type.name().hash(&mut hasher);
        for dep in dependencies {
            dep.identity().hash(&mut hasher);
        }
        (Arc::as_ptr(row_fn) as *const () as usize).hash(&mut hasher);
        match table_fn {
            Some(f) => (Arc::as_ptr(f) as *const () as usize).hash(&mut hasher),
            None => 0usize.hash(&mut hasher),
        }
        hasher.finish()
    }
}

impl PartialEq for Feature {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for Feature {}

impl Hash for Feature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl fmt::Debug for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feature")
            .field("name", &self.name)
            .field("entity_type", &self.entity_type)
            .field(
                "dependencies",
                &self
                    .dependencies
                    .iter()
                    .map(|d| d.name())
                    .collect::<Vec<_>>(),
            )
            .field("has_table_fn", &self.table_fn.is_some())
            .finish()
    }
}

/// Builder for [`Feature`]
pub struct FeatureBuilder {
    name: String,
    description: String,
    entity_type: EntityType,
    dependencies: Vec<Arc<Feature>>,
    row_fn: Option<RowFn>,
    table_fn: Option<TableFn>,
}

impl FeatureBuilder {
    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Declare a dependency on another feature
    pub fn depends_on(mut self, feature: &Arc<Feature>) -> Self {
        self.dependencies.push(Arc::clone(feature));
        self
    }

    /// Attach the row-level compute function (required)
    pub fn row_fn(
        mut self,
        f: impl Fn(&mut Row) -> std::result::Result<(), BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.row_fn = Some(Arc::new(f));
        self
    }

    /// Attach an optional table-level compute function; the executor prefers
    /// it over the row-level path
    pub fn table_fn(
        mut self,
        f: impl Fn(&Table) -> std::result::Result<Table, BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.table_fn = Some(Arc::new(f));
        self
    }

    /// Finalize into a shared, immutable node
    pub fn build(self) -> Result<Arc<Feature>> {
        let row_fn = self.row_fn.ok_or(CoreError::MissingRowFn(self.name.clone()))?;
        let identity = Feature::compute_identity(
            &self.name,
            &self.entity_type,
            &self.dependencies,
            &row_fn,
            self.table_fn.as_ref(),
        );
        Ok(Arc::new(Feature {
            name: self.name,
            description: self.description,
            entity_type: self.entity_type,
            dependencies: self.dependencies,
            row_fn,
            table_fn: self.table_fn,
            identity,
        }))
    }
}
