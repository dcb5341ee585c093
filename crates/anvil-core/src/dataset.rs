//! Dataset collaborator trait
//!
//! A `Dataset` owns the canonical row-level table and knows how to project
//! it onto each entity granularity it supports. The engine only ever talks
//! to datasets through this seam; resolution is a pure lookup with no graph
//! or concurrency logic.

use crate::entity::{EntityType, EntityView};
use crate::error::{CoreError, Result};
use crate::types::Table;

/// External collaborator supplying tabular data and entity scoping
pub trait Dataset: Send + Sync {
    /// Canonical row-level table
    fn table(&self) -> &Table;

    /// Entity granularities this dataset can project onto
    fn supported_entity_types(&self) -> Vec<EntityType>;

    /// Project `table` onto the given entity granularity.
    ///
    /// Receives the current working table rather than the pristine one, so
    /// views observe dependency columns merged by earlier stages. Callers go
    /// through [`Dataset::resolve_view`], which performs the support check.
    fn map_to_view(&self, entity: &EntityType, table: &Table) -> Result<EntityView>;

    /// Resolve the working view for an entity type, failing for entity
    /// types the dataset does not declare.
    fn resolve_view(&self, entity: &EntityType, table: &Table) -> Result<EntityView> {
        if !self.supported_entity_types().contains(entity) {
            return Err(CoreError::UnsupportedEntityType(entity.name().to_string()));
        }
        self.map_to_view(entity, table)
    }
}
