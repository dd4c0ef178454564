//! Versioned schema snapshot lookup.
//!
//! The schema store owns versioning and consistency; this crate only reads
//! a snapshot that was captured after the triggering DDL was applied on the
//! source. [`SchemaSnapshot`] is the seam: the surrounding service may back
//! it with its own store, and tests use [`MemorySnapshot`].

use std::collections::HashMap;

use crate::error::{RelayError, Result};
use crate::schema::{Relation, Table};

/// Read-only view of one schema version.
///
/// Implementations must be internally consistent: a table resolved through
/// this snapshot reflects the schema as of [`version`](Self::version),
/// including the effect of the DDL statement being translated.
pub trait SchemaSnapshot: Send + Sync {
    /// Opaque version token for this snapshot.
    fn version(&self) -> &str;

    /// Resolve a relation to its full table definition.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UnknownRelation`] if the relation is absent.
    /// That is fatal to the calling message build: the snapshot is assumed
    /// consistent with the statement that triggered translation, so a miss
    /// is a caller/ordering bug.
    fn resolve_table(&self, relation: &Relation) -> Result<Table>;
}

/// Map-backed snapshot implementation.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshot {
    version: String,
    tables: HashMap<Relation, Table>,
}

impl MemorySnapshot {
    /// Create an empty snapshot with the given version token.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            tables: HashMap::new(),
        }
    }

    /// Add a table, keyed by its relation. Replaces any previous definition.
    pub fn with_table(mut self, table: Table) -> Self {
        self.insert(table);
        self
    }

    /// Insert a table, keyed by its relation.
    pub fn insert(&mut self, table: Table) {
        self.tables.insert(table.relation(), table);
    }
}

impl SchemaSnapshot for MemorySnapshot {
    fn version(&self) -> &str {
        &self.version
    }

    fn resolve_table(&self, relation: &Relation) -> Result<Table> {
        self.tables
            .get(relation)
            .cloned()
            .ok_or_else(|| RelayError::UnknownRelation {
                schema: relation.schema.clone(),
                name: relation.name.clone(),
                version: self.version.clone(),
            })
    }
}
