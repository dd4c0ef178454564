//! Schema metadata types for replicated tables, columns, and constraints.
//!
//! These types provide a dialect-agnostic representation of the logical
//! schema as tracked by the versioned schema store. They are read-only
//! inputs to message building; this crate never mutates them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel for "no type modifier" on a column (mirrors Postgres `atttypmod`).
pub const NO_TYPE_MODIFIER: i32 = -1;

/// A `{schema, name}` pair identifying a table independent of dialect
/// rendering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Relation {
    /// Schema (namespace) name.
    pub schema: String,
    /// Table name.
    pub name: String,
}

impl Relation {
    /// Create a relation key from schema and table name.
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Create a relation in the default `public` schema.
    pub fn public(name: impl Into<String>) -> Self {
        Self::new("public", name)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// How a table identifies rows for replication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicaIdentity {
    /// Every column participates in the identity (`REPLICA IDENTITY FULL`).
    AllColumns,
    /// The primary key (or replica identity index) columns.
    #[default]
    Default,
    /// No identity; updates/deletes cannot be replicated.
    Nothing,
    /// A designated unique index.
    Index,
}

/// One column of a tracked table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within its table.
    pub name: String,

    /// Logical type name in source (Postgres) terms, e.g. `varchar` or
    /// `int4[]`.
    pub type_name: String,

    /// Whether NULL values are allowed.
    pub nullable: bool,

    /// Type modifier (length/precision refinement); [`NO_TYPE_MODIFIER`]
    /// when not applicable.
    #[serde(default = "default_type_modifier")]
    pub type_modifier: i32,

    /// Whether the column participates in the table's replica identity,
    /// when known.
    #[serde(default)]
    pub part_of_identity: Option<bool>,
}

fn default_type_modifier() -> i32 {
    NO_TYPE_MODIFIER
}

impl Column {
    /// Create a nullable column with no type modifier.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            nullable: true,
            type_modifier: NO_TYPE_MODIFIER,
            part_of_identity: None,
        }
    }

    /// Mark the column NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Set the type modifier.
    pub fn with_modifier(mut self, type_modifier: i32) -> Self {
        self.type_modifier = type_modifier;
        self
    }
}

/// A table-level constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    /// Primary key over an ordered set of columns.
    PrimaryKey {
        /// Constraint name, if any.
        name: Option<String>,
        /// Key column names, in key order.
        keys: Vec<String>,
    },
    /// Foreign key referencing another relation.
    ForeignKey {
        /// Constraint name, if any.
        name: Option<String>,
        /// Referencing columns in this table.
        columns: Vec<String>,
        /// Referenced relation.
        ref_table: Relation,
        /// Referenced columns, positionally matching `columns`.
        ref_columns: Vec<String>,
    },
    /// Unique constraint over an ordered set of columns.
    Unique {
        /// Constraint name, if any.
        name: Option<String>,
        /// Constrained column names.
        keys: Vec<String>,
    },
}

/// Dialect-agnostic table metadata as resolved from a schema snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Schema name.
    pub schema: String,

    /// Table name.
    pub name: String,

    /// Source-database object identifier. Opaque; used only for identity.
    pub oid: u32,

    /// Primary key column names, in key order. Every entry names a column
    /// in `columns` (enforced by the schema store).
    pub primary_keys: Vec<String>,

    /// Row-identity strategy for replication.
    pub replica_identity: ReplicaIdentity,

    /// Column definitions, in attribute order.
    pub columns: Vec<Column>,

    /// Table-level constraints.
    pub constraints: Vec<Constraint>,
}

impl Table {
    /// The relation key for this table.
    pub fn relation(&self) -> Relation {
        Relation::new(self.schema.clone(), self.name.clone())
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}
