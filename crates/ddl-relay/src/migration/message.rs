//! Migration message assembly.
//!
//! The wire types here are dialect-rendered projections of the schema
//! model, built fresh per message. They carry everything a replica needs
//! to apply a schema change without re-parsing SQL: the rendered statements
//! plus structured column, key, and enum metadata. Wire encoding itself is
//! owned by the transport layer.

use serde::{Deserialize, Serialize};

use crate::dialect::{typemap, Dialect};
use crate::error::{RelayError, Result};
use crate::schema::{Constraint, Relation, Table, NO_TYPE_MODIFIER};
use crate::snapshot::SchemaSnapshot;

use super::classify::{DdlStatement, PropagatableStatement, StatementKind};
use super::extract::affected_relations;

/// Structured Postgres type descriptor for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePgType {
    /// Catalog type name, e.g. `varchar`.
    pub name: String,
    /// Array dimension sizes, one `-1` (unknown length) per dimension;
    /// empty for scalar types.
    pub array: Vec<i32>,
    /// Size arguments (length, precision/scale) when declared.
    pub size: Vec<i32>,
}

/// One column of a wire table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireColumn {
    /// Column name.
    pub name: String,
    /// Declared type on the embedded replica. Always the embedded dialect's
    /// spelling regardless of the message's target dialect: replicas need
    /// to know their own storage type.
    pub sqlite_type: String,
    /// Structured source-type descriptor.
    pub pg_type: WirePgType,
}

/// One foreign key of a wire table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireForeignKey {
    /// Referencing columns in the described table.
    pub fk_columns: Vec<String>,
    /// Referenced table, rendered for the target dialect.
    pub pk_table: String,
    /// Referenced columns.
    pub pk_columns: Vec<String>,
}

/// Dialect-rendered table description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTable {
    /// Table name, rendered for the target dialect.
    pub name: String,
    /// Columns, in attribute order.
    pub columns: Vec<WireColumn>,
    /// Primary key column names.
    pub primary_keys: Vec<String>,
    /// Foreign keys.
    pub foreign_keys: Vec<WireForeignKey>,
}

/// Dialect-rendered enum type description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEnumType {
    /// Type name, rendered for the target dialect.
    pub name: String,
    /// Value labels, in declaration order.
    pub values: Vec<String>,
}

/// The single table or enum type a message describes structurally.
///
/// A sum type rather than two optional fields: "both populated" is not
/// representable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AffectedEntity {
    /// No table touched and no enum declared (e.g. an index-only batch).
    None,
    /// The one table the batch touches.
    Table(WireTable),
    /// The one enum type the batch declares.
    Enum(WireEnumType),
}

impl AffectedEntity {
    /// Whether no entity is described.
    pub fn is_none(&self) -> bool {
        matches!(self, AffectedEntity::None)
    }
}

/// One rendered statement with its wire-level tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationStatement {
    /// Statement-type tag.
    pub kind: StatementKind,
    /// Dialect-rendered SQL text.
    pub sql: String,
}

/// A self-contained schema-change message for replicas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationMessage {
    /// Version token copied from the schema snapshot.
    pub version: String,
    /// Structured description of the affected table or enum type.
    pub affected_entity: AffectedEntity,
    /// Rendered statements, one per propagatable input statement, in input
    /// order (minus enum statements on dialects without enum support).
    pub statements: Vec<MigrationStatement>,
}

/// Build one migration message covering a classified statement batch.
///
/// Returns the message plus the relations it affects, for the caller to use
/// as a notification/invalidation set.
///
/// # Errors
///
/// Propagates snapshot and rendering failures verbatim; a batch resolving
/// to more than one affected entity is rejected with
/// [`RelayError::AmbiguousBatch`]. No partial message is ever produced.
pub fn build<S: SchemaSnapshot + ?Sized>(
    statements: &[PropagatableStatement],
    snapshot: &S,
    dialect: Dialect,
) -> Result<(MigrationMessage, Vec<Relation>)> {
    let relations = affected_relations(statements, dialect)?;

    let mut tables = Vec::new();
    for relation in &relations {
        let table = snapshot.resolve_table(relation)?;
        tables.push(wire_table(&table, dialect)?);
    }

    let mut enums = Vec::new();
    for stmt in statements {
        if let DdlStatement::CreateEnum(def) = &stmt.ddl {
            enums.push(WireEnumType {
                name: dialect.table_name(&def.name)?,
                values: def.values.clone(),
            });
        }
    }

    let affected_entity = match (tables.len(), enums.len()) {
        (0, 0) => AffectedEntity::None,
        (1, 0) => AffectedEntity::Table(tables.remove(0)),
        (0, 1) => AffectedEntity::Enum(enums.remove(0)),
        (tables, enums) => return Err(RelayError::AmbiguousBatch { tables, enums }),
    };

    let mut rendered = Vec::with_capacity(statements.len());
    for stmt in statements {
        if matches!(stmt.ddl, DdlStatement::CreateEnum(_)) && !dialect.supports_enums() {
            // The enum's value set travels via `affected_entity`; the target
            // dialect cannot execute a create-enum statement.
            continue;
        }
        rendered.push(MigrationStatement {
            kind: stmt.kind(),
            sql: dialect.render(&stmt.ddl, &stmt.sql)?,
        });
    }

    let message = MigrationMessage {
        version: snapshot.version().to_string(),
        affected_entity,
        statements: rendered,
    };
    Ok((message, relations))
}

/// Project a resolved table into its dialect-rendered wire form.
fn wire_table(table: &Table, dialect: Dialect) -> Result<WireTable> {
    let mut columns = Vec::with_capacity(table.columns.len());
    for column in &table.columns {
        let parts = typemap::parse_pg_type(&column.type_name);
        let size = if !parts.size.is_empty() {
            parts.size
        } else if column.type_modifier != NO_TYPE_MODIFIER {
            vec![column.type_modifier]
        } else {
            Vec::new()
        };
        columns.push(WireColumn {
            name: column.name.clone(),
            sqlite_type: typemap::sqlite_type_name(&column.type_name),
            pg_type: WirePgType {
                name: parts.name,
                array: vec![-1; parts.dims],
                size,
            },
        });
    }

    let mut primary_keys = Vec::new();
    let mut foreign_keys = Vec::new();
    for constraint in &table.constraints {
        match constraint {
            Constraint::PrimaryKey { keys, .. } => primary_keys.extend(keys.iter().cloned()),
            Constraint::ForeignKey {
                columns,
                ref_table,
                ref_columns,
                ..
            } => foreign_keys.push(WireForeignKey {
                fk_columns: columns.clone(),
                pk_table: dialect.table_name(ref_table)?,
                pk_columns: ref_columns.clone(),
            }),
            Constraint::Unique { .. } => {}
        }
    }

    Ok(WireTable {
        name: dialect.table_name(&table.relation())?,
        columns,
        primary_keys,
        foreign_keys,
    })
}
