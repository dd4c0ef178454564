//! Statement classification.
//!
//! Lowers parser AST nodes into [`DdlStatement`], a closed union over the
//! fixed set of propagatable DDL kinds. Everything downstream (extraction,
//! rendering, message building) matches on this union exhaustively, so a
//! newly supported statement kind forces a classification decision at
//! compile time instead of silently falling through.
//!
//! The allow-list is an interim substitute for proper upstream filtering:
//! statements that are parseable but not meaningfully replicable may need
//! additional exclusion logic as the set of supported DDL grows.

use serde::{Deserialize, Serialize};
use sqlparser::ast::{
    AlterTableOperation, ColumnDef, ColumnOption, ObjectName, OrderByExpr, Statement,
    TableConstraint, UserDefinedTypeRepresentation,
};

use crate::error::{RelayError, Result};
use crate::parse::SourceStatement;
use crate::schema::Relation;

/// Stable wire-level tag for a propagatable statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementKind {
    CreateTable,
    CreateIndex,
    CreateEnumType,
    AlterAddColumn,
}

/// Column shape as declared in DDL (as opposed to the resolved
/// [`Column`](crate::schema::Column) from a schema snapshot).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name.
    pub name: String,
    /// Declared type in source (Postgres) spelling, e.g. `VARCHAR(255)`.
    pub type_name: String,
    /// Whether NULL values are allowed.
    pub nullable: bool,
    /// Whether the column carries an inline PRIMARY KEY marker.
    pub primary_key: bool,
}

/// Foreign key shape as declared in DDL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeySpec {
    /// Referencing columns in the declaring table.
    pub columns: Vec<String>,
    /// Referenced relation.
    pub ref_table: Relation,
    /// Referenced columns, positionally matching `columns`.
    pub ref_columns: Vec<String>,
}

/// Lowered CREATE TABLE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTableDef {
    /// Target relation.
    pub table: Relation,
    /// Declared columns, in declaration order.
    pub columns: Vec<ColumnSpec>,
    /// Primary key column names (table-level constraint wins over inline
    /// markers).
    pub primary_key: Vec<String>,
    /// Declared foreign keys, inline and table-level, in declaration order.
    pub foreign_keys: Vec<ForeignKeySpec>,
}

/// Lowered CREATE INDEX.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIndexDef {
    /// Index name, if given.
    pub name: Option<String>,
    /// Indexed relation.
    pub table: Relation,
    /// Whether the index is UNIQUE.
    pub unique: bool,
    /// Indexed column expressions, rendered as written.
    pub columns: Vec<String>,
}

/// Lowered ALTER TABLE .. ADD COLUMN (single sub-command only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddColumnDef {
    /// Altered relation.
    pub table: Relation,
    /// The added column.
    pub column: ColumnSpec,
}

/// Lowered CREATE TYPE .. AS ENUM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEnumDef {
    /// Schema-qualified type name.
    pub name: Relation,
    /// Enum value labels, in declaration order.
    pub values: Vec<String>,
}

/// A DDL statement whose effect must reach replicas.
///
/// This is the fixed propagation allow-list: CREATE TABLE, CREATE INDEX,
/// ALTER TABLE with exactly one ADD COLUMN sub-command, and
/// CREATE TYPE .. AS ENUM. Any other statement shape does not propagate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DdlStatement {
    CreateTable(CreateTableDef),
    CreateIndex(CreateIndexDef),
    AddColumn(AddColumnDef),
    CreateEnum(CreateEnumDef),
}

impl DdlStatement {
    /// The wire-level tag for this statement.
    pub fn kind(&self) -> StatementKind {
        match self {
            DdlStatement::CreateTable(_) => StatementKind::CreateTable,
            DdlStatement::CreateIndex(_) => StatementKind::CreateIndex,
            DdlStatement::AddColumn(_) => StatementKind::AlterAddColumn,
            DdlStatement::CreateEnum(_) => StatementKind::CreateEnumType,
        }
    }

    /// Lower one AST node, returning `None` for non-propagatable shapes
    /// (including multi-command ALTER TABLE).
    pub fn lower(stmt: &Statement) -> Option<DdlStatement> {
        match stmt {
            Statement::CreateTable(ct) => Some(DdlStatement::CreateTable(lower_create_table(
                &ct.name,
                &ct.columns,
                &ct.constraints,
            ))),
            Statement::CreateIndex(ci) => Some(DdlStatement::CreateIndex(CreateIndexDef {
                name: ci.name.as_ref().map(object_name_tail),
                table: relation_of(&ci.table_name),
                unique: ci.unique,
                columns: ci.columns.iter().map(index_column).collect(),
            })),
            Statement::AlterTable {
                name, operations, ..
            } => match operations.as_slice() {
                [AlterTableOperation::AddColumn { column_def, .. }] => {
                    Some(DdlStatement::AddColumn(AddColumnDef {
                        table: relation_of(name),
                        column: column_spec(column_def),
                    }))
                }
                _ => None,
            },
            Statement::CreateType {
                name,
                representation: UserDefinedTypeRepresentation::Enum { labels },
                ..
            } => Some(DdlStatement::CreateEnum(CreateEnumDef {
                name: relation_of(name),
                values: labels.iter().map(|l| l.value.clone()).collect(),
            })),
            _ => None,
        }
    }
}

impl TryFrom<&Statement> for DdlStatement {
    type Error = RelayError;

    /// Lower one AST node, failing on shapes outside the allow-list.
    ///
    /// Callers that batch-process statements should prefer [`classify`],
    /// which drops unsupported shapes silently.
    fn try_from(stmt: &Statement) -> Result<Self> {
        DdlStatement::lower(stmt).ok_or_else(|| RelayError::UnsupportedStatement(stmt.to_string()))
    }
}

/// A propagatable statement together with its own original source text.
///
/// The text travels with the lowered statement so that source-dialect
/// rendering stays byte-identical per statement even in multi-statement
/// batches.
#[derive(Debug, Clone, PartialEq)]
pub struct PropagatableStatement {
    /// The lowered statement.
    pub ddl: DdlStatement,
    /// This statement's original text.
    pub sql: String,
}

impl PropagatableStatement {
    /// The wire-level tag for this statement.
    pub fn kind(&self) -> StatementKind {
        self.ddl.kind()
    }
}

/// Filter a parsed batch down to its propagatable subset, order-preserving.
///
/// Dropping a statement is not an error; it simply does not propagate.
pub fn classify(statements: &[SourceStatement]) -> Vec<PropagatableStatement> {
    statements
        .iter()
        .filter_map(|stmt| {
            DdlStatement::lower(&stmt.ast).map(|ddl| PropagatableStatement {
                ddl,
                sql: stmt.sql.clone(),
            })
        })
        .collect()
}

/// Schema-qualify an object name, defaulting to `public` like Postgres does
/// for an empty search path match.
fn relation_of(name: &ObjectName) -> Relation {
    let parts = &name.0;
    match parts.len() {
        0 => Relation::public(""),
        1 => Relation::public(parts[0].value.clone()),
        n => Relation::new(parts[n - 2].value.clone(), parts[n - 1].value.clone()),
    }
}

/// Last identifier of an object name (index names are not schema-qualified
/// on the wire).
fn object_name_tail(name: &ObjectName) -> String {
    name.0
        .last()
        .map(|i| i.value.clone())
        .unwrap_or_default()
}

fn index_column(col: &OrderByExpr) -> String {
    col.to_string()
}

fn column_spec(def: &ColumnDef) -> ColumnSpec {
    let mut nullable = true;
    let mut primary_key = false;
    for opt in &def.options {
        match &opt.option {
            ColumnOption::NotNull => nullable = false,
            ColumnOption::Null => nullable = true,
            ColumnOption::Unique { is_primary, .. } if *is_primary => {
                primary_key = true;
                nullable = false;
            }
            _ => {}
        }
    }
    ColumnSpec {
        name: def.name.value.clone(),
        type_name: def.data_type.to_string(),
        nullable,
        primary_key,
    }
}

fn lower_create_table(
    name: &ObjectName,
    columns: &[ColumnDef],
    constraints: &[TableConstraint],
) -> CreateTableDef {
    let specs: Vec<ColumnSpec> = columns.iter().map(column_spec).collect();

    // A table-level PRIMARY KEY constraint wins over inline markers; Postgres
    // rejects tables declaring both.
    let mut primary_key: Vec<String> = constraints
        .iter()
        .find_map(|c| match c {
            TableConstraint::PrimaryKey { columns, .. } => {
                Some(columns.iter().map(|i| i.value.clone()).collect())
            }
            _ => None,
        })
        .unwrap_or_default();
    if primary_key.is_empty() {
        primary_key = specs
            .iter()
            .filter(|s| s.primary_key)
            .map(|s| s.name.clone())
            .collect();
    }

    let mut foreign_keys: Vec<ForeignKeySpec> = Vec::new();
    for (def, spec) in columns.iter().zip(&specs) {
        for opt in &def.options {
            if let ColumnOption::ForeignKey {
                foreign_table,
                referred_columns,
                ..
            } = &opt.option
            {
                foreign_keys.push(ForeignKeySpec {
                    columns: vec![spec.name.clone()],
                    ref_table: relation_of(foreign_table),
                    ref_columns: referred_columns.iter().map(|i| i.value.clone()).collect(),
                });
            }
        }
    }
    for constraint in constraints {
        if let TableConstraint::ForeignKey {
            columns,
            foreign_table,
            referred_columns,
            ..
        } = constraint
        {
            foreign_keys.push(ForeignKeySpec {
                columns: columns.iter().map(|i| i.value.clone()).collect(),
                ref_table: relation_of(foreign_table),
                ref_columns: referred_columns.iter().map(|i| i.value.clone()).collect(),
            });
        }
    }

    CreateTableDef {
        table: relation_of(name),
        columns: specs,
        primary_key,
        foreign_keys,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    fn classify_sql(sql: &str) -> Vec<PropagatableStatement> {
        classify(&parse(sql).unwrap())
    }

    #[test]
    fn test_create_table_is_propagatable() {
        let stmts = classify_sql(
            "CREATE TABLE items (id uuid PRIMARY KEY, owner_id uuid REFERENCES users (id), \
             note varchar(64) NOT NULL)",
        );
        assert_eq!(stmts.len(), 1);
        let DdlStatement::CreateTable(def) = &stmts[0].ddl else {
            panic!("expected CreateTable, got {:?}", stmts[0].ddl);
        };
        assert_eq!(def.table, Relation::public("items"));
        assert_eq!(def.primary_key, vec!["id".to_string()]);
        assert_eq!(def.columns.len(), 3);
        assert!(!def.columns[0].nullable);
        assert!(def.columns[1].nullable);
        assert!(!def.columns[2].nullable);
        assert_eq!(def.foreign_keys.len(), 1);
        assert_eq!(def.foreign_keys[0].columns, vec!["owner_id".to_string()]);
        assert_eq!(def.foreign_keys[0].ref_table, Relation::public("users"));
        assert_eq!(def.foreign_keys[0].ref_columns, vec!["id".to_string()]);
    }

    #[test]
    fn test_table_level_primary_key() {
        let stmts = classify_sql(
            "CREATE TABLE app.events (source text, seq bigint, PRIMARY KEY (source, seq))",
        );
        let DdlStatement::CreateTable(def) = &stmts[0].ddl else {
            panic!("expected CreateTable");
        };
        assert_eq!(def.table, Relation::new("app", "events"));
        assert_eq!(def.primary_key, vec!["source".to_string(), "seq".to_string()]);
    }

    #[test]
    fn test_single_add_column_is_propagatable() {
        let stmts = classify_sql("ALTER TABLE foo ADD COLUMN bar int");
        assert_eq!(stmts.len(), 1);
        let DdlStatement::AddColumn(def) = &stmts[0].ddl else {
            panic!("expected AddColumn");
        };
        assert_eq!(def.table, Relation::public("foo"));
        assert_eq!(def.column.name, "bar");
        assert_eq!(stmts[0].kind(), StatementKind::AlterAddColumn);
    }

    #[test]
    fn test_multi_command_alter_is_dropped() {
        let stmts = classify_sql("ALTER TABLE foo ADD COLUMN bar int, ADD COLUMN baz text");
        assert!(stmts.is_empty());
    }

    #[test]
    fn test_non_propagatable_kinds_are_dropped() {
        assert!(classify_sql("DROP TABLE foo").is_empty());
        assert!(classify_sql("ALTER TABLE foo DROP COLUMN bar").is_empty());
        assert!(classify_sql("INSERT INTO foo VALUES (1)").is_empty());
    }

    #[test]
    fn test_create_enum_type() {
        let stmts = classify_sql("CREATE TYPE colour AS ENUM ('red', 'green', 'blue')");
        assert_eq!(stmts.len(), 1);
        let DdlStatement::CreateEnum(def) = &stmts[0].ddl else {
            panic!("expected CreateEnum");
        };
        assert_eq!(def.name, Relation::public("colour"));
        assert_eq!(def.values, vec!["red", "green", "blue"]);
        assert_eq!(stmts[0].kind(), StatementKind::CreateEnumType);
    }

    #[test]
    fn test_try_from_rejects_unsupported_shape() {
        let ast = parse("DROP TABLE foo").unwrap();
        let err = DdlStatement::try_from(&ast[0].ast).unwrap_err();
        assert!(matches!(err, RelayError::UnsupportedStatement(_)));
    }

    #[test]
    fn test_create_index_lowering() {
        let stmts = classify_sql("CREATE UNIQUE INDEX items_note_idx ON items (note)");
        let DdlStatement::CreateIndex(def) = &stmts[0].ddl else {
            panic!("expected CreateIndex");
        };
        assert_eq!(def.name.as_deref(), Some("items_note_idx"));
        assert_eq!(def.table, Relation::public("items"));
        assert!(def.unique);
        assert_eq!(def.columns, vec!["note".to_string()]);
    }
}
