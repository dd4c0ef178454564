//! DDL-to-migration-message translation pipeline.
//!
//! Control flow: raw statement text → parse → classify/filter →
//! extract affected relations → resolve via schema snapshot → render per
//! dialect → assemble message. Each invocation is self-contained and
//! synchronous; concurrent calls need no coordination as long as each gets
//! its own immutable snapshot.

pub mod classify;
pub mod extract;
pub mod message;

use tracing::debug;

use crate::dialect::Dialect;
use crate::error::Result;
use crate::parse;
use crate::schema::Relation;
use crate::snapshot::SchemaSnapshot;

pub use classify::{classify, DdlStatement, PropagatableStatement, StatementKind};
pub use extract::affected_relations;
pub use message::{
    build, AffectedEntity, MigrationMessage, MigrationStatement, WireColumn, WireEnumType,
    WireForeignKey, WirePgType, WireTable,
};

/// Translate one DDL statement's text into migration messages for replicas.
///
/// Returns the messages (currently zero or one: a batch with nothing
/// propagatable is a defined no-op success, anything else yields a single
/// message covering the whole propagatable subset) together with the
/// relations the change affects.
///
/// # Errors
///
/// Never fails on its own; parser, renderer, and snapshot failures
/// propagate verbatim.
pub fn migrate<S: SchemaSnapshot + ?Sized>(
    snapshot: &S,
    sql: &str,
    dialect: Dialect,
) -> Result<(Vec<MigrationMessage>, Vec<Relation>)> {
    let ast = parse::parse(sql)?;
    let statements = classify::classify(&ast);
    if statements.is_empty() {
        debug!(
            "no propagatable statements in batch of {} (version {})",
            ast.len(),
            snapshot.version()
        );
        return Ok((Vec::new(), Vec::new()));
    }

    let (msg, relations) = message::build(&statements, snapshot, dialect)?;
    debug!(
        "built {} migration for version {} affecting {} relation(s)",
        dialect.name(),
        msg.version,
        relations.len()
    );
    Ok((vec![msg], relations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, Constraint, ReplicaIdentity, Table};
    use crate::snapshot::MemorySnapshot;
    use pretty_assertions::assert_eq;

    fn foo_with_columns(columns: Vec<Column>) -> Table {
        let keys = vec!["id".to_string()];
        Table {
            schema: "public".into(),
            name: "foo".into(),
            oid: 40001,
            primary_keys: keys.clone(),
            replica_identity: ReplicaIdentity::Default,
            columns,
            constraints: vec![Constraint::PrimaryKey {
                name: None,
                keys,
            }],
        }
    }

    #[test]
    fn test_non_propagatable_input_is_noop() {
        let snapshot = MemorySnapshot::new("1");
        let (messages, relations) =
            migrate(&snapshot, "DROP TABLE foo", Dialect::Sqlite).unwrap();
        assert!(messages.is_empty());
        assert!(relations.is_empty());

        let (messages, relations) = migrate(
            &snapshot,
            "ALTER TABLE foo ADD COLUMN a int, ADD COLUMN b int",
            Dialect::Sqlite,
        )
        .unwrap();
        assert!(messages.is_empty());
        assert!(relations.is_empty());
    }

    #[test]
    fn test_add_column_end_to_end() {
        // Snapshot captured after the DDL applied on the source: foo already
        // has both columns.
        let snapshot = MemorySnapshot::new("20260829120000").with_table(foo_with_columns(vec![
            Column::new("id", "int4").not_null(),
            Column::new("bar", "int4"),
        ]));

        let (messages, relations) = migrate(
            &snapshot,
            "ALTER TABLE foo ADD COLUMN bar int",
            Dialect::Sqlite,
        )
        .unwrap();

        assert_eq!(relations, vec![Relation::public("foo")]);
        assert_eq!(messages.len(), 1);
        let msg = &messages[0];
        assert_eq!(msg.version, "20260829120000");
        assert_eq!(msg.statements.len(), 1);
        assert_eq!(msg.statements[0].kind, StatementKind::AlterAddColumn);
        assert_eq!(
            msg.statements[0].sql,
            "ALTER TABLE \"foo\" ADD COLUMN \"bar\" INTEGER"
        );

        let AffectedEntity::Table(table) = &msg.affected_entity else {
            panic!("expected table entity");
        };
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "bar"]);
        assert_eq!(table.primary_keys, vec!["id".to_string()]);
    }

    #[test]
    fn test_parse_error_propagates() {
        let snapshot = MemorySnapshot::new("1");
        assert!(migrate(&snapshot, "CREATE TABLE", Dialect::Sqlite).is_err());
    }

    #[test]
    fn test_create_table_column_count_matches_snapshot() {
        let snapshot = MemorySnapshot::new("2").with_table(foo_with_columns(vec![
            Column::new("id", "int8").not_null(),
            Column::new("a", "text"),
            Column::new("b", "bool"),
        ]));
        let (messages, relations) = migrate(
            &snapshot,
            "CREATE TABLE foo (id bigint PRIMARY KEY, a text, b boolean)",
            Dialect::Postgres,
        )
        .unwrap();
        assert_eq!(relations, vec![Relation::public("foo")]);
        let AffectedEntity::Table(table) = &messages[0].affected_entity else {
            panic!("expected table entity");
        };
        assert_eq!(table.columns.len(), 3);
        assert_eq!(table.name, "\"public\".\"foo\"");
    }
}
