//! Affected-relation extraction.

use std::collections::HashSet;

use crate::dialect::Dialect;
use crate::error::Result;
use crate::schema::Relation;

use super::classify::{DdlStatement, PropagatableStatement};

/// The relations a classified batch touches, first-seen order.
///
/// CREATE TABLE and ALTER TABLE contribute their target relation; CREATE
/// INDEX and CREATE ENUM TYPE contribute none. Two relations that render
/// identically under the target dialect collapse to one (SQLite drops the
/// schema, so `public.items` and `app.items` are the same table there).
///
/// Pure function: no I/O, no hidden state.
pub fn affected_relations(
    statements: &[PropagatableStatement],
    dialect: Dialect,
) -> Result<Vec<Relation>> {
    let mut seen = HashSet::new();
    let mut relations = Vec::new();
    for stmt in statements {
        let relation = match &stmt.ddl {
            DdlStatement::CreateTable(def) => Some(&def.table),
            DdlStatement::AddColumn(def) => Some(&def.table),
            DdlStatement::CreateIndex(_) | DdlStatement::CreateEnum(_) => None,
        };
        if let Some(relation) = relation {
            let rendered = dialect.table_name(relation)?;
            if seen.insert(rendered) {
                relations.push(relation.clone());
            }
        }
    }
    Ok(relations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::classify::classify;
    use crate::parse::parse;

    fn extract(sql: &str, dialect: Dialect) -> Vec<Relation> {
        affected_relations(&classify(&parse(sql).unwrap()), dialect).unwrap()
    }

    #[test]
    fn test_create_table_contributes_relation() {
        let relations = extract("CREATE TABLE foo (id int)", Dialect::Postgres);
        assert_eq!(relations, vec![Relation::public("foo")]);
    }

    #[test]
    fn test_index_contributes_nothing() {
        let relations = extract("CREATE INDEX foo_idx ON foo (id)", Dialect::Postgres);
        assert!(relations.is_empty());
    }

    #[test]
    fn test_dedup_by_rendered_name() {
        let stmts = classify(
            &parse("CREATE TABLE foo (id int); ALTER TABLE foo ADD COLUMN bar int").unwrap(),
        );
        let relations = affected_relations(&stmts, Dialect::Postgres).unwrap();
        assert_eq!(relations, vec![Relation::public("foo")]);
    }

    #[test]
    fn test_dedup_follows_dialect_rendering() {
        let stmts = classify(
            &parse("CREATE TABLE public.items (id int); ALTER TABLE app.items ADD COLUMN x int")
                .unwrap(),
        );
        // Distinct under Postgres, identical once SQLite drops the schema.
        assert_eq!(
            affected_relations(&stmts, Dialect::Postgres).unwrap().len(),
            2
        );
        assert_eq!(
            affected_relations(&stmts, Dialect::Sqlite).unwrap(),
            vec![Relation::public("items")]
        );
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let stmts = classify(&parse("CREATE TABLE foo (id int)").unwrap());
        let first = affected_relations(&stmts, Dialect::Sqlite).unwrap();
        let second = affected_relations(&stmts, Dialect::Sqlite).unwrap();
        assert_eq!(first, second);
    }
}
