//! SQLite DDL generation for classified statements.
//!
//! Covers exactly the propagation allow-list. CREATE ENUM TYPE is the one
//! statement with no SQLite rendering; the message builder represents enums
//! as structured metadata instead of executable SQL.

use crate::error::{RelayError, Result};
use crate::migration::classify::{
    AddColumnDef, ColumnSpec, CreateIndexDef, CreateTableDef, DdlStatement,
};

use super::{quote_ident, Dialect};

/// Render a classified statement as SQLite DDL.
pub fn render(stmt: &DdlStatement) -> Result<String> {
    match stmt {
        DdlStatement::CreateTable(def) => render_create_table(def),
        DdlStatement::CreateIndex(def) => render_create_index(def),
        DdlStatement::AddColumn(def) => render_add_column(def),
        DdlStatement::CreateEnum(def) => Err(RelayError::UnsupportedStatement(format!(
            "CREATE TYPE {} AS ENUM has no SQLite rendering",
            def.name
        ))),
    }
}

fn render_column(spec: &ColumnSpec) -> Result<String> {
    let mut sql = format!(
        "{} {}",
        quote_ident(&spec.name)?,
        Dialect::Sqlite.type_name(&spec.type_name)
    );
    if !spec.nullable {
        sql.push_str(" NOT NULL");
    }
    Ok(sql)
}

fn render_create_table(def: &CreateTableDef) -> Result<String> {
    let mut items = Vec::with_capacity(def.columns.len() + 1 + def.foreign_keys.len());
    for column in &def.columns {
        items.push(render_column(column)?);
    }
    if !def.primary_key.is_empty() {
        items.push(format!("PRIMARY KEY ({})", quote_list(&def.primary_key)?));
    }
    for fk in &def.foreign_keys {
        items.push(format!(
            "FOREIGN KEY ({}) REFERENCES {} ({})",
            quote_list(&fk.columns)?,
            Dialect::Sqlite.table_name(&fk.ref_table)?,
            quote_list(&fk.ref_columns)?
        ));
    }
    Ok(format!(
        "CREATE TABLE {} ({})",
        Dialect::Sqlite.table_name(&def.table)?,
        items.join(", ")
    ))
}

fn render_create_index(def: &CreateIndexDef) -> Result<String> {
    let unique = if def.unique { "UNIQUE " } else { "" };
    let name = match &def.name {
        Some(name) => format!("{} ", quote_ident(name)?),
        // SQLite requires an index name; derive one the way Postgres would.
        None => format!("{} ", quote_ident(&format!("{}_idx", def.table.name))?),
    };
    Ok(format!(
        "CREATE {}INDEX {}ON {} ({})",
        unique,
        name,
        Dialect::Sqlite.table_name(&def.table)?,
        def.columns.join(", ")
    ))
}

fn render_add_column(def: &AddColumnDef) -> Result<String> {
    Ok(format!(
        "ALTER TABLE {} ADD COLUMN {}",
        Dialect::Sqlite.table_name(&def.table)?,
        render_column(&def.column)?
    ))
}

fn quote_list(names: &[String]) -> Result<String> {
    let quoted: Vec<String> = names
        .iter()
        .map(|n| quote_ident(n))
        .collect::<Result<_>>()?;
    Ok(quoted.join(", "))
}
