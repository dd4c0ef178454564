//! Dialect selection and rendering (Strategy pattern).
//!
//! A [`Dialect`] decides how statements, table names, and column types are
//! rendered for a replica. The source database's own dialect is a strict
//! identity: replicas targeting Postgres must receive byte-identical SQL, so
//! original statement text passes through untouched. The embedded dialect
//! delegates to the [`sqlite`] generator.

pub mod sqlite;
pub mod typemap;

use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};
use crate::migration::classify::DdlStatement;
use crate::schema::Relation;

/// Maximum identifier length (Postgres truncates at 63 bytes; SQLite has no
/// hard limit, so the Postgres bound is the binding one).
const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Target SQL rendering flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// The source database's native dialect.
    Postgres,
    /// The embedded-replica dialect.
    Sqlite,
}

impl Dialect {
    /// The source database's own dialect (identity rendering).
    pub const SOURCE: Dialect = Dialect::Postgres;

    /// Dialect identifier, e.g. for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// Whether the dialect has a native enum-type concept.
    ///
    /// Dialects without one cannot execute a CREATE ENUM TYPE statement;
    /// the enum's value set travels as structured message metadata instead.
    pub fn supports_enums(&self) -> bool {
        match self {
            Dialect::Postgres => true,
            Dialect::Sqlite => false,
        }
    }

    /// Render a classified statement for this dialect.
    ///
    /// For [`Dialect::SOURCE`] the original statement text is returned
    /// verbatim; no re-parsing, no normalization. Other dialects delegate
    /// to their generator, whose failures propagate unchanged.
    pub fn render(&self, stmt: &DdlStatement, original_sql: &str) -> Result<String> {
        match self {
            Dialect::Postgres => Ok(original_sql.to_string()),
            Dialect::Sqlite => sqlite::render(stmt),
        }
    }

    /// Render a relation name for this dialect.
    ///
    /// Postgres renders a schema-qualified quoted name; SQLite has no
    /// schemas, so only the quoted table name is rendered.
    pub fn table_name(&self, relation: &Relation) -> Result<String> {
        match self {
            Dialect::Postgres => Ok(format!(
                "{}.{}",
                quote_ident(&relation.schema)?,
                quote_ident(&relation.name)?
            )),
            Dialect::Sqlite => quote_ident(&relation.name),
        }
    }

    /// Render a source-dialect type name for this dialect.
    pub fn type_name(&self, pg_type: &str) -> String {
        match self {
            Dialect::Postgres => pg_type.to_string(),
            Dialect::Sqlite => typemap::sqlite_type_name(pg_type),
        }
    }
}

/// Validate an identifier before it is spliced into rendered SQL.
///
/// Identifiers cannot be parameterized, so rejects empty names, null bytes,
/// and names over [`MAX_IDENTIFIER_LENGTH`] bytes before quoting.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(RelayError::Identifier("identifier is empty".to_string()));
    }
    if name.contains('\0') {
        return Err(RelayError::Identifier(format!(
            "identifier contains null byte: {:?}",
            name
        )));
    }
    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(RelayError::Identifier(format!(
            "identifier exceeds {} bytes ({} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }
    Ok(())
}

/// Quote an identifier with double quotes (Postgres and SQLite share the
/// double-quote convention), doubling embedded quotes.
pub fn quote_ident(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}
