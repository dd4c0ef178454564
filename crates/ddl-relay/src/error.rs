//! Error types for DDL translation.

use thiserror::Error;

/// Main error type for DDL-to-migration-message translation.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Malformed input SQL; surfaced from the parser unchanged.
    #[error("SQL parse error: {0}")]
    Parse(#[from] sqlparser::parser::ParserError),

    /// A statement references a table absent from the schema snapshot.
    ///
    /// The snapshot is captured after the DDL was applied on the source, so
    /// this indicates a caller/ordering bug rather than routine data.
    #[error("relation {schema}.{name} not found in schema version {version}")]
    UnknownRelation {
        schema: String,
        name: String,
        version: String,
    },

    /// A statement shape outside the propagation allow-list was handed to an
    /// operation that requires a classified statement. Callers must classify
    /// first; hitting this is a contract violation, not a runtime condition.
    #[error("unsupported statement shape: {0}")]
    UnsupportedStatement(String),

    /// A statement batch resolved to more than one affected entity.
    ///
    /// Each propagatable statement touches exactly one relation, so a batch
    /// is expected to describe at most one table or one enum type. Mixed or
    /// multi-table batches are rejected early instead of picking a winner.
    #[error("statement batch affects {tables} table(s) and {enums} enum type(s); at most one entity is supported")]
    AmbiguousBatch { tables: usize, enums: usize },

    /// An identifier failed validation during dialect rendering
    /// (empty, null byte, or overlong).
    #[error("invalid identifier: {0}")]
    Identifier(String),
}

/// Result type alias for translation operations.
pub type Result<T> = std::result::Result<T, RelayError>;
