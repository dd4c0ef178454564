//! # ddl-relay
//!
//! Translates Postgres DDL changes into self-contained migration messages
//! for embedded-database replicas in a logical replication system.
//!
//! Given a DDL statement's text and a versioned schema snapshot, the
//! pipeline decides whether the change must propagate to replicas and, if
//! so, builds a message carrying both dialect-translated SQL and the
//! structured metadata (columns, types, keys, enum values) a replica needs
//! to apply the change without re-parsing SQL:
//!
//! - **Classification** over a fixed allow-list of propagatable DDL kinds
//! - **Dialect rendering** with a byte-identical fast path for the source
//!   dialect and a SQLite generator for embedded replicas
//! - **Schema lookup** against an immutable versioned snapshot
//! - **Message assembly** with exactly one affected table or enum type
//!
//! ## Example
//!
//! ```rust
//! use ddl_relay::{migrate, Column, Dialect, MemorySnapshot, Table};
//! use ddl_relay::{Constraint, ReplicaIdentity};
//!
//! let snapshot = MemorySnapshot::new("1").with_table(Table {
//!     schema: "public".into(),
//!     name: "items".into(),
//!     oid: 16384,
//!     primary_keys: vec!["id".into()],
//!     replica_identity: ReplicaIdentity::Default,
//!     columns: vec![Column::new("id", "uuid").not_null()],
//!     constraints: vec![Constraint::PrimaryKey { name: None, keys: vec!["id".into()] }],
//! });
//!
//! let (messages, relations) = migrate(
//!     &snapshot,
//!     "CREATE TABLE items (id uuid PRIMARY KEY)",
//!     Dialect::Sqlite,
//! )?;
//! assert_eq!(messages.len(), 1);
//! assert_eq!(relations[0].name, "items");
//! # Ok::<(), ddl_relay::RelayError>(())
//! ```
//!
//! Everything here is synchronous and stateless across invocations; the
//! surrounding replication service owns parsing events, transactions, wire
//! encoding, and transport.

pub mod dialect;
pub mod error;
pub mod migration;
pub mod parse;
pub mod schema;
pub mod snapshot;

// Re-exports for convenient access
pub use dialect::Dialect;
pub use error::{RelayError, Result};
pub use migration::{
    migrate, AffectedEntity, DdlStatement, MigrationMessage, MigrationStatement,
    PropagatableStatement, StatementKind, WireColumn, WireEnumType, WireForeignKey, WirePgType,
    WireTable,
};
pub use parse::SourceStatement;
pub use schema::{Column, Constraint, Relation, ReplicaIdentity, Table};
pub use snapshot::{MemorySnapshot, SchemaSnapshot};
