//! Type mapping from Postgres declarations to the embedded dialect.
//!
//! Postgres types reach this module in two spellings: catalog names stored
//! by the schema store (`int4`, `varchar`) and SQL-standard declarations
//! from parsed DDL (`INTEGER`, `CHARACTER VARYING(255)`). Both are first
//! reduced to the catalog name, which then drives the SQLite declared type
//! and the structured wire type descriptor.

/// A Postgres type declaration split into its components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgTypeParts {
    /// Canonical catalog name, e.g. `varchar` for `CHARACTER VARYING(255)`.
    pub name: String,
    /// Array dimensionality (`0` for scalar types).
    pub dims: usize,
    /// Parenthesized size arguments, e.g. `[255]` or `[16, 4]`.
    pub size: Vec<i32>,
}

/// Split a type declaration into base name, array dimensions, and size
/// arguments.
pub fn parse_pg_type(decl: &str) -> PgTypeParts {
    let mut rest = decl.trim();

    let mut dims = 0;
    while let Some(stripped) = rest.strip_suffix("[]") {
        dims += 1;
        rest = stripped.trim_end();
    }

    let mut size = Vec::new();
    let base = match rest.find('(') {
        Some(open) => {
            if let Some(close) = rest.rfind(')') {
                size = rest[open + 1..close]
                    .split(',')
                    .filter_map(|arg| arg.trim().parse::<i32>().ok())
                    .collect();
            }
            rest[..open].trim()
        }
        None => rest,
    };

    PgTypeParts {
        name: canonical_type_name(base),
        dims,
        size,
    }
}

/// Reduce a type spelling to the Postgres catalog name.
fn canonical_type_name(base: &str) -> String {
    let folded = base.to_ascii_lowercase();
    let folded = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    match folded.as_str() {
        "smallint" => "int2",
        "int" | "integer" => "int4",
        "bigint" => "int8",
        "smallserial" | "serial2" => "int2",
        "serial" | "serial4" => "int4",
        "bigserial" | "serial8" => "int8",
        "boolean" => "bool",
        "real" => "float4",
        "double precision" | "float" => "float8",
        "decimal" => "numeric",
        "character varying" => "varchar",
        "character" | "char" => "bpchar",
        "timestamp without time zone" => "timestamp",
        "timestamp with time zone" => "timestamptz",
        "time without time zone" => "time",
        "time with time zone" => "timetz",
        other => other,
    }
    .to_string()
}

/// SQLite declared type for a Postgres type declaration.
///
/// SQLite has storage classes rather than rich types: integral and boolean
/// types land in INTEGER, floating point and numeric in REAL, bytea in
/// BLOB, and everything else (textual, temporal, uuid, json, enums) in
/// TEXT. Unknown types default to TEXT, the lossless choice.
pub fn sqlite_type_name(pg_type: &str) -> String {
    let parts = parse_pg_type(pg_type);
    if parts.dims > 0 {
        // Arrays have no SQLite representation; they travel as their text form.
        return "TEXT".to_string();
    }
    match parts.name.as_str() {
        "int2" | "int4" | "int8" | "bool" => "INTEGER",
        "float4" | "float8" | "numeric" => "REAL",
        "bytea" => "BLOB",
        _ => "TEXT",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar_types() {
        assert_eq!(
            parse_pg_type("int4"),
            PgTypeParts {
                name: "int4".into(),
                dims: 0,
                size: vec![]
            }
        );
        assert_eq!(parse_pg_type("INTEGER").name, "int4");
        assert_eq!(parse_pg_type("bigint").name, "int8");
        assert_eq!(parse_pg_type("double precision").name, "float8");
    }

    #[test]
    fn test_parse_sized_types() {
        let parts = parse_pg_type("CHARACTER VARYING(255)");
        assert_eq!(parts.name, "varchar");
        assert_eq!(parts.size, vec![255]);
        assert_eq!(parts.dims, 0);

        let parts = parse_pg_type("numeric(16, 4)");
        assert_eq!(parts.name, "numeric");
        assert_eq!(parts.size, vec![16, 4]);
    }

    #[test]
    fn test_parse_array_types() {
        let parts = parse_pg_type("int4[]");
        assert_eq!(parts.name, "int4");
        assert_eq!(parts.dims, 1);

        let parts = parse_pg_type("varchar(10)[][]");
        assert_eq!(parts.name, "varchar");
        assert_eq!(parts.dims, 2);
        assert_eq!(parts.size, vec![10]);
    }

    #[test]
    fn test_sqlite_integer_types() {
        assert_eq!(sqlite_type_name("int2"), "INTEGER");
        assert_eq!(sqlite_type_name("INTEGER"), "INTEGER");
        assert_eq!(sqlite_type_name("bigserial"), "INTEGER");
        assert_eq!(sqlite_type_name("boolean"), "INTEGER");
    }

    #[test]
    fn test_sqlite_real_and_blob_types() {
        assert_eq!(sqlite_type_name("real"), "REAL");
        assert_eq!(sqlite_type_name("numeric(16,4)"), "REAL");
        assert_eq!(sqlite_type_name("bytea"), "BLOB");
    }

    #[test]
    fn test_sqlite_text_types() {
        assert_eq!(sqlite_type_name("varchar(64)"), "TEXT");
        assert_eq!(sqlite_type_name("uuid"), "TEXT");
        assert_eq!(sqlite_type_name("timestamptz"), "TEXT");
        assert_eq!(sqlite_type_name("jsonb"), "TEXT");
        assert_eq!(sqlite_type_name("int4[]"), "TEXT");
        assert_eq!(sqlite_type_name("some_enum"), "TEXT");
    }
}
