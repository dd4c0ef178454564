//! Thin wrapper around the SQL parser.
//!
//! Statements are returned together with their own slice of the input text.
//! Source-dialect rendering must hand replicas byte-identical SQL, so each
//! statement in a multi-statement batch needs its own original text, not
//! the batch's. The input is split on top-level semicolons (the tokenizer
//! keeps semicolons inside string literals and comments out of the token
//! stream) and each segment is parsed on its own.

use sqlparser::ast::Statement;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, Tokenizer};

use crate::error::{RelayError, Result};

/// One parsed statement with its original source text.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceStatement {
    /// The parsed AST node.
    pub ast: Statement,
    /// The statement's own text, trimmed of surrounding whitespace.
    pub sql: String,
}

/// Parse Postgres SQL into zero or more statements, each paired with its
/// own source text.
///
/// Parse failures propagate unchanged as
/// [`RelayError::Parse`](crate::error::RelayError::Parse); no partial
/// result is produced.
pub fn parse(sql: &str) -> Result<Vec<SourceStatement>> {
    let dialect = PostgreSqlDialect {};
    let tokens = Tokenizer::new(&dialect, sql)
        .tokenize_with_location()
        .map_err(|e| RelayError::Parse(e.into()))?;

    let mut segments = Vec::new();
    let mut start = 0;
    for token in &tokens {
        if token.token == Token::SemiColon {
            let end = byte_offset(sql, token.location.line, token.location.column);
            segments.push(&sql[start..end]);
            start = (end + 1).min(sql.len());
        }
    }
    segments.push(&sql[start..]);

    let mut statements = Vec::new();
    for segment in segments {
        let text = segment.trim();
        if text.is_empty() {
            continue;
        }
        for ast in Parser::parse_sql(&dialect, text)? {
            statements.push(SourceStatement {
                ast,
                sql: text.to_string(),
            });
        }
    }
    Ok(statements)
}

/// Byte offset of a 1-based (line, column) tokenizer location.
fn byte_offset(sql: &str, line: u64, column: u64) -> usize {
    let mut cur_line = 1;
    let mut cur_column = 1;
    for (idx, ch) in sql.char_indices() {
        if cur_line == line && cur_column == column {
            return idx;
        }
        if ch == '\n' {
            cur_line += 1;
            cur_column = 1;
        } else {
            cur_column += 1;
        }
    }
    sql.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_table() {
        let stmts = parse("CREATE TABLE foo (id int PRIMARY KEY)").unwrap();
        assert_eq!(stmts.len(), 1);
        assert!(matches!(stmts[0].ast, Statement::CreateTable(_)));
        assert_eq!(stmts[0].sql, "CREATE TABLE foo (id int PRIMARY KEY)");
    }

    #[test]
    fn test_parse_splits_statement_text() {
        let stmts =
            parse("CREATE INDEX a_idx ON foo (a); CREATE INDEX b_idx ON foo (b)").unwrap();
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].sql, "CREATE INDEX a_idx ON foo (a)");
        assert_eq!(stmts[1].sql, "CREATE INDEX b_idx ON foo (b)");
    }

    #[test]
    fn test_parse_keeps_semicolons_inside_literals() {
        let stmts = parse("CREATE TYPE sep AS ENUM (';', ',');\nDROP TABLE foo").unwrap();
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].sql, "CREATE TYPE sep AS ENUM (';', ',')");
        assert_eq!(stmts[1].sql, "DROP TABLE foo");
    }

    #[test]
    fn test_parse_trailing_semicolon() {
        let stmts = parse("DROP TABLE foo;").unwrap();
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].sql, "DROP TABLE foo");
    }

    #[test]
    fn test_parse_error_propagates() {
        assert!(parse("CREATE TABLE").is_err());
    }
}
