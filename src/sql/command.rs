//! Parsed SQL command records
//!
//! This module defines the tagged command variants the parser produces
//! and the executor dispatches on.

use std::fmt;

use crate::catalog::Column;
use crate::error::{Error, Result};
use crate::storage::Value;

/// A parsed SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// CREATE TABLE statement
    CreateTable {
        table: String,
        columns: Vec<Column>,
    },
    /// INSERT statement; `columns` is None for positional VALUES
    Insert {
        table: String,
        columns: Option<Vec<String>>,
        values: Vec<Value>,
    },
    /// SELECT statement
    Select {
        columns: Vec<String>,
        from: FromClause,
        where_clause: Option<Condition>,
        order_by: Option<Vec<String>>,
    },
    /// UPDATE statement; WHERE is mandatory and a single condition
    Update {
        table: String,
        assignments: Vec<(String, Value)>,
        where_clause: Comparison,
    },
    /// DELETE statement; without WHERE every row is deleted
    Delete {
        table: String,
        where_clause: Option<Comparison>,
    },
    /// DROP TABLE statement
    DropTable { table: String },
}

/// FROM clause of a SELECT
#[derive(Debug, Clone, PartialEq)]
pub enum FromClause {
    /// Single table
    Table(String),
    /// Two-table equi-join
    Join {
        join_type: JoinType,
        left: String,
        right: String,
        left_column: String,
        right_column: String,
    },
}

/// Type of JOIN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
}

/// WHERE clause shape: a flat conjunction, a flat disjunction, or a
/// single comparison. Nesting and AND/OR mixing are not supported.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Compare(Comparison),
}

/// A single `<column> <op> <literal>` condition
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Column name, possibly qualified as `table.col`
    pub column: String,
    /// Comparison operator
    pub op: CompareOp,
    /// Literal to compare against
    pub value: Value,
}

/// Comparison operators accepted by the WHERE grammar.
///
/// `In` parses but has no executor support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,
    Like,
    In,
}

impl CompareOp {
    /// Parse an operator as written in SQL
    pub fn from_sql(op: &str) -> Result<Self> {
        match op.to_uppercase().as_str() {
            "=" => Ok(CompareOp::Eq),
            "!=" => Ok(CompareOp::Neq),
            ">" => Ok(CompareOp::Gt),
            "<" => Ok(CompareOp::Lt),
            ">=" => Ok(CompareOp::Gte),
            "<=" => Ok(CompareOp::Lte),
            "LIKE" => Ok(CompareOp::Like),
            "IN" => Ok(CompareOp::In),
            other => Err(Error::Parse(format!("invalid operator '{}'", other))),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOp::Eq => "=",
            CompareOp::Neq => "!=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Gte => ">=",
            CompareOp::Lte => "<=",
            CompareOp::Like => "LIKE",
            CompareOp::In => "IN",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_parsing() {
        assert_eq!(CompareOp::from_sql("=").unwrap(), CompareOp::Eq);
        assert_eq!(CompareOp::from_sql(">=").unwrap(), CompareOp::Gte);
        assert_eq!(CompareOp::from_sql("like").unwrap(), CompareOp::Like);
        assert_eq!(CompareOp::from_sql("In").unwrap(), CompareOp::In);
        assert!(CompareOp::from_sql("=>").is_err());
    }
}
