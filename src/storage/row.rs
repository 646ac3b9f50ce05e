//! Value and row types for flatdb
//!
//! This module defines how data values are represented in memory and
//! how rows are encoded as lines of the table file.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::catalog::{DataType, TableSchema};

/// A value in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value (64-bit)
    Integer(i64),
    /// Float value (64-bit)
    Float(f64),
    /// String value
    String(String),
}

// Implement PartialEq manually to support Float via bitwise comparison,
// so values can key index maps and join hash maps.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(v) => v.hash(state),
            Value::Integer(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::String(v) => v.hash(state),
        }
    }
}

impl Value {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Compare two values (for WHERE ordering operators).
    ///
    /// Integers and floats compare numerically across types; strings
    /// compare lexicographically. NULL only equals NULL; any other
    /// mixed-type pair is incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Null, _) | (_, Value::Null) => None,

            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),

            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),

            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),

            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Integer(i) => write!(f, "{}", i),
            // whole floats keep a trailing .0 so they stay floats on decode
            Value::Float(n) if n.fract() == 0.0 && n.is_finite() => write!(f, "{:.1}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// A row read from a table file
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Column name to value mapping
    pub values: HashMap<String, Value>,
    /// 1-based line number in the table file at read time
    pub rowid: u64,
}

impl Row {
    /// Create a row with the given values and rowid
    pub fn new(values: HashMap<String, Value>, rowid: u64) -> Self {
        Self { values, rowid }
    }

    /// Get a value by column name
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }
}

/// Encode a row map as one table-file line, fields in schema order.
///
/// NULL becomes the literal `NULL`; a literal comma inside a value is
/// escaped as `\,`. No other escaping is performed.
pub fn encode_line(schema: &TableSchema, values: &HashMap<String, Value>) -> String {
    let fields: Vec<String> = schema
        .columns()
        .iter()
        .map(|col| match values.get(&col.name) {
            None | Some(Value::Null) => "NULL".to_string(),
            Some(value) => value.to_string().replace(',', "\\,"),
        })
        .collect();
    fields.join(",")
}

/// Decode one table-file line under the given schema.
///
/// Fields split on unescaped commas. `NULL` decodes to null; INTEGER
/// columns parse as i64 with an f64 fallback so floats survive the
/// round trip; BOOLEAN compares case-insensitively with "true";
/// string types reverse the comma escape.
pub fn decode_line(schema: &TableSchema, line: &str, rowid: u64) -> Row {
    let fields = split_escaped(line);
    let mut values = HashMap::new();

    for (col, raw) in schema.columns().iter().zip(fields) {
        let value = if raw == "NULL" {
            Value::Null
        } else {
            match col.dtype {
                DataType::Integer => raw
                    .parse::<i64>()
                    .map(Value::Integer)
                    .or_else(|_| raw.parse::<f64>().map(Value::Float))
                    .unwrap_or_else(|_| Value::String(raw.clone())),
                DataType::Boolean => Value::Boolean(raw.eq_ignore_ascii_case("true")),
                DataType::Varchar | DataType::Date => Value::String(raw.replace("\\,", ",")),
            }
        };
        values.insert(col.name.clone(), value);
    }

    Row::new(values, rowid)
}

/// Split a line on commas not preceded by a backslash.
fn split_escaped(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut prev_backslash = false;

    for ch in line.chars() {
        if ch == ',' && !prev_backslash {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
        prev_backslash = ch == '\\';
    }
    fields.push(current);
    fields
}
