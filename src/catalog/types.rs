//! Data types for flatdb
//!
//! This module defines the SQL data types supported by the database.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// SQL Data Types
///
/// The on-disk representation is the uppercase short form (`INT`,
/// `VARCHAR`, `BOOLEAN`, `DATE`); loading a schema with any other
/// type string fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Signed integer
    #[serde(rename = "INT")]
    Integer,
    /// Variable-length character string with optional max length
    #[serde(rename = "VARCHAR")]
    Varchar,
    /// Boolean type
    #[serde(rename = "BOOLEAN")]
    Boolean,
    /// Date, stored and compared as a string
    #[serde(rename = "DATE")]
    Date,
}

impl DataType {
    /// Resolve a type name as written in SQL, accepting the common aliases.
    pub fn from_sql_name(name: &str) -> Result<Self> {
        match name.to_uppercase().as_str() {
            "INT" | "INTEGER" => Ok(DataType::Integer),
            "VARCHAR" | "TEXT" | "STRING" => Ok(DataType::Varchar),
            "BOOL" | "BOOLEAN" => Ok(DataType::Boolean),
            "DATE" => Ok(DataType::Date),
            other => Err(Error::UnknownDataType(other.to_string())),
        }
    }

    /// The canonical short form used in schema files.
    pub fn code(&self) -> &'static str {
        match self {
            DataType::Integer => "INT",
            DataType::Varchar => "VARCHAR",
            DataType::Boolean => "BOOLEAN",
            DataType::Date => "DATE",
        }
    }

    /// Check if values of this type are decoded as strings
    pub fn is_string(&self) -> bool {
        matches!(self, DataType::Varchar | DataType::Date)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
