//! Schema definitions for flatdb
//!
//! This module defines table schemas and column metadata.

use super::types::DataType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Column definition in a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name (lower-cased identifier)
    pub name: String,
    /// Data type
    pub dtype: DataType,
    /// Declared length; only meaningful for VARCHAR
    pub length: Option<usize>,
    /// Is this the primary key column?
    pub primary_key: bool,
    /// Is this column unique? Implied true when primary_key
    pub unique: bool,
    /// Is this column nullable? False iff NOT NULL appeared
    pub nullable: bool,
}

impl Column {
    /// Create a new plain column
    pub fn new(name: impl Into<String>, dtype: DataType) -> Self {
        Self {
            name: name.into(),
            dtype,
            length: None,
            primary_key: false,
            unique: false,
            nullable: true,
        }
    }

    /// Set the declared length
    pub fn length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    /// Set the primary key flag; a primary key is always unique
    pub fn primary_key(mut self, pk: bool) -> Self {
        self.primary_key = pk;
        if pk {
            self.unique = true;
        }
        self
    }

    /// Set the unique flag
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique || self.primary_key;
        self
    }

    /// Set the nullable flag
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Does this column carry an index (PRIMARY KEY or UNIQUE)?
    pub fn is_indexed(&self) -> bool {
        self.primary_key || self.unique
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.dtype)?;
        if let Some(len) = self.length {
            write!(f, "({})", len)?;
        }
        if self.primary_key {
            write!(f, " PRIMARY KEY")?;
        } else if self.unique {
            write!(f, " UNIQUE")?;
        }
        if !self.nullable {
            write!(f, " NOT NULL")?;
        }
        Ok(())
    }
}

/// Table schema - an ordered set of columns
///
/// Order matters: positional INSERT zips values against declaration
/// order, and encoded rows carry one field per column in this order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name
    pub name: String,
    /// Ordered list of columns
    columns: Vec<Column>,
    /// Column name to position mapping, rebuilt after deserialization
    #[serde(skip)]
    name_to_index: HashMap<String, usize>,
}

impl TableSchema {
    /// Create a schema from a list of columns
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let mut schema = Self {
            name: name.into(),
            columns,
            name_to_index: HashMap::new(),
        };
        schema.rebuild_index();
        schema
    }

    /// Rebuild the name lookup map; must be called after deserialization
    pub fn rebuild_index(&mut self) {
        self.name_to_index = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, col)| (col.name.clone(), idx))
            .collect();
    }

    /// Get column by name
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.name_to_index.get(name).map(|&idx| &self.columns[idx])
    }

    /// Check if a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// Get all columns in declaration order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get column names in declaration order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get primary key column names in declaration order
    pub fn primary_key(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Get the columns that carry an index (PRIMARY KEY or UNIQUE)
    pub fn indexed_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_indexed()).collect()
    }

    /// Validate a row map against schema constraints.
    ///
    /// Passes iff every non-nullable column is present as a key;
    /// a present-but-NULL value passes.
    pub fn validate_row<V>(&self, row: &HashMap<String, V>) -> Result<(), String> {
        for col in &self.columns {
            if !col.nullable && !row.contains_key(&col.name) {
                return Err(col.name.clone());
            }
        }
        Ok(())
    }

    /// Human-readable schema description (for the .schema meta-command)
    pub fn describe(&self) -> String {
        let mut info = format!("Table: {}\n", self.name);
        for col in &self.columns {
            info.push_str(&format!("  {}\n", col));
        }
        info
    }
}
