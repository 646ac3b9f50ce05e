//! Database façade
//!
//! A `Database` binds a storage engine and an executor to one database
//! directory and exposes the single `execute(sql)` entry point used by
//! outer layers (REPL, HTTP, tests).

use std::path::Path;

use crate::error::Result;
use crate::executor::{Executor, QueryResult};
use crate::sql;
use crate::storage::StorageEngine;

/// Main database interface
pub struct Database {
    executor: Executor,
}

impl Database {
    /// Open a database at the given directory, creating it if missing.
    /// Opening the same directory twice is idempotent.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let storage = StorageEngine::new(db_path.as_ref())?;
        Ok(Self {
            executor: Executor::new(storage),
        })
    }

    /// Parse and execute one SQL statement
    pub fn execute(&mut self, sql: &str) -> Result<QueryResult> {
        let command = sql::parse(sql)?;
        self.executor.execute(command)
    }

    /// Names of all tables in the database, sorted
    pub fn list_tables(&self) -> Result<Vec<String>> {
        self.executor.storage().list_tables()
    }

    /// Human-readable schema description for one table
    pub fn table_info(&self, table: &str) -> Result<String> {
        let schema = self.executor.storage().load_schema(table)?;
        Ok(schema.describe())
    }

    /// Close the database. Currently a no-op, reserved for future use.
    pub fn close(&mut self) {}
}
