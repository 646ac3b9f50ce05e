//! Flat-file storage engine for flatdb
//!
//! Each table lives in the database directory as a `.tbl` row file and
//! a `.schema` file; every indexed column adds a `.idx` file. Rows are
//! identified by their 1-based line number at read time.

use log::debug;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use super::row::{self, Row, Value};
use crate::catalog::TableSchema;
use crate::error::{Error, Result};

/// Storage engine bound to one database directory
#[derive(Debug)]
pub struct StorageEngine {
    /// Database directory
    db_path: PathBuf,
}

impl StorageEngine {
    /// Open a storage engine, creating the directory if missing
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        fs::create_dir_all(&db_path)?;
        Ok(Self { db_path })
    }

    /// The database directory
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Path of a table's row file: `<db>/<t>.tbl`
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.db_path.join(format!("{}.tbl", table))
    }

    /// Path of a table's schema file: `<db>/<t>.schema`
    pub fn schema_path(&self, table: &str) -> PathBuf {
        self.db_path.join(format!("{}.schema", table))
    }

    /// Path of an index file: `<db>/<t>_<col>.idx`
    pub fn index_path(&self, table: &str, column: &str) -> PathBuf {
        self.db_path.join(format!("{}_{}.idx", table, column))
    }

    /// Check whether a table exists (its schema file is present)
    pub fn table_exists(&self, table: &str) -> bool {
        self.schema_path(table).exists()
    }

    /// Save a table schema as pretty-printed JSON, overwriting any
    /// previous file
    pub fn save_schema(&self, table: &str, schema: &TableSchema) -> Result<()> {
        let json = serde_json::to_string_pretty(schema)
            .map_err(|e| Error::Schema(format!("cannot serialize schema: {}", e)))?;
        fs::write(self.schema_path(table), json)?;
        debug!("saved schema for table '{}'", table);
        Ok(())
    }

    /// Load a table schema; fails with *table not found* when absent
    pub fn load_schema(&self, table: &str) -> Result<TableSchema> {
        let path = self.schema_path(table);
        if !path.exists() {
            return Err(Error::TableNotFound(table.to_string()));
        }
        let json = fs::read_to_string(path)?;
        let mut schema: TableSchema = serde_json::from_str(&json)
            .map_err(|e| Error::Schema(format!("invalid schema file for '{}': {}", table, e)))?;
        schema.rebuild_index();
        Ok(schema)
    }

    /// Create (or truncate) the table's row file
    pub fn create_table_file(&self, table: &str) -> Result<()> {
        File::create(self.table_path(table))?;
        Ok(())
    }

    /// Append one row, returning the new 1-based rowid.
    ///
    /// The rowid is the line count after the append; existing lines are
    /// counted before writing so the file is read only once.
    pub fn insert_row(&self, table: &str, values: &HashMap<String, Value>) -> Result<u64> {
        let schema = self.load_schema(table)?;
        let path = self.table_path(table);

        let existing = if path.exists() {
            BufReader::new(File::open(&path)?).lines().count() as u64
        } else {
            0
        };

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{}", row::encode_line(&schema, values))?;

        debug!("inserted row {} into '{}'", existing + 1, table);
        Ok(existing + 1)
    }

    /// Read every non-blank line as a row, assigning 1-based line
    /// numbers as rowids. A missing row file with a present schema
    /// reads as empty.
    pub fn read_rows(&self, table: &str) -> Result<Vec<Row>> {
        let schema = self.load_schema(table)?;
        let path = self.table_path(table);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut rows = Vec::new();
        for (line_num, line) in BufReader::new(File::open(path)?).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            rows.push(row::decode_line(&schema, &line, line_num as u64 + 1));
        }
        Ok(rows)
    }

    /// Overwrite the table file with the given rows, in order.
    ///
    /// Surviving rows are renumbered on the next read; callers must
    /// rebuild any indexes afterwards.
    pub fn rewrite_table(&self, table: &str, rows: &[Row]) -> Result<()> {
        let schema = self.load_schema(table)?;
        let mut file = File::create(self.table_path(table))?;
        for row in rows {
            writeln!(file, "{}", row::encode_line(&schema, &row.values))?;
        }
        debug!("rewrote '{}' with {} rows", table, rows.len());
        Ok(())
    }

    /// Remove the row identified by the given rowid, rewriting the file
    pub fn delete_row(&self, table: &str, rowid: u64) -> Result<bool> {
        let mut rows = self.read_rows(table)?;
        let before = rows.len();
        rows.retain(|row| row.rowid != rowid);
        if rows.len() == before {
            return Ok(false);
        }
        self.rewrite_table(table, &rows)?;
        Ok(true)
    }

    /// Remove the row file, schema file, and the given index files.
    ///
    /// Fails with *table not found* when the table does not exist, so a
    /// repeated DROP surfaces an error instead of silently passing.
    pub fn remove_table_files(&self, table: &str, index_columns: &[String]) -> Result<()> {
        if !self.table_exists(table) {
            return Err(Error::TableNotFound(table.to_string()));
        }

        for path in [self.table_path(table), self.schema_path(table)] {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        for column in index_columns {
            let path = self.index_path(table, column);
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        debug!("dropped table '{}'", table);
        Ok(())
    }

    /// Names of all tables in the directory, from their schema files
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let mut tables = Vec::new();
        for entry in fs::read_dir(&self.db_path)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("schema") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    tables.push(stem.to_string());
                }
            }
        }
        tables.sort();
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, DataType};
    use tempfile::tempdir;

    fn users_schema() -> TableSchema {
        TableSchema::new(
            "users",
            vec![
                Column::new("id", DataType::Integer).primary_key(true),
                Column::new("name", DataType::Varchar).length(50),
            ],
        )
    }

    fn values(id: i64, name: &str) -> HashMap<String, Value> {
        let mut map = HashMap::new();
        map.insert("id".to_string(), Value::Integer(id));
        map.insert("name".to_string(), Value::String(name.to_string()));
        map
    }

    #[test]
    fn test_paths() {
        let dir = tempdir().unwrap();
        let storage = StorageEngine::new(dir.path()).unwrap();
        assert_eq!(
            storage.table_path("users"),
            dir.path().join("users.tbl")
        );
        assert_eq!(
            storage.schema_path("users"),
            dir.path().join("users.schema")
        );
        assert_eq!(
            storage.index_path("users", "id"),
            dir.path().join("users_id.idx")
        );
    }

    #[test]
    fn test_schema_round_trip() {
        let dir = tempdir().unwrap();
        let storage = StorageEngine::new(dir.path()).unwrap();

        storage.save_schema("users", &users_schema()).unwrap();
        let loaded = storage.load_schema("users").unwrap();
        assert_eq!(loaded.name, "users");
        assert_eq!(loaded.column_names(), vec!["id", "name"]);
        assert!(loaded.get_column("id").unwrap().primary_key);
    }

    #[test]
    fn test_load_schema_missing_table() {
        let dir = tempdir().unwrap();
        let storage = StorageEngine::new(dir.path()).unwrap();
        assert!(matches!(
            storage.load_schema("ghost"),
            Err(Error::TableNotFound(_))
        ));
    }

    #[test]
    fn test_insert_assigns_line_numbers() {
        let dir = tempdir().unwrap();
        let storage = StorageEngine::new(dir.path()).unwrap();
        storage.save_schema("users", &users_schema()).unwrap();
        storage.create_table_file("users").unwrap();

        assert_eq!(storage.insert_row("users", &values(1, "Alice")).unwrap(), 1);
        assert_eq!(storage.insert_row("users", &values(2, "Bob")).unwrap(), 2);

        let rows = storage.read_rows("users").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].rowid, 1);
        assert_eq!(rows[1].rowid, 2);
        assert_eq!(rows[1].get("name"), Some(&Value::String("Bob".into())));
    }

    #[test]
    fn test_read_rows_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let storage = StorageEngine::new(dir.path()).unwrap();
        storage.save_schema("users", &users_schema()).unwrap();
        assert!(storage.read_rows("users").unwrap().is_empty());
    }

    #[test]
    fn test_delete_row_renumbers_survivors() {
        let dir = tempdir().unwrap();
        let storage = StorageEngine::new(dir.path()).unwrap();
        storage.save_schema("users", &users_schema()).unwrap();
        storage.create_table_file("users").unwrap();
        storage.insert_row("users", &values(1, "Alice")).unwrap();
        storage.insert_row("users", &values(2, "Bob")).unwrap();
        storage.insert_row("users", &values(3, "Cleo")).unwrap();

        assert!(storage.delete_row("users", 2).unwrap());
        assert!(!storage.delete_row("users", 9).unwrap());

        let rows = storage.read_rows("users").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("id"), Some(&Value::Integer(1)));
        assert_eq!(rows[1].get("id"), Some(&Value::Integer(3)));
        // the surviving third row now reads as line 2
        assert_eq!(rows[1].rowid, 2);
    }

    #[test]
    fn test_remove_table_files() {
        let dir = tempdir().unwrap();
        let storage = StorageEngine::new(dir.path()).unwrap();
        storage.save_schema("users", &users_schema()).unwrap();
        storage.create_table_file("users").unwrap();

        storage
            .remove_table_files("users", &["id".to_string()])
            .unwrap();
        assert!(!storage.table_exists("users"));

        // a second drop fails with not-found
        assert!(matches!(
            storage.remove_table_files("users", &[]),
            Err(Error::TableNotFound(_))
        ));
    }

    #[test]
    fn test_list_tables() {
        let dir = tempdir().unwrap();
        let storage = StorageEngine::new(dir.path()).unwrap();
        storage.save_schema("users", &users_schema()).unwrap();
        storage.save_schema("orders", &users_schema()).unwrap();
        assert_eq!(storage.list_tables().unwrap(), vec!["orders", "users"]);
    }
}
