//! Secondary indexes for flatdb
//!
//! An index is bound to one `(table, column)` pair and maps each value
//! to the set of rowids currently holding it. NULL values are never
//! indexed. The on-disk form is a JSON array of `[value, [rowids]]`
//! pairs; the format is opaque to callers but stable within a build.

use log::debug;
use std::collections::{BTreeSet, HashMap};
use std::fs;

use super::engine::StorageEngine;
use super::row::{Row, Value};
use crate::error::{Error, Result};

/// In-memory inverted map `value -> {rowid}` for one column
#[derive(Debug, Clone)]
pub struct Index {
    /// Table this index belongs to
    table: String,
    /// Indexed column
    column: String,
    /// Value to rowid-set mapping
    map: HashMap<Value, BTreeSet<u64>>,
}

impl Index {
    /// Create an empty index for `(table, column)`
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            map: HashMap::new(),
        }
    }

    /// The indexed column name
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Insert a rowid into the bucket for `value`, creating the bucket
    /// if absent. Callers skip NULL values.
    pub fn add(&mut self, value: Value, rowid: u64) {
        self.map.entry(value).or_default().insert(rowid);
    }

    /// Remove a rowid from the bucket for `value`, deleting the bucket
    /// when it empties
    pub fn remove(&mut self, value: &Value, rowid: u64) {
        if let Some(bucket) = self.map.get_mut(value) {
            bucket.remove(&rowid);
            if bucket.is_empty() {
                self.map.remove(value);
            }
        }
    }

    /// The rowids holding `value`; empty on a miss
    pub fn get(&self, value: &Value) -> BTreeSet<u64> {
        self.map.get(value).cloned().unwrap_or_default()
    }

    /// Is any row holding `value`?
    pub fn contains(&self, value: &Value) -> bool {
        self.map.contains_key(value)
    }

    /// Number of distinct indexed values
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Is the index empty?
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Clear and re-add every non-null value from the given rows.
    ///
    /// Full-table rewrites renumber rowids, so indexes are rebuilt
    /// rather than patched after UPDATE and DELETE.
    pub fn rebuild(&mut self, rows: &[Row]) {
        self.map.clear();
        for row in rows {
            match row.get(&self.column) {
                None | Some(Value::Null) => {}
                Some(value) => self.add(value.clone(), row.rowid),
            }
        }
    }

    /// Persist the index to its `.idx` file
    pub fn save(&self, storage: &StorageEngine) -> Result<()> {
        let entries: Vec<(&Value, Vec<u64>)> = self
            .map
            .iter()
            .map(|(value, rowids)| (value, rowids.iter().copied().collect()))
            .collect();
        let json = serde_json::to_string(&entries)
            .map_err(|e| Error::Execution(format!("cannot serialize index: {}", e)))?;
        fs::write(storage.index_path(&self.table, &self.column), json)?;
        debug!("saved index {}_{}", self.table, self.column);
        Ok(())
    }

    /// Load the index from its `.idx` file; a missing file loads empty
    pub fn load(&mut self, storage: &StorageEngine) -> Result<()> {
        let path = storage.index_path(&self.table, &self.column);
        if !path.exists() {
            self.map.clear();
            return Ok(());
        }
        let json = fs::read_to_string(path)?;
        let entries: Vec<(Value, Vec<u64>)> = serde_json::from_str(&json)
            .map_err(|e| Error::Execution(format!("invalid index file: {}", e)))?;
        self.map = entries
            .into_iter()
            .map(|(value, rowids)| (value, rowids.into_iter().collect()))
            .collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as StdHashMap;
    use tempfile::tempdir;

    #[test]
    fn test_add_get_remove() {
        let mut index = Index::new("users", "id");
        index.add(Value::Integer(1), 1);
        index.add(Value::Integer(1), 4);
        index.add(Value::Integer(2), 2);

        assert!(index.contains(&Value::Integer(1)));
        assert_eq!(index.get(&Value::Integer(1)), BTreeSet::from([1, 4]));
        assert!(index.get(&Value::Integer(9)).is_empty());

        index.remove(&Value::Integer(1), 1);
        assert_eq!(index.get(&Value::Integer(1)), BTreeSet::from([4]));

        // removing the last rowid deletes the bucket
        index.remove(&Value::Integer(1), 4);
        assert!(!index.contains(&Value::Integer(1)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let storage = StorageEngine::new(dir.path()).unwrap();

        let mut index = Index::new("users", "email");
        index.add(Value::String("a@x".into()), 1);
        index.add(Value::String("b@x".into()), 2);
        index.save(&storage).unwrap();

        let mut loaded = Index::new("users", "email");
        loaded.load(&storage).unwrap();
        assert_eq!(loaded.get(&Value::String("a@x".into())), BTreeSet::from([1]));
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let storage = StorageEngine::new(dir.path()).unwrap();

        let mut index = Index::new("users", "id");
        index.add(Value::Integer(5), 1);
        index.load(&storage).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_rebuild_skips_nulls() {
        let mut index = Index::new("users", "email");

        let mut with_email = StdHashMap::new();
        with_email.insert("email".to_string(), Value::String("a@x".into()));
        let mut without_email = StdHashMap::new();
        without_email.insert("email".to_string(), Value::Null);

        let rows = vec![Row::new(with_email, 1), Row::new(without_email, 2)];
        index.rebuild(&rows);

        assert_eq!(index.len(), 1);
        assert_eq!(index.get(&Value::String("a@x".into())), BTreeSet::from([1]));
    }
}
