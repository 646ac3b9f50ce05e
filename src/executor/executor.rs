//! Query Executor for flatdb
//!
//! This module executes parsed commands and returns results. It owns
//! the storage engine and the in-memory index cache, and is the single
//! place where data files and index files are kept consistent.

use log::debug;
use serde::Serialize;
use std::collections::HashMap;

use crate::catalog::{Column, TableSchema};
use crate::error::{Error, Result};
use crate::sql::command::{Command, CompareOp, Comparison, Condition, FromClause, JoinType};
use crate::storage::{Index, Row, StorageEngine, Value};

/// Query result
///
/// One shape for every command: SELECT fills `rows` and sets
/// `rowcount` to the number returned; mutating commands leave `rows`
/// as None and report the number of affected rows.
#[derive(Debug, Serialize)]
pub struct QueryResult {
    /// Result column labels, in projection order
    pub columns: Vec<String>,
    /// Result rows, one value per column; None for mutations
    pub rows: Option<Vec<Vec<Value>>>,
    /// Number of returned or affected rows
    pub rowcount: usize,
}

impl QueryResult {
    /// Create a result for a mutating command
    pub fn affected(rowcount: usize) -> Self {
        Self {
            columns: Vec::new(),
            rows: None,
            rowcount,
        }
    }

    /// Create a result carrying a row set
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let rowcount = rows.len();
        Self {
            columns,
            rows: Some(rows),
            rowcount,
        }
    }
}

/// Execution engine: dispatches commands, maintains indexes
pub struct Executor {
    /// Storage engine
    storage: StorageEngine,
    /// Index cache: table -> column -> index
    indexes: HashMap<String, HashMap<String, Index>>,
}

impl Executor {
    /// Create an executor over the given storage engine
    pub fn new(storage: StorageEngine) -> Self {
        Self {
            storage,
            indexes: HashMap::new(),
        }
    }

    /// The underlying storage engine
    pub fn storage(&self) -> &StorageEngine {
        &self.storage
    }

    /// Execute a parsed command
    pub fn execute(&mut self, command: Command) -> Result<QueryResult> {
        debug!("executing {:?}", command);
        match command {
            Command::CreateTable { table, columns } => self.execute_create_table(&table, columns),
            Command::Insert {
                table,
                columns,
                values,
            } => self.execute_insert(&table, columns, values),
            Command::Select {
                columns,
                from,
                where_clause,
                order_by,
            } => self.execute_select(columns, from, where_clause, order_by),
            Command::Update {
                table,
                assignments,
                where_clause,
            } => self.execute_update(&table, assignments, where_clause),
            Command::Delete {
                table,
                where_clause,
            } => self.execute_delete(&table, where_clause),
            Command::DropTable { table } => self.execute_drop_table(&table),
        }
    }

    // ========== CREATE TABLE ==========

    fn execute_create_table(&mut self, table: &str, columns: Vec<Column>) -> Result<QueryResult> {
        let schema = TableSchema::new(table, columns);
        self.storage.save_schema(table, &schema)?;
        self.storage.create_table_file(table)?;

        self.indexes.insert(table.to_string(), HashMap::new());
        for column in schema.indexed_columns() {
            self.create_index(table, &column.name)?;
        }

        Ok(QueryResult::affected(0))
    }

    /// Create an index on a column, populate it from the live rows,
    /// and persist it
    fn create_index(&mut self, table: &str, column: &str) -> Result<()> {
        let mut index = Index::new(table, column);
        index.rebuild(&self.storage.read_rows(table)?);
        index.save(&self.storage)?;
        self.indexes
            .entry(table.to_string())
            .or_default()
            .insert(column.to_string(), index);
        Ok(())
    }

    /// Populate the index cache for a table on first access: load each
    /// PK/UNIQUE index from disk, or rebuild it from the live rows when
    /// no index file exists. Without this a freshly opened database
    /// would miss primary key checks.
    fn ensure_indexes(&mut self, table: &str, schema: &TableSchema) -> Result<()> {
        if self.indexes.contains_key(table) {
            return Ok(());
        }

        let mut table_indexes = HashMap::new();
        let mut rows = None;
        for column in schema.indexed_columns() {
            let mut index = Index::new(table, &column.name);
            if self.storage.index_path(table, &column.name).exists() {
                index.load(&self.storage)?;
            } else {
                if rows.is_none() {
                    rows = Some(self.storage.read_rows(table)?);
                }
                index.rebuild(rows.as_deref().unwrap_or(&[]));
                index.save(&self.storage)?;
            }
            table_indexes.insert(column.name.clone(), index);
        }
        self.indexes.insert(table.to_string(), table_indexes);
        Ok(())
    }

    /// Rebuild every index of a table from the current rows and save.
    /// Required after any full-table rewrite, which renumbers rowids.
    fn rebuild_indexes(&mut self, table: &str) -> Result<()> {
        let rows = self.storage.read_rows(table)?;
        if let Some(table_indexes) = self.indexes.get_mut(table) {
            for index in table_indexes.values_mut() {
                index.rebuild(&rows);
                index.save(&self.storage)?;
            }
        }
        Ok(())
    }

    // ========== INSERT ==========

    fn execute_insert(
        &mut self,
        table: &str,
        columns: Option<Vec<String>>,
        values: Vec<Value>,
    ) -> Result<QueryResult> {
        let schema = self.storage.load_schema(table)?;

        let row: HashMap<String, Value> = match columns {
            None => {
                if values.len() != schema.column_count() {
                    return Err(Error::ColumnCountMismatch {
                        expected: schema.column_count(),
                        found: values.len(),
                    });
                }
                schema
                    .column_names()
                    .iter()
                    .map(|name| name.to_string())
                    .zip(values)
                    .collect()
            }
            Some(columns) => columns.into_iter().zip(values).collect(),
        };

        schema
            .validate_row(&row)
            .map_err(Error::NotNullViolation)?;

        self.ensure_indexes(table, &schema)?;

        // Primary key uniqueness via the in-memory index
        for pk_column in schema.primary_key() {
            if let Some(value) = row.get(pk_column) {
                if !value.is_null() && self.index_contains(table, pk_column, value) {
                    return Err(Error::DuplicateKey {
                        column: pk_column.to_string(),
                        value: value.to_string(),
                    });
                }
            }
        }

        let rowid = self.storage.insert_row(table, &row)?;

        if let Some(table_indexes) = self.indexes.get_mut(table) {
            for (column, index) in table_indexes.iter_mut() {
                match row.get(column) {
                    None | Some(Value::Null) => {}
                    Some(value) => index.add(value.clone(), rowid),
                }
            }
            for index in table_indexes.values() {
                index.save(&self.storage)?;
            }
        }

        Ok(QueryResult::affected(1))
    }

    fn index_contains(&self, table: &str, column: &str, value: &Value) -> bool {
        self.indexes
            .get(table)
            .and_then(|table_indexes| table_indexes.get(column))
            .map(|index| index.contains(value))
            .unwrap_or(false)
    }

    // ========== SELECT ==========

    fn execute_select(
        &mut self,
        columns: Vec<String>,
        from: FromClause,
        where_clause: Option<Condition>,
        order_by: Option<Vec<String>>,
    ) -> Result<QueryResult> {
        match from {
            FromClause::Table(table) => {
                self.execute_simple_select(&table, columns, where_clause, order_by)
            }
            FromClause::Join {
                join_type,
                left,
                right,
                left_column,
                right_column,
            } => self.execute_join_select(
                join_type,
                &left,
                &right,
                &left_column,
                &right_column,
                columns,
                where_clause,
                order_by,
            ),
        }
    }

    fn execute_simple_select(
        &mut self,
        table: &str,
        columns: Vec<String>,
        where_clause: Option<Condition>,
        order_by: Option<Vec<String>>,
    ) -> Result<QueryResult> {
        let schema = self.storage.load_schema(table)?;
        let rows = self.storage.read_rows(table)?;

        let mut filtered = Vec::new();
        for row in rows {
            if matches_condition(&row.values, where_clause.as_ref())? {
                filtered.push(row);
            }
        }

        let selected: Vec<String> = if columns == ["*"] {
            schema.column_names().iter().map(|n| n.to_string()).collect()
        } else {
            columns
        };

        let mut result_rows: Vec<Vec<Value>> = filtered
            .iter()
            .map(|row| {
                selected
                    .iter()
                    .map(|column| row.get(column).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        if let Some(order_columns) = order_by {
            apply_order_by(&selected, &mut result_rows, &order_columns);
        }

        Ok(QueryResult::with_rows(selected, result_rows))
    }

    #[allow(clippy::too_many_arguments)]
    fn execute_join_select(
        &mut self,
        join_type: JoinType,
        left_table: &str,
        right_table: &str,
        left_column: &str,
        right_column: &str,
        columns: Vec<String>,
        where_clause: Option<Condition>,
        order_by: Option<Vec<String>>,
    ) -> Result<QueryResult> {
        let left_schema = self.storage.load_schema(left_table)?;
        let right_schema = self.storage.load_schema(right_table)?;

        let left_rows = self.storage.read_rows(left_table)?;
        let right_rows = self.storage.read_rows(right_table)?;

        let joined = hash_join(left_rows, right_rows, left_column, right_column, join_type);

        // The join WHERE sees every column of both rows under its
        // qualified name and its bare name; a shared bare name takes
        // the right side's value.
        let mut filtered = Vec::new();
        for pair in joined {
            let merged = merge_join_values(&pair, left_table, right_table);
            if matches_condition(&merged, where_clause.as_ref())? {
                filtered.push(pair);
            }
        }

        let (selected, result_rows) = if columns == ["*"] {
            let mut selected = Vec::new();
            for column in left_schema.column_names() {
                selected.push(format!("{}.{}", left_table, column));
            }
            for column in right_schema.column_names() {
                selected.push(format!("{}.{}", right_table, column));
            }

            let rows: Vec<Vec<Value>> = filtered
                .iter()
                .map(|(left, right)| {
                    let mut out = Vec::new();
                    for column in left_schema.column_names() {
                        out.push(side_value(left.as_ref(), column));
                    }
                    for column in right_schema.column_names() {
                        out.push(side_value(right.as_ref(), column));
                    }
                    out
                })
                .collect();
            (selected, rows)
        } else {
            let rows: Vec<Vec<Value>> = filtered
                .iter()
                .map(|(left, right)| {
                    columns
                        .iter()
                        .map(|selector| match selector.split_once('.') {
                            Some((table, column)) if table == left_table => {
                                side_value(left.as_ref(), column)
                            }
                            Some((table, column)) if table == right_table => {
                                side_value(right.as_ref(), column)
                            }
                            Some(_) => Value::Null,
                            // bare name: search left first, then right
                            None => match left.as_ref().and_then(|row| row.get(selector)) {
                                Some(value) => value.clone(),
                                None => side_value(right.as_ref(), selector),
                            },
                        })
                        .collect::<Vec<Value>>()
                })
                .collect();
            (columns, rows)
        };

        let mut result_rows = result_rows;
        if let Some(order_columns) = order_by {
            apply_order_by(&selected, &mut result_rows, &order_columns);
        }

        Ok(QueryResult::with_rows(selected, result_rows))
    }

    // ========== UPDATE ==========

    fn execute_update(
        &mut self,
        table: &str,
        assignments: Vec<(String, Value)>,
        where_clause: Comparison,
    ) -> Result<QueryResult> {
        let schema = self.storage.load_schema(table)?;
        self.ensure_indexes(table, &schema)?;

        let mut rows = self.storage.read_rows(table)?;
        let mut updated = 0;

        for row in &mut rows {
            // WHERE compares for equality regardless of the written operator
            if !matches_equality(row, &where_clause) {
                continue;
            }
            for (column, value) in &assignments {
                row.values.insert(column.clone(), value.clone());
            }
            updated += 1;
        }

        if updated > 0 {
            self.storage.rewrite_table(table, &rows)?;
            self.rebuild_indexes(table)?;
        }

        Ok(QueryResult::affected(updated))
    }

    // ========== DELETE ==========

    fn execute_delete(
        &mut self,
        table: &str,
        where_clause: Option<Comparison>,
    ) -> Result<QueryResult> {
        let schema = self.storage.load_schema(table)?;
        self.ensure_indexes(table, &schema)?;

        let rows = self.storage.read_rows(table)?;
        let total = rows.len();

        // Without a WHERE every row is deleted; with one, equality only
        let kept: Vec<Row> = match &where_clause {
            None => Vec::new(),
            Some(comparison) => rows
                .into_iter()
                .filter(|row| !matches_equality(row, comparison))
                .collect(),
        };
        let deleted = total - kept.len();

        if deleted > 0 {
            self.storage.rewrite_table(table, &kept)?;
            self.rebuild_indexes(table)?;
        }

        Ok(QueryResult::affected(deleted))
    }

    // ========== DROP TABLE ==========

    fn execute_drop_table(&mut self, table: &str) -> Result<QueryResult> {
        let schema = self.storage.load_schema(table)?;
        let index_columns: Vec<String> = schema
            .indexed_columns()
            .iter()
            .map(|column| column.name.clone())
            .collect();

        self.storage.remove_table_files(table, &index_columns)?;
        self.indexes.remove(table);

        Ok(QueryResult::affected(0))
    }
}

// ========== Joins ==========

/// A joined record: either side is None only for outer joins
type JoinedPair = (Option<Row>, Option<Row>);

/// Hash join over a single equi-key.
///
/// The right side is loaded into a map keyed by join-key value; rows
/// with a null key on either side never match. RIGHT is computed by
/// swapping the inputs, running LEFT, and swapping the sides back.
fn hash_join(
    left_rows: Vec<Row>,
    right_rows: Vec<Row>,
    left_key: &str,
    right_key: &str,
    join_type: JoinType,
) -> Vec<JoinedPair> {
    if join_type == JoinType::Right {
        return hash_join(right_rows, left_rows, right_key, left_key, JoinType::Left)
            .into_iter()
            .map(|(left, right)| (right, left))
            .collect();
    }

    let mut right_map: HashMap<&Value, Vec<&Row>> = HashMap::new();
    for row in &right_rows {
        match row.get(right_key) {
            None | Some(Value::Null) => {}
            Some(value) => right_map.entry(value).or_default().push(row),
        }
    }

    let mut joined = Vec::new();
    for left_row in &left_rows {
        let matches = match left_row.get(left_key) {
            None | Some(Value::Null) => None,
            Some(value) => right_map.get(value),
        };
        match matches {
            Some(right_matches) => {
                for right_row in right_matches {
                    joined.push((Some(left_row.clone()), Some((*right_row).clone())));
                }
            }
            None => {
                if join_type == JoinType::Left {
                    joined.push((Some(left_row.clone()), None));
                }
            }
        }
    }
    joined
}

/// Value of a column on one side of a joined pair; Null when the side
/// is absent or lacks the column
fn side_value(side: Option<&Row>, column: &str) -> Value {
    side.and_then(|row| row.get(column))
        .cloned()
        .unwrap_or(Value::Null)
}

/// Merge both sides of a joined pair into one lookup map holding
/// qualified and bare keys
fn merge_join_values(
    pair: &JoinedPair,
    left_table: &str,
    right_table: &str,
) -> HashMap<String, Value> {
    let mut merged = HashMap::new();
    if let Some(left) = &pair.0 {
        for (key, value) in &left.values {
            merged.insert(format!("{}.{}", left_table, key), value.clone());
            merged.insert(key.clone(), value.clone());
        }
    }
    if let Some(right) = &pair.1 {
        for (key, value) in &right.values {
            merged.insert(format!("{}.{}", right_table, key), value.clone());
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

// ========== Condition evaluation ==========

fn matches_condition(
    values: &HashMap<String, Value>,
    condition: Option<&Condition>,
) -> Result<bool> {
    match condition {
        None => Ok(true),
        Some(condition) => evaluate_condition(values, condition),
    }
}

/// Evaluate a condition tree against a row's value map. AND and OR
/// short-circuit over their children.
fn evaluate_condition(values: &HashMap<String, Value>, condition: &Condition) -> Result<bool> {
    match condition {
        Condition::And(conditions) => {
            for child in conditions {
                if !evaluate_condition(values, child)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Condition::Or(conditions) => {
            for child in conditions {
                if evaluate_condition(values, child)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Condition::Compare(comparison) => evaluate_comparison(values, comparison),
    }
}

fn evaluate_comparison(values: &HashMap<String, Value>, comparison: &Comparison) -> Result<bool> {
    let null = Value::Null;
    // A qualified name falls back to its bare suffix when absent
    let actual = values
        .get(&comparison.column)
        .or_else(|| {
            comparison
                .column
                .split_once('.')
                .and_then(|(_, bare)| values.get(bare))
        })
        .unwrap_or(&null);
    let expected = &comparison.value;

    match comparison.op {
        CompareOp::Eq => Ok(values_equal(actual, expected)),
        CompareOp::Neq => Ok(!values_equal(actual, expected)),
        CompareOp::Gt => Ok(ordering_holds(actual, expected, |o| o.is_gt())),
        CompareOp::Lt => Ok(ordering_holds(actual, expected, |o| o.is_lt())),
        CompareOp::Gte => Ok(ordering_holds(actual, expected, |o| o.is_ge())),
        CompareOp::Lte => Ok(ordering_holds(actual, expected, |o| o.is_le())),
        CompareOp::Like => {
            if actual.is_null() || expected.is_null() {
                return Ok(false);
            }
            Ok(like_match(&actual.to_string(), &expected.to_string()))
        }
        CompareOp::In => Err(Error::Unsupported("operator IN".to_string())),
    }
}

/// Equality with null semantics: null equals only null; integers and
/// floats compare numerically across types
fn values_equal(a: &Value, b: &Value) -> bool {
    if a.is_null() || b.is_null() {
        return a.is_null() && b.is_null();
    }
    matches!(a.compare(b), Some(std::cmp::Ordering::Equal))
}

/// Ordering operators are false when the row value is null or the
/// types are incomparable
fn ordering_holds(
    actual: &Value,
    expected: &Value,
    holds: impl Fn(std::cmp::Ordering) -> bool,
) -> bool {
    if actual.is_null() {
        return false;
    }
    actual.compare(expected).map(holds).unwrap_or(false)
}

/// Case-insensitive LIKE with `%` as the only wildcard, matched from
/// the start of the string (the end is unanchored). `_` and escapes
/// are not supported.
fn like_match(actual: &str, pattern: &str) -> bool {
    let actual = actual.to_lowercase();
    let pattern = pattern.to_lowercase();
    let segments: Vec<&str> = pattern.split('%').collect();

    if !actual.starts_with(segments[0]) {
        return false;
    }
    let mut pos = segments[0].len();
    for segment in &segments[1..] {
        if segment.is_empty() {
            continue;
        }
        match actual[pos..].find(segment) {
            Some(offset) => pos += offset + segment.len(),
            None => return false,
        }
    }
    true
}

/// The equality-only WHERE used by UPDATE and DELETE
fn matches_equality(row: &Row, comparison: &Comparison) -> bool {
    row.get(&comparison.column)
        .map(|value| values_equal(value, &comparison.value))
        .unwrap_or(false)
}

// ========== ORDER BY ==========

/// Stable ascending sort with nulls last; non-null values compare as
/// lower-cased strings regardless of type. A column missing from the
/// projection sorts as null.
fn apply_order_by(columns: &[String], rows: &mut [Vec<Value>], order_columns: &[String]) {
    let positions: Vec<Option<usize>> = order_columns
        .iter()
        .map(|column| columns.iter().position(|c| c == column))
        .collect();

    rows.sort_by_cached_key(|row| {
        positions
            .iter()
            .map(|position| match position.and_then(|p| row.get(p)) {
                None | Some(Value::Null) => (true, String::new()),
                Some(value) => (false, value.to_string().to_lowercase()),
            })
            .collect::<Vec<_>>()
    });
}
