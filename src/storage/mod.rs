//! Storage engine module
//!
//! This module contains the storage engine components:
//! - Value and row representation with the line codec
//! - Per-table row, schema, and index files
//! - In-memory secondary indexes

pub mod engine;
pub mod index;
pub mod row;

pub use engine::StorageEngine;
pub use index::Index;
pub use row::{Row, Value};
