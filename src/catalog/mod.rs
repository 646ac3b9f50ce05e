//! Catalog module
//!
//! This module contains the schema definitions and data types.

pub mod schema;
pub mod types;

pub use schema::{Column, TableSchema};
pub use types::DataType;
