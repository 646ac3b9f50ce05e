//! Error types for flatdb
//!
//! This module defines all error types used throughout the database engine.

use thiserror::Error;

/// The main error type for flatdb
#[derive(Error, Debug)]
pub enum Error {
    // ========== Parser Errors ==========
    #[error("Parse error: {0}")]
    Parse(String),

    // ========== Schema Errors ==========
    #[error("Schema error: unsupported data type '{0}'")]
    UnknownDataType(String),

    #[error("Schema error: expected {expected} values, got {found}")]
    ColumnCountMismatch { expected: usize, found: usize },

    #[error("Schema error: {0}")]
    Schema(String),

    // ========== Catalog Errors ==========
    #[error("Catalog error: table '{0}' not found")]
    TableNotFound(String),

    // ========== Constraint Errors ==========
    #[error("Constraint violation: duplicate primary key value '{value}' for column '{column}'")]
    DuplicateKey { column: String, value: String },

    #[error("Constraint violation: missing value for non-nullable column '{0}'")]
    NotNullViolation(String),

    // ========== Execution Errors ==========
    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Execution error: {0}")]
    Execution(String),

    // ========== I/O Errors ==========
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for flatdb operations
pub type Result<T> = std::result::Result<T, Error>;
