//! flatdb - A small file-backed relational database engine written in Rust
//!
//! This library provides the core components for a SQL database:
//! - SQL parsing into command records
//! - Schema catalog with on-disk persistence
//! - Flat-file row storage with secondary indexes
//! - Query execution (filtering, joins, ordering)

pub mod catalog;
pub mod database;
pub mod error;
pub mod executor;
pub mod sql;
pub mod storage;

pub use database::Database;
pub use error::{Error, Result};
