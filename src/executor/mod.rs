//! Query execution module
//!
//! This module dispatches parsed commands against the storage engine.

pub mod executor;

pub use executor::{Executor, QueryResult};
