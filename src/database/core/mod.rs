//! Core database infrastructure
//!
//! This module provides the foundational pieces every database manager is built on:
//! - `DatabaseConn`: SQLite connection wrapper with configuration
//! - `Schema`: declarative table layout and identifier validation
//! - `Filter`: column/value pairs for CRUD calls
//! - `query`: SQL text generation from validated identifiers

mod connection;
mod filter;
pub mod query;
mod schema;

pub use connection::DatabaseConn;
pub use filter::Filter;
pub use schema::{ColumnSchema, ManagerSchema, Schema, TableDef, TableSchema};
