//! Database module
//!
//! This module provides all database functionality for k2db, organized into:
//!
//! - **core**: Core database infrastructure (SQLite connection, schema, filters, SQL generation)
//! - **manager**: `DatabaseManager`, the connection owner feature managers build on
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/            # Foundation
//! │   ├── connection   # SQLite DatabaseConn wrapper
//! │   ├── schema       # Table declarations and ManagerSchema
//! │   ├── filter       # Column/value pairs for CRUD calls
//! │   └── query        # SQL text generation
//! │
//! └── manager          # DatabaseManager: table creation, CRUD, close
//! ```
//!
//! # Usage
//!
//! A feature declares its tables once on a marker type and wraps a manager
//! with its own methods:
//!
//! ```rust,ignore
//! use k2db::database::{DatabaseManager, Filter, ManagerSchema, TableDef};
//!
//! struct Restrictions;
//!
//! impl ManagerSchema for Restrictions {
//!     const NAME: &'static str = "RestrictionsDatabaseManager";
//!     const TABLES: &'static [TableDef] = &[TableDef {
//!         name: "timed_restrictions",
//!         columns: &[("user_id", "INTEGER"), ("restriction", "TEXT"), ("end_time", "INTEGER")],
//!     }];
//! }
//!
//! let db = DatabaseManager::open_managed::<Restrictions, _>(&config, "restrictions.sqlite3")?;
//! db.insert("timed_restrictions", &Filter::new()
//!     .with("user_id", 42)
//!     .with("restriction", "muted".to_string())
//!     .with("end_time", 1_700_000_000))?;
//! ```

pub mod core;
pub mod manager;

pub use self::core::{
    ColumnSchema, DatabaseConn, Filter, ManagerSchema, Schema, TableDef, TableSchema,
};
pub use manager::{DatabaseManager, Record, RowIter};
