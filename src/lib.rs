#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! k2db - schema-driven SQLite data access for Kurisu2
//!
//! k2db gives every bot feature that needs persistence a [`DatabaseManager`]:
//! one SQLite file under the bot's configuration directory, tables created
//! from a declarative schema, and parameterized `select` / `count` / `insert`
//! / `delete` primitives validated against that schema.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | `cli` | `k2db` command-line tool (default) | `clap`, `tracing-subscriber` |
//!
//! ```toml
//! # Library only
//! k2db = { version = "0.3", default-features = false }
//! ```
//!
//! # Architecture
//!
//! - **[`database`]**: schema declaration, SQL generation, connection and manager
//! - **[`host`]**: what a manager needs from the hosting bot
//! - **[`config`]**: configuration loading (data directory)
//! - **[`error`]**: error taxonomy
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use k2db::{DatabaseManager, Filter, K2Config};
//!
//! let config = K2Config::new(&None)?;
//! let mut db = DatabaseManager::open_managed::<Warns, _>(&config, "warns.sqlite3")?;
//!
//! db.insert("warns", &Filter::new().with("user_id", 42).with("reason", "spam".to_string()))?;
//! let total = db.count("warns", &Filter::new().with("user_id", 42))?;
//! db.close();
//! ```
//!
//! # Commit policy
//!
//! Every statement runs in SQLite autocommit mode and is durable once the
//! primitive returns. `close` additionally commits a transaction a caller may
//! have opened on the raw connection.

pub mod config;
pub mod database;
pub mod error;
pub mod host;

pub use config::K2Config;
pub use database::{
    DatabaseConn, DatabaseManager, Filter, ManagerSchema, Record, RowIter, Schema, TableDef,
    TableSchema,
};
pub use error::{DatabaseError, Result};
pub use host::Host;
