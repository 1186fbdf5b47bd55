//! Error types for database manager operations.
//!
//! Manager-level logical errors (a bad schema declaration) are kept apart from
//! engine errors. Engine errors are further split into the kinds a caller can
//! reasonably recover from and everything else.

use rusqlite::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by [`DatabaseManager`](crate::DatabaseManager) and the schema types.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The schema declaration is unusable (empty, bad identifier, duplicates).
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// The database file could not be opened or configured.
    #[error("failed to open database at '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A UNIQUE, NOT NULL, CHECK, PRIMARY KEY or FOREIGN KEY constraint failed.
    #[error("constraint violation on table '{table}': {source}")]
    Constraint {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    /// The database file is locked by another connection.
    #[error("database busy while accessing table '{table}': {source}")]
    Busy {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Any other SQLite failure.
    #[error("database error: {0}")]
    Engine(#[from] rusqlite::Error),
}

impl DatabaseError {
    /// Classify an error raised while executing a statement against `table`.
    pub(crate) fn from_statement(table: &str, source: rusqlite::Error) -> Self {
        match source.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => DatabaseError::Constraint {
                table: table.to_string(),
                source,
            },
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
                DatabaseError::Busy {
                    table: table.to_string(),
                    source,
                }
            }
            _ => DatabaseError::Engine(source),
        }
    }

    /// Whether the operation may succeed if retried or issued with different values.
    ///
    /// Constraint violations and lock contention are recoverable; schema
    /// errors, open failures and other engine errors are not.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DatabaseError::Constraint { .. } | DatabaseError::Busy { .. }
        )
    }
}

/// Convenience alias for results with [`DatabaseError`].
pub type Result<T> = std::result::Result<T, DatabaseError>;
