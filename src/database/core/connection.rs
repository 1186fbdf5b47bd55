//! Database connection management
//!
//! This module provides the SQLite connection wrapper owned by each database manager.

use crate::error::{DatabaseError, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Core database connection wrapper
///
/// `DatabaseConn` provides a thin wrapper around SQLite connections,
/// handling both file-based and in-memory databases with consistent
/// configuration and error handling.
///
/// Statements run in autocommit mode: each one is committed when it finishes
/// unless a caller explicitly opened a transaction on [`DatabaseConn::conn`].
pub struct DatabaseConn {
    pub conn: Connection,
}

impl DatabaseConn {
    /// Open a database at the specified path
    ///
    /// If the path is `None`, an in-memory database is created.
    /// The file is created when it does not exist yet.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let (conn, location) = match path {
            Some(p) => (Connection::open(p), p.to_path_buf()),
            None => (Connection::open_in_memory(), PathBuf::from(":memory:")),
        };
        let conn = conn.map_err(|source| DatabaseError::Open {
            path: location.clone(),
            source,
        })?;

        let db = DatabaseConn { conn };
        db.configure().map_err(|source| DatabaseError::Open {
            path: location,
            source,
        })?;
        Ok(db)
    }

    /// Create an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::open(None)
    }

    /// Open an existing database file without writing to it.
    ///
    /// No pragmas are applied, so the file's journal mode is left untouched.
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| DatabaseError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(DatabaseConn { conn })
    }

    fn configure(&self) -> rusqlite::Result<()> {
        // WAL lets a second manager on the same file read while this one writes.
        // In-memory databases report "memory" and ignore the request.
        let _: String = self
            .conn
            .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;

        self.conn.execute_batch(
            "PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;",
        )?;

        Ok(())
    }

    /// Execute a SQL statement without parameters
    pub fn execute(&self, sql: &str) -> Result<usize> {
        Ok(self.conn.execute(sql, [])?)
    }

    /// Check if a table exists in the database
    ///
    /// SQLite table names are case-insensitive, so is this lookup.
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1 COLLATE NOCASE",
            [table_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Get the row count for a table
    ///
    /// `table_name` must be a validated identifier.
    pub fn table_count(&self, table_name: &str) -> Result<u64> {
        let query = format!(
            "SELECT COUNT(*) FROM {}",
            super::query::quote_ident(table_name)
        );
        let count: u64 = self.conn.query_row(&query, [], |row| row.get(0))?;
        Ok(count)
    }

    /// Commit any open transaction and close the connection.
    ///
    /// Never fails; problems are logged and the handle is dropped regardless.
    pub fn close(self) {
        if !self.conn.is_autocommit() {
            if let Err(e) = self.conn.execute_batch("COMMIT") {
                warn!("Failed to commit pending transaction on close: {}", e);
            }
        }

        match self.conn.close() {
            Ok(()) => debug!("SQLite connection closed"),
            Err((conn, e)) => {
                warn!("Failed to close SQLite connection cleanly: {}", e);
                drop(conn);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = DatabaseConn::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_open_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.sqlite3");
        assert!(!path.exists());

        let db = DatabaseConn::open(Some(&path)).unwrap();
        db.close();
        assert!(path.exists());
    }

    #[test]
    fn test_open_failure_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("nested.sqlite3");

        match DatabaseConn::open(Some(&path)) {
            Err(DatabaseError::Open { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected open error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_table_exists() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY)")
            .unwrap();

        assert!(db.table_exists("test_table").unwrap());
        assert!(!db.table_exists("nonexistent_table").unwrap());
        assert!(db.table_exists("TEST_TABLE").unwrap());
        assert!(db.table_exists("Test_Table").unwrap());
    }

    #[test]
    fn test_open_read_only_keeps_journal_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.sqlite3");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE t (id INTEGER); INSERT INTO t VALUES (1);")
                .unwrap();
        }

        let db = DatabaseConn::open_read_only(&path).unwrap();
        assert_eq!(db.table_count("t").unwrap(), 1);
        let mode: String = db
            .conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "delete");
        assert!(db.execute("INSERT INTO t VALUES (2)").is_err());
        db.close();
    }

    #[test]
    fn test_open_read_only_does_not_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.sqlite3");
        assert!(matches!(
            DatabaseConn::open_read_only(&path),
            Err(DatabaseError::Open { .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_table_count() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY)")
            .unwrap();
        db.execute("INSERT INTO test_table (id) VALUES (1), (2), (3)")
            .unwrap();

        assert_eq!(db.table_count("test_table").unwrap(), 3);
    }

    #[test]
    fn test_close_commits_open_transaction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tx.sqlite3");

        let db = DatabaseConn::open(Some(&path)).unwrap();
        db.execute("CREATE TABLE t (id INTEGER)").unwrap();
        db.conn.execute_batch("BEGIN").unwrap();
        db.execute("INSERT INTO t (id) VALUES (1)").unwrap();
        assert!(!db.conn.is_autocommit());
        db.close();

        let db = DatabaseConn::open(Some(&path)).unwrap();
        assert_eq!(db.table_count("t").unwrap(), 1);
    }
}
