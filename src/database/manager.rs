//! Schema-driven database manager
//!
//! A [`DatabaseManager`] owns one SQLite connection to one database file. On
//! open it creates every table of its [`Schema`] that does not exist yet; after
//! that it exposes the four CRUD primitives feature managers build on.
//!
//! Passing a table or column the schema does not declare, passing an empty
//! [`Filter`], or using a manager after [`DatabaseManager::close`] are
//! programming errors and panic before any SQL reaches SQLite. Failures
//! reported by SQLite itself are returned as [`DatabaseError`].
//!
//! ```rust
//! use k2db::database::{DatabaseManager, Filter, ManagerSchema, TableDef};
//! use rusqlite::types::Value;
//!
//! struct Users;
//!
//! impl ManagerSchema for Users {
//!     const NAME: &'static str = "UsersManager";
//!     const TABLES: &'static [TableDef] = &[TableDef {
//!         name: "users",
//!         columns: &[("id", "INTEGER PRIMARY KEY"), ("name", "TEXT")],
//!     }];
//! }
//!
//! let mut db = DatabaseManager::open_managed_in_memory::<Users>().unwrap();
//! db.insert("users", &Filter::new().with("id", 1).with("name", "alice".to_string()))
//!     .unwrap();
//!
//! let by_id = Filter::new().with("id", 1);
//! assert_eq!(db.count("users", &by_id).unwrap(), 1);
//! assert_eq!(
//!     db.select_all("users", &by_id).unwrap(),
//!     vec![vec![Value::Integer(1), Value::Text("alice".to_string())]]
//! );
//! assert_eq!(db.delete("users", &by_id).unwrap(), 1);
//! db.close();
//! ```

use crate::database::core::{query, DatabaseConn, Filter, ManagerSchema, Schema};
use crate::error::{DatabaseError, Result};
use crate::host::Host;
use rusqlite::types::Value;
use rusqlite::ToSql;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, debug_span, info, Span};

/// One result row, in the order SQLite returns the table's columns.
pub type Record = Vec<Value>;

/// Owns a connection and the schema that governs it.
///
/// The connection is closed by [`DatabaseManager::close`] or, at the latest,
/// when the manager is dropped. A manager must stay on one thread at a time.
pub struct DatabaseManager {
    name: String,
    path: PathBuf,
    schema: Arc<Schema>,
    span: Span,
    db: Option<DatabaseConn>,
}

impl DatabaseManager {
    /// Open `<host config directory>/<relative_path>` and create missing tables.
    pub fn open<H: Host + ?Sized>(
        host: &H,
        name: &str,
        relative_path: impl AsRef<Path>,
        schema: Arc<Schema>,
    ) -> Result<Self> {
        let path = host.config_directory().join(relative_path);
        let span = debug_span!(parent: &host.log_span(), "database", manager = name);
        Self::init(name, Some(path), schema, span)
    }

    /// Open the database for a manager type that declares its tables via [`ManagerSchema`].
    pub fn open_managed<M: ManagerSchema, H: Host + ?Sized>(
        host: &H,
        relative_path: impl AsRef<Path>,
    ) -> Result<Self> {
        Self::open(host, M::NAME, relative_path, Arc::new(M::schema()?))
    }

    /// Same as [`DatabaseManager::open`] against a private in-memory database.
    pub fn open_in_memory(name: &str, schema: Arc<Schema>) -> Result<Self> {
        let span = debug_span!("database", manager = name);
        Self::init(name, None, schema, span)
    }

    pub fn open_managed_in_memory<M: ManagerSchema>() -> Result<Self> {
        Self::open_in_memory(M::NAME, Arc::new(M::schema()?))
    }

    fn init(name: &str, path: Option<PathBuf>, schema: Arc<Schema>, span: Span) -> Result<Self> {
        let db = {
            let _guard = span.enter();
            debug!("Initializing {}", name);
            match &path {
                Some(p) => {
                    debug!("Loading sqlite3 database: {}", p.display());
                    DatabaseConn::open(Some(p))?
                }
                None => DatabaseConn::open_in_memory()?,
            }
        };

        let manager = DatabaseManager {
            name: name.to_string(),
            path: path.unwrap_or_else(|| PathBuf::from(":memory:")),
            schema,
            span,
            db: Some(db),
        };
        manager.create_tables()?;
        Ok(manager)
    }

    /// Create each schema table that is not in the database yet.
    ///
    /// Tables are created one by one; an existing table is left untouched.
    fn create_tables(&self) -> Result<()> {
        let _guard = self.span.enter();
        let db = self.live("CREATE TABLE");

        for table in self.schema.tables() {
            if db.table_exists(&table.name)? {
                debug!(
                    "{} table already exists in {}",
                    table.name,
                    self.path.display()
                );
                continue;
            }
            db.execute(&query::create_table_sql(table))?;
            info!("{} table created in {}", table.name, self.path.display());
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute path of the database file (`:memory:` for in-memory managers).
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn is_closed(&self) -> bool {
        self.db.is_none()
    }

    /// Get the underlying connection (for statements the primitives do not cover)
    ///
    /// # Panics
    ///
    /// Panics if the manager has been closed.
    pub fn connection(&self) -> &rusqlite::Connection {
        &self.live("raw access").conn
    }

    fn live(&self, op: &str) -> &DatabaseConn {
        match &self.db {
            Some(db) => db,
            None => panic!("{}: {} on closed database {}", self.name, op, self.path.display()),
        }
    }

    /// Shared preamble of every CRUD primitive.
    fn checked(&self, op: &str, table: &str, filter: &Filter) -> &DatabaseConn {
        let db = self.live(op);
        let schema = match self.schema.table(table) {
            Some(t) => t,
            None => panic!("{}: {} on unknown table '{}'", self.name, op, table),
        };
        assert!(
            !filter.is_empty(),
            "{}: {} on table '{}' with an empty filter",
            self.name,
            op,
            table
        );
        for column in filter.columns() {
            assert!(
                schema.has_column(column),
                "{}: {} on table '{}' with unknown column '{}'",
                self.name,
                op,
                table,
                column
            );
        }
        db
    }

    /// Run `SELECT *` for the rows matching every pair in `filter`.
    ///
    /// `consume` receives a lazy, single-pass iterator over the rows; the
    /// cursor stays open until it returns. The exclusive borrow keeps any other
    /// statement from being issued on this manager in the meantime.
    pub fn select<T, F>(&mut self, table: &str, filter: &Filter, consume: F) -> Result<T>
    where
        F: FnOnce(RowIter<'_>) -> Result<T>,
    {
        let _guard = self.span.enter();
        let db = self.checked("SELECT", table, filter);

        let sql = query::select_sql(table, filter);
        let mut stmt = db
            .conn
            .prepare_cached(&sql)
            .map_err(|e| DatabaseError::from_statement(table, e))?;
        let width = stmt.column_count();

        let named = query::named_params(filter);
        let rows = stmt
            .query(bind(&named).as_slice())
            .map_err(|e| DatabaseError::from_statement(table, e))?;
        debug!("Executed SELECT query `{}` with parameters {}", sql, filter);

        consume(RowIter {
            rows,
            width,
            table: table.to_string(),
        })
    }

    /// Collect every matching row.
    pub fn select_all(&mut self, table: &str, filter: &Filter) -> Result<Vec<Record>> {
        self.select(table, filter, |rows| rows.collect())
    }

    /// Number of rows matching every pair in `filter`.
    pub fn count(&self, table: &str, filter: &Filter) -> Result<u64> {
        let _guard = self.span.enter();
        let db = self.checked("SELECT COUNT", table, filter);

        let sql = query::count_sql(table, filter);
        let named = query::named_params(filter);
        let count: u64 = db
            .conn
            .prepare_cached(&sql)
            .and_then(|mut stmt| stmt.query_row(bind(&named).as_slice(), |row| row.get(0)))
            .map_err(|e| DatabaseError::from_statement(table, e))?;
        debug!(
            "Executed SELECT COUNT() query `{}` with parameters {}",
            sql, filter
        );
        Ok(count)
    }

    /// Insert one row built from `values`.
    ///
    /// Committed when this returns. Constraint failures come back as
    /// [`DatabaseError::Constraint`].
    pub fn insert(&self, table: &str, values: &Filter) -> Result<()> {
        let _guard = self.span.enter();
        let db = self.checked("INSERT", table, values);

        let sql = query::insert_sql(table, values);
        let named = query::named_params(values);
        db.conn
            .prepare_cached(&sql)
            .and_then(|mut stmt| stmt.execute(bind(&named).as_slice()))
            .map_err(|e| DatabaseError::from_statement(table, e))?;
        debug!("Executed INSERT query `{}` with parameters {}", sql, values);
        Ok(())
    }

    /// Delete the rows matching every pair in `filter`, returning how many went.
    pub fn delete(&self, table: &str, filter: &Filter) -> Result<usize> {
        let _guard = self.span.enter();
        let db = self.checked("DELETE", table, filter);

        let sql = query::delete_sql(table, filter);
        let named = query::named_params(filter);
        let deleted = db
            .conn
            .prepare_cached(&sql)
            .and_then(|mut stmt| stmt.execute(bind(&named).as_slice()))
            .map_err(|e| DatabaseError::from_statement(table, e))?;
        debug!(
            "Executed DELETE query `{}` with parameters {}, {} rows affected",
            sql, filter, deleted
        );
        Ok(deleted)
    }

    /// Commit pending work and close the connection.
    ///
    /// Safe to call any number of times; only the first call does anything.
    /// Never fails: errors from SQLite while closing are logged and dropped.
    pub fn close(&mut self) {
        let Some(db) = self.db.take() else {
            return;
        };
        let _guard = self.span.enter();
        db.close();
        debug!("Unloaded sqlite3 database: {}", self.path.display());
    }
}

impl Drop for DatabaseManager {
    fn drop(&mut self) {
        self.close();
    }
}

fn bind<'a>(named: &'a [(String, &'a dyn ToSql)]) -> Vec<(&'a str, &'a dyn ToSql)> {
    named.iter().map(|(n, v)| (n.as_str(), *v)).collect()
}

/// Lazy rows of one `SELECT`, each read into an owned [`Record`].
pub struct RowIter<'stmt> {
    rows: rusqlite::Rows<'stmt>,
    width: usize,
    table: String,
}

impl Iterator for RowIter<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.rows.next() {
            Ok(Some(row)) => Some(
                (0..self.width)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<rusqlite::Result<Record>>()
                    .map_err(DatabaseError::from),
            ),
            Ok(None) => None,
            Err(e) => Some(Err(DatabaseError::from_statement(&self.table, e))),
        }
    }
}
