//! Declarative table schemas
//!
//! A schema is an ordered list of tables, each an ordered list of columns with
//! a raw SQL type/constraint declaration. It is used twice: to create missing
//! tables when a manager opens its database, and to validate every column name
//! a CRUD call passes in.
//!
//! Concrete managers declare their tables once per type through
//! [`ManagerSchema`]:
//!
//! ```rust
//! use k2db::database::{ManagerSchema, TableDef};
//!
//! struct Warns;
//!
//! impl ManagerSchema for Warns {
//!     const NAME: &'static str = "WarnsDatabaseManager";
//!     const TABLES: &'static [TableDef] = &[TableDef {
//!         name: "warns",
//!         columns: &[
//!             ("warn_id", "INTEGER PRIMARY KEY"),
//!             ("user_id", "INTEGER NOT NULL"),
//!             ("reason", "TEXT"),
//!         ],
//!     }];
//! }
//!
//! let schema = Warns::schema().unwrap();
//! assert!(schema.table("warns").unwrap().has_column("reason"));
//! ```

use crate::error::{DatabaseError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single column: identifier plus its SQL declaration (e.g. `INTEGER PRIMARY KEY`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub decl: String,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, decl: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            decl: decl.into(),
        }
    }
}

/// A table and its columns in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Append a column (builder style)
    pub fn column(mut self, name: impl Into<String>, decl: impl Into<String>) -> Self {
        self.columns.push(ColumnSchema::new(name, decl));
        self
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// Static table declaration used by [`ManagerSchema`] implementors.
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [(&'static str, &'static str)],
}

/// A validated, immutable set of tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    tables: Vec<TableSchema>,
}

#[derive(Deserialize)]
struct RawSchema {
    tables: Vec<TableSchema>,
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawSchema::deserialize(deserializer)?;
        Schema::new(raw.tables).map_err(serde::de::Error::custom)
    }
}

impl Schema {
    /// Build a schema, rejecting empty tables, bad identifiers and duplicates.
    ///
    /// Names are compared case-insensitively, as SQLite does.
    pub fn new(tables: Vec<TableSchema>) -> Result<Self> {
        if tables.is_empty() {
            return Err(DatabaseError::InvalidSchema(
                "schema declares no tables".to_string(),
            ));
        }

        let mut seen_tables = HashSet::new();
        for table in &tables {
            validate_identifier(&table.name)?;
            if !seen_tables.insert(table.name.to_ascii_lowercase()) {
                return Err(DatabaseError::InvalidSchema(format!(
                    "table '{}' declared more than once",
                    table.name
                )));
            }
            if table.columns.is_empty() {
                return Err(DatabaseError::InvalidSchema(format!(
                    "table '{}' declares no columns",
                    table.name
                )));
            }

            let mut seen_columns = HashSet::new();
            for column in &table.columns {
                validate_identifier(&column.name)?;
                if !seen_columns.insert(column.name.to_ascii_lowercase()) {
                    return Err(DatabaseError::InvalidSchema(format!(
                        "column '{}' declared more than once in table '{}'",
                        column.name, table.name
                    )));
                }
            }
        }

        Ok(Self { tables })
    }

    /// Build a schema from static declarations.
    pub fn from_defs(defs: &[TableDef]) -> Result<Self> {
        let tables = defs
            .iter()
            .map(|def| TableSchema {
                name: def.name.to_string(),
                columns: def
                    .columns
                    .iter()
                    .map(|(name, decl)| ColumnSchema::new(*name, *decl))
                    .collect(),
            })
            .collect();
        Self::new(tables)
    }

    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// Table layout of one concrete manager type.
///
/// The constants are fixed at type definition; every manager opened for the
/// type sees the same tables.
pub trait ManagerSchema {
    /// Name used in log output.
    const NAME: &'static str;
    const TABLES: &'static [TableDef];

    fn schema() -> Result<Schema> {
        Schema::from_defs(Self::TABLES)
    }
}

/// Identifiers are interpolated into SQL text, so only `[A-Za-z_][A-Za-z0-9_]*` is accepted.
pub(crate) fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(DatabaseError::InvalidSchema(format!(
            "'{}' is not a valid identifier",
            name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Users;

    impl ManagerSchema for Users {
        const NAME: &'static str = "UsersManager";
        const TABLES: &'static [TableDef] = &[TableDef {
            name: "users",
            columns: &[("id", "INTEGER PRIMARY KEY"), ("name", "TEXT")],
        }];
    }

    #[test]
    fn test_valid_identifiers() {
        assert!(validate_identifier("users").is_ok());
        assert!(validate_identifier("_private").is_ok());
        assert!(validate_identifier("col_2").is_ok());
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("2col").is_err());
        assert!(validate_identifier("drop;--").is_err());
        assert!(validate_identifier("user name").is_err());
        assert!(validate_identifier("na\"me").is_err());
    }

    #[test]
    fn test_manager_schema_preserves_order() {
        let schema = Users::schema().unwrap();
        let table = schema.table("users").unwrap();
        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec!["id", "name"]);
        assert!(table.has_column("name"));
        assert!(!table.has_column("email"));
        assert!(schema.table("missing").is_none());
    }

    #[test]
    fn test_rejects_empty_schema() {
        assert!(matches!(
            Schema::new(vec![]),
            Err(DatabaseError::InvalidSchema(_))
        ));
        assert!(Schema::new(vec![TableSchema::new("empty")]).is_err());
    }

    #[test]
    fn test_rejects_duplicates() {
        let dup_table = Schema::new(vec![
            TableSchema::new("a").column("x", "TEXT"),
            TableSchema::new("a").column("y", "TEXT"),
        ]);
        assert!(dup_table.is_err());

        let dup_column = Schema::new(vec![TableSchema::new("a")
            .column("x", "TEXT")
            .column("x", "INTEGER")]);
        assert!(dup_column.is_err());
    }

    #[test]
    fn test_rejects_duplicates_differing_in_case() {
        let dup_table = Schema::new(vec![
            TableSchema::new("users").column("id", "INTEGER"),
            TableSchema::new("Users").column("id", "INTEGER"),
        ]);
        assert!(matches!(dup_table, Err(DatabaseError::InvalidSchema(_))));

        let dup_column = Schema::new(vec![TableSchema::new("t")
            .column("id", "INTEGER")
            .column("ID", "INTEGER")]);
        assert!(matches!(dup_column, Err(DatabaseError::InvalidSchema(_))));
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{"tables": [{"name": "users", "columns": [
            {"name": "id", "decl": "INTEGER PRIMARY KEY"},
            {"name": "name", "decl": "TEXT"}
        ]}]}"#;
        let schema: Schema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.tables().len(), 1);

        let bad = r#"{"tables": [{"name": "bad table", "columns": [{"name": "id", "decl": ""}]}]}"#;
        assert!(serde_json::from_str::<Schema>(bad).is_err());
    }
}
