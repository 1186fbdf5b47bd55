use super::load_schema;
use anyhow::Result;
use clap::Args;
use k2db::{DatabaseConn, K2Config};
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the Tables command
#[derive(Args)]
pub struct TablesArgs {
    /// JSON schema file to describe
    #[clap(short, long)]
    pub schema: PathBuf,

    /// Also report row counts from this database file (relative to the data directory)
    #[clap(short, long)]
    pub db: Option<PathBuf>,

    /// Output as JSON
    #[clap(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct TableInfo {
    name: String,
    columns: Vec<ColumnInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rows: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ColumnInfo {
    name: String,
    decl: String,
}

pub fn run(config: &K2Config, args: TablesArgs) -> Result<()> {
    let TablesArgs { schema, db, json } = args;
    let schema = load_schema(&schema)?;

    // read-only inspection: do not create the file, its tables or change its journal mode
    let conn = match db {
        Some(rel) => {
            let path = config.database_path(rel);
            if path.exists() {
                Some(DatabaseConn::open_read_only(&path)?)
            } else {
                None
            }
        }
        None => None,
    };

    let mut infos = Vec::new();
    for table in schema.tables() {
        let rows = match &conn {
            Some(c) if c.table_exists(&table.name)? => Some(c.table_count(&table.name)?),
            _ => None,
        };
        infos.push(TableInfo {
            name: table.name.clone(),
            columns: table
                .columns
                .iter()
                .map(|c| ColumnInfo {
                    name: c.name.clone(),
                    decl: c.decl.clone(),
                })
                .collect(),
            rows,
        });
    }

    if let Some(c) = conn {
        c.close();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    for info in &infos {
        match info.rows {
            Some(n) => println!("{} ({} rows)", info.name, n),
            None => println!("{}", info.name),
        }
        for column in &info.columns {
            println!("  {} {}", column.name, column.decl);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_leaves_database_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.json");
        std::fs::write(
            &schema,
            r#"{"tables": [{"name": "users", "columns": [{"name": "id", "decl": "INTEGER"}]}]}"#,
        )
        .unwrap();
        let db_path = dir.path().join("users.sqlite3");
        {
            let conn = rusqlite::Connection::open(&db_path).unwrap();
            conn.execute_batch("CREATE TABLE users (id INTEGER); INSERT INTO users VALUES (1);")
                .unwrap();
        }
        let config = K2Config {
            data_dir: dir.path().to_path_buf(),
        };

        let args = TablesArgs {
            schema,
            db: Some(PathBuf::from("users.sqlite3")),
            json: true,
        };
        run(&config, args).unwrap();

        let conn = rusqlite::Connection::open(&db_path).unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "delete");
        assert!(!dir.path().join("users.sqlite3-wal").exists());
    }
}
