use super::{check_filter, load_schema, parse_pairs, value_to_json, value_to_string, Target};
use anyhow::{anyhow, Result};
use clap::Args;
use k2db::{DatabaseManager, Filter, K2Config};
use std::io::Write;
use std::sync::Arc;

const MANAGER_NAME: &str = "k2db-cli";

/// Arguments for the select, count and delete commands
#[derive(Args, Debug)]
pub struct FilterArgs {
    #[clap(flatten)]
    pub target: Target,

    /// Table to query
    pub table: String,

    /// Column filter as column=value; repeat to AND several together
    #[clap(short = 'w', long = "where", required = true)]
    pub filters: Vec<String>,

    /// Output rows as JSON arrays (select only)
    #[clap(long)]
    pub json: bool,
}

/// Arguments for the insert command
#[derive(Args, Debug)]
pub struct InsertArgs {
    #[clap(flatten)]
    pub target: Target,

    /// Table to insert into
    pub table: String,

    /// Column value as column=value; repeat for each column
    #[clap(short = 'v', long = "value", required = true)]
    pub values: Vec<String>,
}

/// Validate user input against the schema before anything touches the database file.
fn open(
    config: &K2Config,
    target: &Target,
    table: &str,
    filter: &Filter,
) -> Result<DatabaseManager> {
    let schema = load_schema(&target.schema)?;
    check_filter(&schema, table, filter)?;
    let db = DatabaseManager::open(config, MANAGER_NAME, &target.db, Arc::new(schema))?;
    Ok(db)
}

pub fn run_select(config: &K2Config, args: FilterArgs) -> Result<()> {
    let filter = parse_pairs(&args.filters)?;
    let mut db = open(config, &args.target, &args.table, &filter)?;

    let json = args.json;
    db.select(&args.table, &filter, |rows| {
        let mut stdout = std::io::stdout().lock();
        for row in rows {
            let row = row?;
            let line = if json {
                serde_json::Value::Array(row.iter().map(value_to_json).collect()).to_string()
            } else {
                row.iter().map(value_to_string).collect::<Vec<_>>().join("|")
            };
            if let Err(e) = writeln!(stdout, "{}", line) {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    eprintln!("{e}");
                }
                break;
            }
        }
        Ok(())
    })?;
    db.close();
    Ok(())
}

pub fn run_count(config: &K2Config, args: FilterArgs) -> Result<()> {
    let filter = parse_pairs(&args.filters)?;
    let mut db = open(config, &args.target, &args.table, &filter)?;

    println!("{}", db.count(&args.table, &filter)?);
    db.close();
    Ok(())
}

pub fn run_delete(config: &K2Config, args: FilterArgs) -> Result<()> {
    let filter = parse_pairs(&args.filters)?;
    let mut db = open(config, &args.target, &args.table, &filter)?;

    let deleted = db.delete(&args.table, &filter)?;
    println!("deleted {} row(s)", deleted);
    db.close();
    Ok(())
}

pub fn run_insert(config: &K2Config, args: InsertArgs) -> Result<()> {
    let values = parse_pairs(&args.values)?;
    let mut db = open(config, &args.target, &args.table, &values)?;

    if let Err(e) = db.insert(&args.table, &values) {
        db.close();
        return if e.is_recoverable() {
            Err(anyhow!("insert rejected: {e}"))
        } else {
            Err(e.into())
        };
    }
    println!("inserted 1 row");
    db.close();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    fn target(dir: &Path) -> Target {
        let schema = dir.join("schema.json");
        std::fs::write(
            &schema,
            r#"{"tables": [{"name": "users", "columns": [
                {"name": "id", "decl": "INTEGER PRIMARY KEY"},
                {"name": "name", "decl": "TEXT"}
            ]}]}"#,
        )
        .unwrap();
        Target {
            schema,
            db: PathBuf::from("users.sqlite3"),
        }
    }

    fn insert_args(dir: &Path, values: &[&str]) -> InsertArgs {
        InsertArgs {
            target: target(dir),
            table: "users".to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn test_rejected_insert_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = K2Config {
            data_dir: dir.path().to_path_buf(),
        };

        assert!(run_insert(&config, insert_args(dir.path(), &["id=1", "name=alice"])).is_ok());
        let err = run_insert(&config, insert_args(dir.path(), &["id=1", "name=bob"]))
            .unwrap_err();
        assert!(err.to_string().starts_with("insert rejected"));
    }
}
