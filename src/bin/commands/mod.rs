pub mod config;
pub mod query;
pub mod tables;

use anyhow::{anyhow, Result};
use clap::Args;
use k2db::{Filter, Schema};
use rusqlite::types::Value;
use std::path::{Path, PathBuf};

/// Schema file and database shared by the data commands
#[derive(Args, Debug)]
pub struct Target {
    /// JSON schema file: {"tables": [{"name": ..., "columns": [{"name": ..., "decl": ...}]}]}
    #[clap(short, long)]
    pub schema: PathBuf,

    /// Database file, relative to the configured data directory
    #[clap(short, long)]
    pub db: PathBuf,
}

pub(crate) fn load_schema(path: &Path) -> Result<Schema> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("Unable to read schema file {}: {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| anyhow!("Invalid schema file {}: {}", path.display(), e))
}

/// Parse `column=value` arguments into a filter.
pub(crate) fn parse_pairs(pairs: &[String]) -> Result<Filter> {
    let mut filter = Filter::new();
    for pair in pairs {
        let (column, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("expected column=value, got '{}'", pair))?;
        filter.set(column.trim(), parse_value(value));
    }
    Ok(filter)
}

/// `null`, integers and reals are recognized; anything else (or a double-quoted value) is text.
pub(crate) fn parse_value(raw: &str) -> Value {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return Value::Text(raw[1..raw.len() - 1].to_string());
    }
    if raw.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Integer(n);
    }
    if let Ok(r) = raw.parse::<f64>() {
        return Value::Real(r);
    }
    Value::Text(raw.to_string())
}

/// The manager treats bad tables, columns and empty filters as bugs, so
/// user input is checked here first.
pub(crate) fn check_filter(schema: &Schema, table: &str, filter: &Filter) -> Result<()> {
    let table_schema = schema
        .table(table)
        .ok_or_else(|| anyhow!("table '{}' is not declared in the schema", table))?;
    if filter.is_empty() {
        return Err(anyhow!("at least one column=value pair is required"));
    }
    for column in filter.columns() {
        if !table_schema.has_column(column) {
            return Err(anyhow!(
                "column '{}' is not declared for table '{}' (columns: {})",
                column,
                table,
                table_schema.column_names().collect::<Vec<_>>().join(", ")
            ));
        }
    }
    Ok(())
}

pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Real(r) => r.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("x'{}'", hex(b)),
    }
}

pub(crate) fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(n) => serde_json::json!(n),
        Value::Real(r) => serde_json::json!(r),
        Value::Text(s) => serde_json::json!(s),
        Value::Blob(b) => serde_json::json!(hex(b)),
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
