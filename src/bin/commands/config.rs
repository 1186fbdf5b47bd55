use clap::Args;
use k2db::K2Config;
use serde::Serialize;

/// Arguments for the Config command
#[derive(Args)]
pub struct ConfigArgs {
    /// Output as JSON
    #[clap(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ConfigInfo {
    config_file: String,
    data_dir: String,
    data_dir_exists: bool,
    databases: Vec<DatabaseFile>,
}

#[derive(Debug, Serialize)]
struct DatabaseFile {
    name: String,
    size_bytes: u64,
}

pub fn run(config: &K2Config, args: ConfigArgs) {
    let ConfigArgs { json } = args;

    if !json {
        println!("{}", config.summary());
        for db in list_databases(config) {
            println!("  {} ({} bytes)", db.name, db.size_bytes);
        }
        return;
    }

    let info = ConfigInfo {
        config_file: K2Config::config_file_path().display().to_string(),
        data_dir: config.data_dir.display().to_string(),
        data_dir_exists: config.data_dir.is_dir(),
        databases: list_databases(config),
    };
    match serde_json::to_string_pretty(&info) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to serialize configuration: {}", e),
    }
}

fn list_databases(config: &K2Config) -> Vec<DatabaseFile> {
    let Ok(entries) = std::fs::read_dir(&config.data_dir) else {
        return Vec::new();
    };

    let mut files: Vec<DatabaseFile> = entries
        .flatten()
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext == "sqlite3" || ext == "db")
        })
        .filter_map(|e| {
            let size_bytes = e.metadata().ok()?.len();
            Some(DatabaseFile {
                name: e.file_name().to_string_lossy().to_string(),
                size_bytes,
            })
        })
        .collect();
    files.sort_by(|a, b| a.name.cmp(&b.name));
    files
}
