use crate::host::Host;
use anyhow::{anyhow, Result};
use config::Config;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct K2Config {
    /// Directory that database files are resolved against
    pub data_dir: PathBuf,
}

const EMPTY_CONFIG: &str = r#"### k2db configuration file

### directory holding the bot's sqlite3 databases
# data_dir = "~/.k2db"
"#;

impl Default for K2Config {
    fn default() -> Self {
        let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

        Self {
            data_dir: home_dir.join(".k2db"),
        }
    }
}

impl K2Config {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<K2Config> {
        let mut builder = Config::builder();

        // By default use $HOME/.k2db/k2db.toml as the configuration file path
        let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        let k2db_dir = home_dir.join(".k2db");

        // Add in toml configuration file
        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    builder = builder.add_source(config::File::from(path));
                } else {
                    std::fs::write(path, EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                std::fs::create_dir_all(&k2db_dir)
                    .map_err(|e| anyhow!("Unable to create k2db directory: {}", e))?;
                let p = Self::config_file_path_in(&k2db_dir);
                if p.exists() {
                    builder = builder.add_source(config::File::from(p.as_path()));
                } else {
                    std::fs::write(&p, EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.display(), e)
                    })?;
                }
            }
        }

        // Add in settings from the environment (with a prefix of K2DB)
        // E.g., `K2DB_DATA_DIR=/srv/bot ./k2db` would set the data directory
        builder = builder.add_source(config::Environment::with_prefix("K2DB"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        Self::from_settings(&config, &home_dir)
    }

    fn from_settings(config: &HashMap<String, String>, home_dir: &Path) -> Result<K2Config> {
        let data_dir = match config.get("data_dir") {
            Some(p) => expand_home(p, home_dir),
            None => home_dir.join(".k2db"),
        };
        std::fs::create_dir_all(&data_dir)
            .map_err(|e| anyhow!("Unable to create data directory: {}", e))?;

        Ok(K2Config { data_dir })
    }

    /// Resolve a database file name against the data directory
    pub fn database_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.data_dir.join(relative)
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        [
            format!("Config File:        {}", Self::config_file_path().display()),
            format!("Data Directory:     {}", self.data_dir.display()),
        ]
        .join("\n")
    }

    /// Get the config file path
    pub fn config_file_path() -> PathBuf {
        let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
        Self::config_file_path_in(&home_dir.join(".k2db"))
    }

    fn config_file_path_in(dir: &Path) -> PathBuf {
        dir.join("k2db.toml")
    }
}

impl Host for K2Config {
    fn config_directory(&self) -> &Path {
        &self.data_dir
    }
}

fn expand_home(path: &str, home_dir: &Path) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => home_dir.join(rest),
        None if path == "~" => home_dir.to_path_buf(),
        None => PathBuf::from(path),
    }
}
