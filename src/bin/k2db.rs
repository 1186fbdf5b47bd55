use clap::{Parser, Subcommand};
use k2db::K2Config;
use tracing::{warn, Level};

mod commands;

use commands::config::ConfigArgs;
use commands::query::{FilterArgs, InsertArgs};
use commands::tables::TablesArgs;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.k2db/k2db.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tables and columns a schema file declares
    Tables(TablesArgs),

    /// Print the rows of a table matching all filters
    Select(FilterArgs),

    /// Count the rows of a table matching all filters
    Count(FilterArgs),

    /// Insert one row
    Insert(InsertArgs),

    /// Delete the rows of a table matching all filters
    Delete(FilterArgs),

    /// Show configuration and the database files in the data directory
    Config(ConfigArgs),
}

fn main() {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            // filter spans/events with level DEBUG or higher.
            .with_max_level(Level::DEBUG)
            .init();
    }

    let config = match K2Config::new(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            warn!("{}; falling back to default configuration", e);
            K2Config::default()
        }
    };

    let result = match cli.command {
        Commands::Tables(args) => commands::tables::run(&config, args),
        Commands::Select(args) => commands::query::run_select(&config, args),
        Commands::Count(args) => commands::query::run_count(&config, args),
        Commands::Insert(args) => commands::query::run_insert(&config, args),
        Commands::Delete(args) => commands::query::run_delete(&config, args),
        Commands::Config(args) => {
            commands::config::run(&config, args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
