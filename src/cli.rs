use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "farm-csv-to-sqlite")]
#[command(version, about = "Reconcile farm CSV files into a SQLite database")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Insert, update or skip every row of the six CSV files
    Load {
        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the CSV root directory
        #[arg(long)]
        csv_root: Option<PathBuf>,

        /// Override the database path or URI
        #[arg(short, long)]
        database: Option<String>,
    },

    /// Create any missing tables
    InitSchema {
        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Database path or URI (skips the configuration file)
        #[arg(short, long)]
        database: Option<String>,
    },

    /// List tables in processing order
    ListTables {
        /// Configuration file (TOML), used to show CSV paths
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
