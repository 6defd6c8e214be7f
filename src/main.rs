use anyhow::{Context, Result};
use env_logger::Env;
use farm_csv_to_sqlite::{
    cli::{Cli, Commands},
    config::Config,
    schema::{EntityKind, ALL_TABLES},
    ui::LogUi,
    writer::{run_batch, Session},
};
use log::{error, info};
use std::process::ExitCode;
use std::time::Instant;

fn main() -> Result<ExitCode> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Load {
            config,
            csv_root,
            database,
        } => {
            let start = Instant::now();

            let mut config =
                Config::load(config.as_deref()).context("Failed to load configuration")?;
            if let Some(root) = csv_root {
                config.paths.csv_root = root;
            }
            if let Some(url) = database {
                config.database.url = url;
            }
            info!("Starting load into {}", config.database.url);

            let mut session = Session::new(&config.database.url);
            let audit = config.audit_log();
            let mut ui = LogUi::new();

            let result = run_batch(&mut session, &config.paths.csv_root, &audit, &mut ui);
            session.close();

            match result {
                Ok(report) => {
                    info!(
                        "Load finished: {} records in {:.1}s",
                        report.total(),
                        start.elapsed().as_secs_f64()
                    );
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    error!("Load aborted: {}", e);
                    Ok(ExitCode::from(1))
                }
            }
        }

        Commands::InitSchema { config, database } => {
            let url = match database {
                Some(url) => url,
                None => {
                    Config::load(config.as_deref())
                        .context("Failed to load configuration")?
                        .database
                        .url
                }
            };

            let mut session = Session::new(url);
            session.create_tables(ALL_TABLES)?;
            session.close();
            info!("Schema ready in {}", session.url());
            Ok(ExitCode::SUCCESS)
        }

        Commands::ListTables { config } => {
            let csv_root = match config {
                Some(path) => Some(Config::from_path(&path)?.paths.csv_root),
                // Paths are a bonus here, a missing default config is fine
                None => Config::load(None).ok().map(|c| c.paths.csv_root),
            };

            println!("Tables in processing order:\n");
            for kind in EntityKind::ALL {
                match &csv_root {
                    Some(root) => println!(
                        "  {:<18} {}",
                        kind.schema().name,
                        kind.csv_path(root).display()
                    ),
                    None => println!("  {}", kind.schema().name),
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
