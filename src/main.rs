//! Goal Tracker
//!
//! HTTP backend persisting goals and their tasks in SQLite.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use goal_tracker::api;
use goal_tracker::cli::{Cli, Command};
use goal_tracker::config::{Config, ConfigLoader};
use goal_tracker::db::Database;
use goal_tracker::db::seed::{SeedOutcome, run_seed};
use goal_tracker::logging::{self, LogTarget};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

fn open_database(config: &Config) -> Result<Arc<Database>> {
    let db = Database::open(&config.server.db_path).with_context(|| {
        format!(
            "failed to open database at {}",
            config.server.db_path.display()
        )
    })?;
    info!("Database opened at {}", config.server.db_path.display());
    Ok(Arc::new(db))
}

async fn serve(config: Config) -> Result<()> {
    let db = open_database(&config)?;

    if config.seed.on_startup && run_seed(&db, Local::now().date_naive()) == SeedOutcome::Failed
    {
        warn!("Continuing without seed data");
    }

    let handle = api::start_server(db, &config.server, &config.cors).await?;
    info!(
        "Accepting requests from {} at http://{}",
        config.cors.allowed_origin,
        handle.addr()
    );

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received");
    handle.shutdown().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let loader = ConfigLoader::load(cli.config.as_deref().map(Path::new))?;
    if let Some(path) = loader.config_path() {
        debug!("Loaded config from {}", path.display());
    }

    let mut config = loader.into_config();
    cli.apply_overrides(&mut config);

    match cli.command {
        Some(Command::Seed) => {
            let db = open_database(&config)?;
            match run_seed(&db, Local::now().date_naive()) {
                SeedOutcome::Seeded { goals, tasks } => {
                    println!("Seeded {} goals and {} tasks", goals, tasks);
                }
                SeedOutcome::AlreadySeeded => {
                    println!("Database already contains goals; nothing to do");
                }
                SeedOutcome::Failed => {
                    eprintln!("Seeding failed; see log for details");
                }
            }
        }
        Some(Command::Serve(_)) | None => {
            serve(config).await?;
        }
    }

    Ok(())
}
