//! Database commands
//!
//! Commands: ping, load

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use migratectl_core::MigrateConfig;
use migratectl_db::{load_script, ConnectionPool, DatabaseSettings};
use tracing::{error, info};

use crate::ui;

#[derive(Parser, Debug)]
pub struct DbArgs {
    #[command(subcommand)]
    pub command: DbCommands,
}

#[derive(Subcommand, Debug)]
pub enum DbCommands {
    /// Check connectivity and print the server version
    Ping,
    /// Execute a SQL script in a single transaction
    Load(LoadArgs),
}

#[derive(Parser, Debug)]
pub struct LoadArgs {
    /// SQL script, typically all_inserts_ordered.sql
    pub file: PathBuf,
}

pub async fn run_db(args: DbArgs, config: &MigrateConfig) -> Result<()> {
    let settings = DatabaseSettings::from_section(&config.database)
        .context("invalid database configuration")?;
    let pool = ConnectionPool::new(settings);

    let result = match args.command {
        DbCommands::Ping => run_ping(&pool).await,
        DbCommands::Load(args) => run_load(&pool, args).await,
    };

    if let Err(err) = &result {
        error!("database command failed: {:#}", err);
    }
    pool.close().await;
    result
}

async fn run_ping(pool: &ConnectionPool) -> Result<()> {
    let target = pool.settings().describe();
    let version = ui::with_spinner_async(
        format!("Connecting to {}", target),
        format!("Connected to {}", target),
        pool.server_version(),
    )
    .await
    .context("failed to query server version")?;

    println!("PostgreSQL version: {}", version);
    Ok(())
}

async fn run_load(pool: &ConnectionPool, args: LoadArgs) -> Result<()> {
    let report = ui::with_spinner_async(
        format!("Loading {}", args.file.display()),
        format!("Loaded {}", args.file.display()),
        load_script(pool, &args.file),
    )
    .await
    .with_context(|| format!("failed to load {}", args.file.display()))?;

    info!(bytes = report.bytes, "script committed");
    println!(
        "Loaded {} ({} rows affected)",
        args.file.display(),
        report.rows_affected
    );
    Ok(())
}
