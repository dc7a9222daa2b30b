use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use migratectl_core::config::DEFAULT_CONFIG_FILE;
use migratectl_core::MigrateConfig;
use migratectl_db::DatabaseSettings;
use tracing::debug;

const TEMPLATE: &str = include_str!("../../migratectl.template.toml");

/// Load `.env` from the current directory if present. Variables already set
/// in the environment win.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded .env from {}", path.display()),
        Err(e) => debug!("No .env loaded: {}", e),
    }
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a commented migratectl.toml template
    Init(InitArgs),
    /// Print the effective configuration as TOML
    Show,
    /// Validate the configuration (pool bounds, schema order, connection settings)
    Validate,
    /// Show which config file would be used
    Path,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

pub fn run_config(args: ConfigArgs, explicit: Option<&Path>) -> Result<()> {
    match args.command {
        ConfigCommands::Init(args) => run_init(args, explicit),
        ConfigCommands::Show => run_show(explicit),
        ConfigCommands::Validate => run_validate(explicit),
        ConfigCommands::Path => run_path(explicit),
    }
}

fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

fn run_init(args: InitArgs, explicit: Option<&Path>) -> Result<()> {
    let path = config_path(explicit);

    if path.exists() && !args.force {
        bail!("Config already exists at {:?}\n\nUse --force to overwrite", path);
    }

    std::fs::write(&path, TEMPLATE)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    println!("✅ Created config at: {:?}", path);
    println!("\nNext steps:");
    println!("  1. Set the [database] connection or DATABASE_URL");
    println!("  2. Declare [[schema.foreign_keys]] or edit [merge].order");
    println!("  3. Run: migratectl config validate");
    Ok(())
}

fn run_show(explicit: Option<&Path>) -> Result<()> {
    let mut config = MigrateConfig::load(explicit)?;
    if config.database.password.is_some() {
        config.database.password = Some("********".to_string());
    }
    let rendered = toml::to_string_pretty(&config).context("Failed to render config")?;
    print!("{}", rendered);
    Ok(())
}

fn run_validate(explicit: Option<&Path>) -> Result<()> {
    let config = MigrateConfig::load(explicit)?;

    let order = config
        .resolved_order()
        .context("schema.foreign_keys do not form a valid order")?;
    println!("✓ table order: {} tables", order.len());

    let settings = DatabaseSettings::from_section(&config.database)
        .context("invalid database settings")?;
    println!(
        "✓ database: {} (pool {}..={})",
        settings.describe(),
        settings.min_connections,
        settings.max_connections
    );
    Ok(())
}

fn run_path(explicit: Option<&Path>) -> Result<()> {
    let path = config_path(explicit);
    if path.exists() {
        println!("{}", path.display());
    } else {
        println!("{} (not found, using defaults)", path.display());
    }
    Ok(())
}
