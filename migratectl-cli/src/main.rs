//! migratectl CLI - one-shot CSV -> SQL migration tooling
//!
//! Subcommands:
//! - `convert` / `convert-file`: CSV extracts to INSERT scripts
//! - `merge` / `order`: dependency-ordered concatenation of per-table scripts
//! - `patch`: copy a code column from one CSV into another
//! - `db`: pooled PostgreSQL access (ping, load)
//! - `config`: template, inspection and validation of `migratectl.toml`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use migratectl_core::MigrateConfig;

mod commands;
mod config;
mod tracing_setup;
mod ui;
mod wizard;

#[derive(Parser, Debug)]
#[command(
    name = "migratectl",
    author,
    version,
    about = "CSV to SQL migration utilities: convert, merge in dependency order, patch, load",
    long_about = "Convert CSV extracts into INSERT scripts, merge per-table scripts in \
                  foreign-key order, patch code columns between CSVs, and load the result \
                  into PostgreSQL through a bounded connection pool."
)]
struct Cli {
    /// Config file (default: ./migratectl.toml when present)
    #[arg(long, global = true, value_name = "PATH", env = "MIGRATECTL_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Suppress progress spinners
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert every CSV in a folder into an INSERT script
    Convert(commands::convert::ConvertArgs),
    /// Convert a single CSV file into an INSERT script
    ConvertFile(commands::convert::ConvertFileArgs),
    /// Merge per-table SQL files into one script in dependency order
    Merge(commands::merge::MergeArgs),
    /// Print the table insertion order
    Order(commands::merge::OrderArgs),
    /// Copy one column from a first CSV into a second CSV
    Patch(commands::patch::PatchArgs),
    /// Database operations through the connection pool
    Db(commands::db::DbArgs),
    /// Manage migratectl configuration (init, show, validate)
    Config(config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();
    ui::init_quiet_mode(cli.quiet);
    config::load_dotenv();

    match cli.command {
        Commands::Convert(args) => commands::run_convert(args)?,
        Commands::ConvertFile(args) => commands::run_convert_file(args)?,
        Commands::Merge(args) => commands::run_merge(args, &load_config(&cli.config)?)?,
        Commands::Order(args) => commands::run_order(args, &load_config(&cli.config)?)?,
        Commands::Patch(args) => commands::run_patch(args, &load_config(&cli.config)?)?,
        Commands::Db(args) => commands::run_db(args, &load_config(&cli.config)?).await?,
        Commands::Config(args) => config::run_config(args, cli.config.as_deref())?,
        Commands::Completions(args) => run_completions(args)?,
    }
    Ok(())
}

fn load_config(path: &Option<PathBuf>) -> Result<MigrateConfig> {
    MigrateConfig::load(path.as_deref()).context("failed to load configuration")
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
