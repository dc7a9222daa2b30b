//! Column patch command
//!
//! Commands: patch

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use migratectl_core::{patch_column, MigrateConfig, PatchOptions};

#[derive(Parser, Debug)]
pub struct PatchArgs {
    /// CSV holding the correct column values
    #[arg(long, value_name = "PATH")]
    pub first: PathBuf,

    /// CSV whose rows are patched and written out
    #[arg(long, value_name = "PATH")]
    pub second: PathBuf,

    /// Output CSV
    #[arg(long = "out", value_name = "PATH")]
    pub output: PathBuf,

    /// Column to copy (default: patch.column from config)
    #[arg(long)]
    pub column: Option<String>,

    /// Pair rows by this column instead of by position
    #[arg(long)]
    pub key: Option<String>,
}

pub fn run_patch(args: PatchArgs, config: &MigrateConfig) -> Result<()> {
    let opts = PatchOptions {
        column: args.column.unwrap_or_else(|| config.patch.column.clone()),
        join_key: args.key.or_else(|| config.patch.join_key.clone()),
    };

    let report = patch_column(&args.first, &args.second, &args.output, &opts)
        .with_context(|| format!("failed to patch {}", args.second.display()))?;

    if !report.is_aligned() {
        eprintln!(
            "⚠️ {} rows from {} and {} rows from {} had no partner",
            report.unpaired_first,
            args.first.display(),
            report.unpaired_second,
            args.second.display()
        );
    }
    println!(
        "Updated {} in {} using {} and saved {} rows to {}",
        opts.column,
        args.second.display(),
        args.first.display(),
        report.written,
        args.output.display()
    );
    Ok(())
}
