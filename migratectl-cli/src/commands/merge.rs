//! Dependency-ordered merge commands
//!
//! Commands: merge, order

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use migratectl_core::{merge_ordered, DependencyOrder, MergeOptions, MigrateConfig};

#[derive(Parser, Debug)]
pub struct MergeArgs {
    /// Directory holding the <table>_data.sql files
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Merged script (relative paths resolve against --dir)
    #[arg(long = "out", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Table order, comma-separated (overrides the configured order)
    #[arg(long, value_delimiter = ',')]
    pub order: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct OrderArgs {
    /// Print as a single comma-separated line
    #[arg(long)]
    pub inline: bool,
}

fn table_order(explicit: Vec<String>, config: &MigrateConfig) -> Result<DependencyOrder> {
    if !explicit.is_empty() {
        return Ok(DependencyOrder::new(explicit));
    }
    config
        .resolved_order()
        .context("failed to derive table order from schema.foreign_keys")
}

pub fn run_merge(args: MergeArgs, config: &MigrateConfig) -> Result<()> {
    let opts = MergeOptions {
        input_dir: args.dir,
        output: args.output.unwrap_or_else(|| config.merge.output.clone()),
        order: table_order(args.order, config)?,
        file_suffix: config.merge.file_suffix.clone(),
    };

    let report = merge_ordered(&opts)
        .with_context(|| format!("failed to merge SQL files in {}", opts.input_dir.display()))?;

    println!(
        "Finished merging {} SQL files into {}",
        report.merged.len(),
        report.output.display()
    );
    Ok(())
}

pub fn run_order(args: OrderArgs, config: &MigrateConfig) -> Result<()> {
    let order = table_order(Vec::new(), config)?;

    if args.inline {
        println!("{}", order.tables().join(","));
    } else {
        for table in order.iter() {
            println!("{}", table);
        }
    }
    Ok(())
}
