//! CSV -> SQL conversion commands
//!
//! Commands: convert (folder), convert-file (single file)

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use migratectl_core::{convert_file, convert_folder_with, table_name_from_file, BatchOptions};
use tracing::info;

use crate::wizard;

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Folder containing CSV files (prompted for when omitted)
    #[arg(long = "in", value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Folder to store SQL files (prompted for when omitted)
    #[arg(long = "out", value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Log failing files and continue with the rest
    #[arg(long)]
    pub keep_going: bool,
}

#[derive(Parser, Debug)]
pub struct ConvertFileArgs {
    /// CSV file to convert
    #[arg(long = "in", value_name = "PATH")]
    pub input: PathBuf,

    /// SQL file to write (default: <input> with .sql extension)
    #[arg(long = "out", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Target table (default: derived from the file name)
    #[arg(long)]
    pub table: Option<String>,
}

pub fn run_convert(args: ConvertArgs) -> Result<()> {
    let data_folder = wizard::data_folder(args.input)?;
    let output_folder = wizard::output_folder(args.output)?;

    let opts = BatchOptions {
        keep_going: args.keep_going,
    };
    let report = convert_folder_with(&data_folder, &output_folder, &opts, |conversion| {
        println!(
            "Converted {} to {}",
            conversion.source.display(),
            conversion.target.display()
        );
    })
    .with_context(|| {
        format!(
            "failed to convert {} into {}",
            data_folder.display(),
            output_folder.display()
        )
    })?;

    info!(
        files = report.converted.len(),
        statements = report.total_statements(),
        "conversion finished"
    );

    if !report.failures.is_empty() {
        bail!("{} file(s) failed to convert", report.failures.len());
    }
    Ok(())
}

pub fn run_convert_file(args: ConvertFileArgs) -> Result<()> {
    let table = match args.table {
        Some(table) => table,
        None => args
            .input
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(table_name_from_file)
            .ok_or_else(|| anyhow!("cannot derive a table name from {}", args.input.display()))?,
    };
    let output = args
        .output
        .unwrap_or_else(|| args.input.with_extension("sql"));

    let statements = convert_file(&args.input, &table, &output)
        .with_context(|| format!("failed to convert {}", args.input.display()))?;

    println!(
        "Converted {} to {} ({} statements into {})",
        args.input.display(),
        output.display(),
        statements,
        table
    );
    Ok(())
}
