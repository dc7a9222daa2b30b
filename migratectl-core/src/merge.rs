//! Dependency-ordered merge of per-table SQL files.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::error::{MigrateError, Result};
use crate::graph::DependencyOrder;

pub const DEFAULT_MERGED_FILE: &str = "all_inserts_ordered.sql";
pub const DEFAULT_FILE_SUFFIX: &str = "_data.sql";

#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Directory holding the `<table>_data.sql` files
    pub input_dir: PathBuf,
    /// Merged script; relative paths resolve against `input_dir`
    pub output: PathBuf,
    pub order: DependencyOrder,
    pub file_suffix: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output: PathBuf::from(DEFAULT_MERGED_FILE),
            order: DependencyOrder::default(),
            file_suffix: DEFAULT_FILE_SUFFIX.to_string(),
        }
    }
}

impl MergeOptions {
    pub fn output_path(&self) -> PathBuf {
        if self.output.is_absolute() {
            self.output.clone()
        } else {
            self.input_dir.join(&self.output)
        }
    }

    pub fn file_name_for(&self, table: &str) -> String {
        format!("{}{}", table, self.file_suffix)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub output: PathBuf,
    /// File names written, in order
    pub merged: Vec<String>,
    /// File names named by the order but not found
    pub skipped: Vec<String>,
    /// Matching files present on disk but absent from the order
    pub unlisted: Vec<String>,
}

/// Concatenate the table files in dependency order, each wrapped in
/// `-- Start of:` / `-- End of:` markers.
#[instrument(skip_all, fields(dir = %opts.input_dir.display()))]
pub fn merge_ordered(opts: &MergeOptions) -> Result<MergeReport> {
    let output = opts.output_path();
    reject_output_collision(opts, &output)?;
    let file = File::create(&output).map_err(|err| MigrateError::io(&output, err))?;
    let mut out = BufWriter::new(file);

    let mut report = MergeReport {
        output: output.clone(),
        ..Default::default()
    };

    for table in opts.order.iter() {
        let file_name = opts.file_name_for(table);
        let path = opts.input_dir.join(&file_name);

        if !path.exists() {
            warn!("Skipped: {} (not found)", file_name);
            report.skipped.push(file_name);
            continue;
        }

        let content = fs::read_to_string(&path).map_err(|err| MigrateError::io(&path, err))?;
        write_block(&mut out, &file_name, &content).map_err(|err| MigrateError::io(&output, err))?;
        info!(table, "merged {}", file_name);
        report.merged.push(file_name);
    }

    out.flush().map_err(|err| MigrateError::io(&output, err))?;

    report.unlisted = unlisted_files(opts, &output)?;
    for name in &report.unlisted {
        warn!("{} is not in the dependency order and was not merged", name);
    }

    info!(
        merged = report.merged.len(),
        skipped = report.skipped.len(),
        "Finished merging SQL files into {}",
        output.display()
    );
    Ok(report)
}

/// Creating the output truncates it, so it must not be one of the inputs.
fn reject_output_collision(opts: &MergeOptions, output: &Path) -> Result<()> {
    let Ok(output_canonical) = fs::canonicalize(output) else {
        return Ok(());
    };

    for table in opts.order.iter() {
        let path = opts.input_dir.join(opts.file_name_for(table));
        if fs::canonicalize(&path).is_ok_and(|input| input == output_canonical) {
            return Err(MigrateError::config(format!(
                "merge output {} is also the input for table '{}'",
                output.display(),
                table
            )));
        }
    }
    Ok(())
}

fn write_block<W: Write>(out: &mut W, file_name: &str, content: &str) -> std::io::Result<()> {
    writeln!(out, "-- Start of: {}", file_name)?;
    out.write_all(content.as_bytes())?;
    write!(out, "\n-- End of: {}\n\n", file_name)
}

fn unlisted_files(opts: &MergeOptions, output: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(&opts.input_dir).map_err(|err| MigrateError::io(&opts.input_dir, err))?;
    let output_name = output.file_name();
    let mut unlisted = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|err| MigrateError::io(&opts.input_dir, err))?;
        if Some(entry.file_name().as_os_str()) == output_name {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        let Some(table) = name.strip_suffix(&opts.file_suffix) else {
            continue;
        };
        if !table.is_empty() && !opts.order.contains(table) {
            unlisted.push(name);
        }
    }

    unlisted.sort();
    Ok(unlisted)
}
