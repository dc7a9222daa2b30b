//! Folder batch driver: converts every CSV in a directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{error, info, instrument};
use walkdir::WalkDir;

use crate::convert::{convert_file, sql_file_name, table_name_from_file, CSV_EXTENSION};
use crate::error::{MigrateError, Result};

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Log failed files and continue instead of halting the batch
    pub keep_going: bool,
}

/// One converted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub source: PathBuf,
    pub target: PathBuf,
    pub table: String,
    pub statements: usize,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: Vec<Conversion>,
    /// Only populated with `keep_going`
    pub failures: Vec<(PathBuf, MigrateError)>,
}

impl BatchReport {
    pub fn total_statements(&self) -> usize {
        self.converted.iter().map(|c| c.statements).sum()
    }
}

/// List the `.csv` files directly inside `dir`, sorted by name.
pub fn csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|err| MigrateError::io(dir, io::Error::from(err)))?;
        let is_csv = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(CSV_EXTENSION));

        if is_csv && entry.path().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn convert_one(csv_path: &Path, output_dir: &Path) -> Result<Conversion> {
    let file_name = csv_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| MigrateError::InvalidFileName {
            path: csv_path.to_path_buf(),
        })?;
    let table = table_name_from_file(file_name).ok_or_else(|| MigrateError::InvalidFileName {
        path: csv_path.to_path_buf(),
    })?;
    let target = output_dir.join(sql_file_name(file_name));

    let statements = convert_file(csv_path, &table, &target)?;

    Ok(Conversion {
        source: csv_path.to_path_buf(),
        target,
        table,
        statements,
    })
}

/// Convert every CSV in `data_dir` into a `.sql` file in `output_dir`,
/// logging each conversion.
pub fn convert_folder(data_dir: &Path, output_dir: &Path, opts: &BatchOptions) -> Result<BatchReport> {
    convert_folder_with(data_dir, output_dir, opts, |conversion| {
        info!(
            table = %conversion.table,
            statements = conversion.statements,
            "Converted {} to {}",
            conversion.source.display(),
            conversion.target.display()
        );
    })
}

/// Like [`convert_folder`], but hands each conversion to `on_converted` as
/// soon as its file is written.
#[instrument(skip(opts, on_converted))]
pub fn convert_folder_with<F>(
    data_dir: &Path,
    output_dir: &Path,
    opts: &BatchOptions,
    mut on_converted: F,
) -> Result<BatchReport>
where
    F: FnMut(&Conversion),
{
    fs::create_dir_all(output_dir).map_err(|err| MigrateError::io(output_dir, err))?;

    let mut report = BatchReport::default();

    for csv_path in csv_files(data_dir)? {
        match convert_one(&csv_path, output_dir) {
            Ok(conversion) => {
                on_converted(&conversion);
                report.converted.push(conversion);
            }
            Err(err) if opts.keep_going => {
                error!("failed to convert {}: {}", csv_path.display(), err);
                report.failures.push((csv_path, err));
            }
            Err(err) => return Err(err),
        }
    }

    Ok(report)
}
