//! Column patcher: copy one column from a first CSV into a second CSV.
//!
//! Rows are paired by position (zip, shorter file wins) unless a join key is
//! given, in which case they are paired by equal key values.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::error::{MigrateError, Result};
use crate::record::{CsvTable, Record};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOptions {
    /// Column copied from the first file into the second
    pub column: String,
    /// Pair rows on this column instead of by position
    pub join_key: Option<String>,
}

impl PatchOptions {
    pub fn positional(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            join_key: None,
        }
    }

    pub fn keyed(column: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            join_key: Some(key.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub output: PathBuf,
    pub written: usize,
    pub first_rows: usize,
    pub second_rows: usize,
    /// First-file rows that did not patch anything
    pub unpaired_first: usize,
    /// Second-file rows without a partner: dropped when positional, written
    /// unpatched when keyed
    pub unpaired_second: usize,
}

impl PatchReport {
    pub fn is_aligned(&self) -> bool {
        self.unpaired_first == 0 && self.unpaired_second == 0
    }
}

/// Patched rows plus their accounting, before anything is written.
#[derive(Debug, Clone)]
pub struct Patched {
    pub header: Vec<String>,
    pub rows: Vec<Record>,
    pub report: PatchReport,
}

fn require_column(table: &CsvTable, column: &str, path: &Path) -> Result<()> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(MigrateError::unknown_column(column, path))
    }
}

/// Pair up rows and patch `opts.column`. Output rows use the first file's
/// header order.
pub fn patch_tables(
    first: &CsvTable,
    first_path: &Path,
    second: &CsvTable,
    second_path: &Path,
    opts: &PatchOptions,
) -> Result<Patched> {
    require_column(first, &opts.column, first_path)?;
    require_column(second, &opts.column, second_path)?;

    let mut report = PatchReport {
        first_rows: first.records.len(),
        second_rows: second.records.len(),
        ..Default::default()
    };

    let rows = match &opts.join_key {
        None => {
            let rows: Vec<Record> = first
                .records
                .iter()
                .zip(&second.records)
                .map(|(source, target)| patch_row(source, target, &opts.column))
                .collect();
            report.unpaired_first = first.records.len() - rows.len();
            report.unpaired_second = second.records.len() - rows.len();
            rows
        }
        Some(key) => {
            require_column(first, key, first_path)?;
            require_column(second, key, second_path)?;
            keyed_patch(first, second, key, &opts.column, &mut report)?
        }
    };

    report.written = rows.len();
    Ok(Patched {
        header: first.header.clone(),
        rows,
        report,
    })
}

fn patch_row(source: &Record, target: &Record, column: &str) -> Record {
    let mut patched = target.clone();
    patched.set(column, source.get(column).unwrap_or_default());
    patched
}

fn keyed_patch(
    first: &CsvTable,
    second: &CsvTable,
    key: &str,
    column: &str,
    report: &mut PatchReport,
) -> Result<Vec<Record>> {
    let mut index: HashMap<&str, &Record> = HashMap::with_capacity(first.records.len());
    for record in &first.records {
        let value = record.get(key).unwrap_or_default();
        if index.insert(value, record).is_some() {
            return Err(MigrateError::DuplicateKey {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
    }

    let mut used = HashSet::new();
    let mut rows = Vec::with_capacity(second.records.len());
    for target in &second.records {
        let value = target.get(key).unwrap_or_default();
        match index.get(value) {
            Some(source) => {
                used.insert(value);
                rows.push(patch_row(source, target, column));
            }
            None => {
                report.unpaired_second += 1;
                rows.push(target.clone());
            }
        }
    }

    report.unpaired_first = index.len() - used.len();
    Ok(rows)
}

/// Write rows under `header`. Header columns missing from a row are written
/// empty; row columns missing from the header are an error.
///
/// Rows are checked before `path` is opened, so a rejected write leaves an
/// existing file untouched.
pub fn write_records(path: &Path, header: &[String], rows: &[Record]) -> Result<()> {
    for row in rows {
        if let Some(extra) = row.columns().find(|c| !header.iter().any(|h| h == c)) {
            return Err(MigrateError::UnexpectedColumn {
                column: extra.to_string(),
            });
        }
    }

    let mut writer = csv::Writer::from_path(path).map_err(|err| MigrateError::csv(path, err))?;
    writer
        .write_record(header)
        .map_err(|err| MigrateError::csv(path, err))?;

    for row in rows {
        let values = header.iter().map(|column| row.get(column).unwrap_or_default());
        writer
            .write_record(values)
            .map_err(|err| MigrateError::csv(path, err))?;
    }

    writer.flush().map_err(|err| MigrateError::io(path, err))
}

/// Read both files, patch, and write the second file's rows to `output`.
#[instrument(skip(opts), fields(column = %opts.column))]
pub fn patch_column(first: &Path, second: &Path, output: &Path, opts: &PatchOptions) -> Result<PatchReport> {
    let first_table = CsvTable::read(first)?;
    let second_table = CsvTable::read(second)?;

    let Patched {
        header,
        rows,
        mut report,
    } = patch_tables(&first_table, first, &second_table, second, opts)?;

    write_records(output, &header, &rows)?;
    report.output = output.to_path_buf();

    if !report.is_aligned() {
        warn!(
            first_rows = report.first_rows,
            second_rows = report.second_rows,
            unpaired_first = report.unpaired_first,
            unpaired_second = report.unpaired_second,
            "row counts do not line up between {} and {}",
            first.display(),
            second.display()
        );
    }
    info!(
        written = report.written,
        "Updated {} in {} using {} and saved to {}",
        opts.column,
        second.display(),
        first.display(),
        output.display()
    );

    Ok(report)
}
