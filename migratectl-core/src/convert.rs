//! CSV to SQL conversion for a single file.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use tracing::{debug, instrument};

use crate::error::{MigrateError, Result};
use crate::record::RecordReader;
use crate::sql::insert_statement;

pub const CSV_EXTENSION: &str = ".csv";
pub const SQL_EXTENSION: &str = ".sql";

/// Derive a table name from a CSV filename.
///
/// Drops the extension and the last underscore-separated token:
/// `patient_records_data.csv` -> `patient_records`. A name without an
/// underscore keeps its stem (`lab.csv` -> `lab`).
pub fn table_name_from_file(file_name: &str) -> Option<String> {
    let stem = match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(dot) => &file_name[..dot],
    };
    if stem.is_empty() {
        return None;
    }

    let table = match stem.rfind('_') {
        Some(idx) => &stem[..idx],
        None => stem,
    };

    if table.is_empty() {
        None
    } else {
        Some(table.to_string())
    }
}

/// `patient_data.csv` -> `patient_data.sql`
pub fn sql_file_name(csv_name: &str) -> String {
    let stem = csv_name.strip_suffix(CSV_EXTENSION).unwrap_or(csv_name);
    format!("{}{}", stem, SQL_EXTENSION)
}

/// Write one INSERT line per record read from `reader` into `out`.
///
/// Returns the number of statements written.
pub fn write_inserts<R: Read, W: Write>(
    reader: RecordReader<R>,
    table: &str,
    out: &mut W,
    target: &Path,
) -> Result<usize> {
    let header = reader.header().to_vec();
    let mut written = 0usize;

    for (idx, record) in reader.enumerate() {
        let record = record?;
        let stmt = insert_statement(table, &header, &record, idx + 1)?;
        writeln!(out, "{}", stmt).map_err(|err| MigrateError::io(target, err))?;
        written += 1;
    }

    Ok(written)
}

/// Convert `csv_path` into `sql_path`, overwriting it.
#[instrument(skip_all, fields(table = %table))]
pub fn convert_file(csv_path: &Path, table: &str, sql_path: &Path) -> Result<usize> {
    let reader = RecordReader::open(csv_path)?;
    let file = File::create(sql_path).map_err(|err| MigrateError::io(sql_path, err))?;
    let mut out = BufWriter::new(file);

    let written = write_inserts(reader, table, &mut out, sql_path)?;
    out.flush().map_err(|err| MigrateError::io(sql_path, err))?;

    debug!(
        statements = written,
        "wrote {} -> {}",
        csv_path.display(),
        sql_path.display()
    );
    Ok(written)
}
