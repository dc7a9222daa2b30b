/// Structured error types for migratectl-core.
///
/// Library code returns `MigrateError`; the CLI wraps it with `anyhow`
/// context at each call site.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for migratectl-core operations
#[derive(Error, Debug)]
pub enum MigrateError {
    /// I/O operation failed
    #[error("I/O error on {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },

    /// CSV parsing or writing failed (includes rows shorter than the header)
    #[error("CSV error in {path:?}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    /// A header column has no value in a record
    #[error("Missing field '{field}' in row {row}")]
    MissingField { field: String, row: usize },

    /// A requested column is not part of a file's header
    #[error("Column '{column}' not found in header of {path:?}")]
    UnknownColumn { column: String, path: PathBuf },

    /// A record carries a column the output header does not know about
    #[error("Column '{column}' is not part of the output header")]
    UnexpectedColumn { column: String },

    /// Join key occurs more than once in the keyed file
    #[error("Duplicate join key '{value}' for column '{key}'")]
    DuplicateKey { key: String, value: String },

    /// Foreign-key edges form a cycle
    #[error("Circular foreign key dependency detected involving table '{table}'")]
    DependencyCycle { table: String },

    /// A filename cannot be turned into a table name
    #[error("Cannot derive a table name from {path:?}")]
    InvalidFileName { path: PathBuf },

    /// Configuration error
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for migratectl-core operations
pub type Result<T> = std::result::Result<T, MigrateError>;

impl MigrateError {
    /// Create an I/O error bound to a path
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a CSV error bound to a path
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    pub fn missing_field(field: impl Into<String>, row: usize) -> Self {
        Self::MissingField {
            field: field.into(),
            row,
        }
    }

    pub fn unknown_column(column: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::UnknownColumn {
            column: column.into(),
            path: path.into(),
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}
