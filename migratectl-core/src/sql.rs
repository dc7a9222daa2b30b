//! Row serializer: records to SQL `INSERT` text.
//!
//! Values are always emitted as quoted string literals. Only `'` is escaped
//! (doubled); identifiers are written verbatim.

use crate::error::{MigrateError, Result};
use crate::record::Record;

/// Double every single quote.
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Wrap an escaped value in single quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", escape_literal(value))
}

/// Parse one quoted literal back into its string, or `None` if it is not a
/// well-formed `'...'` literal.
pub fn unescape_literal(literal: &str) -> Option<String> {
    let inner = literal.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\'' {
            // a lone quote would have terminated the literal
            if chars.next() != Some('\'') {
                return None;
            }
        }
        out.push(c);
    }

    Some(out)
}

/// `('<v1>', '<v2>', ...)` in header order.
///
/// `row` is the 1-based data row used in error messages.
pub fn values_tuple(record: &Record, header: &[String], row: usize) -> Result<String> {
    let values = header
        .iter()
        .map(|column| {
            record
                .get(column)
                .map(quote_literal)
                .ok_or_else(|| MigrateError::missing_field(column, row))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(format!("({})", values.join(", ")))
}

/// A full `INSERT INTO ... VALUES (...);` statement without trailing newline.
pub fn insert_statement(table: &str, header: &[String], record: &Record, row: usize) -> Result<String> {
    Ok(format!(
        "INSERT INTO {} ({}) VALUES {};",
        table,
        header.join(", "),
        values_tuple(record, header, row)?
    ))
}
