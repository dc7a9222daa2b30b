//! Header-keyed CSV records.
//!
//! Every field is read as a string; nothing is parsed as a number or a date.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};

use crate::error::{MigrateError, Result};

/// One data row as an ordered column -> value mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair a header with a row's values. The caller guarantees equal lengths.
    pub fn from_parts(header: &[String], values: &StringRecord) -> Self {
        let fields = header
            .iter()
            .cloned()
            .zip(values.iter().map(str::to_string))
            .collect();
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Overwrite `column`, appending it if the record does not have it yet.
    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| name == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((column.to_string(), value)),
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Streaming reader yielding one `Record` per data row.
pub struct RecordReader<R: Read> {
    inner: csv::Reader<R>,
    header: Vec<String>,
    source: PathBuf,
    record: StringRecord,
}

impl RecordReader<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| MigrateError::io(path, err))?;
        Self::new(file, path)
    }
}

impl<R: Read> RecordReader<R> {
    /// Wrap any reader; `source` labels errors.
    pub fn new(reader: R, source: impl Into<PathBuf>) -> Result<Self> {
        let source = source.into();
        let mut inner = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let header = inner
            .headers()
            .map_err(|err| MigrateError::csv(&source, err))?
            .iter()
            .map(str::to_string)
            .collect();

        Ok(Self {
            inner,
            header,
            source,
            record: StringRecord::new(),
        })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.read_record(&mut self.record) {
            Ok(true) => Some(Ok(Record::from_parts(&self.header, &self.record))),
            Ok(false) => None,
            Err(err) => Some(Err(MigrateError::csv(&self.source, err))),
        }
    }
}

/// A fully loaded CSV file.
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub records: Vec<Record>,
}

impl CsvTable {
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let reader = RecordReader::open(path)?;
        Self::collect(reader)
    }

    pub fn from_reader<R: Read>(reader: R, source: impl Into<PathBuf>) -> Result<Self> {
        Self::collect(RecordReader::new(reader, source)?)
    }

    fn collect<R: Read>(reader: RecordReader<R>) -> Result<Self> {
        let header = reader.header().to_vec();
        let records = reader.collect::<Result<Vec<_>>>()?;
        Ok(Self { header, records })
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.header.iter().any(|c| c == column)
    }
}
