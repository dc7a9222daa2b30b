//! migratectl-core: file-level building blocks for a one-time CSV -> SQL
//! migration (conversion, dependency-ordered merging, column patching).

pub mod batch;
pub mod config;
pub mod convert;
pub mod error;
pub mod graph;
pub mod merge;
pub mod patch;
pub mod record;
pub mod sql;

pub use batch::{convert_folder, convert_folder_with, BatchOptions, BatchReport, Conversion};
pub use config::MigrateConfig;
pub use convert::{convert_file, sql_file_name, table_name_from_file};
pub use error::{MigrateError, Result};
pub use graph::{DependencyGraph, DependencyOrder, ForeignKey};
pub use merge::{merge_ordered, MergeOptions, MergeReport};
pub use patch::{patch_column, PatchOptions, PatchReport};
pub use record::{CsvTable, Record, RecordReader};
