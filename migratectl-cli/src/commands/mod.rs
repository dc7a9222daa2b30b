//! Command implementations for migratectl CLI

pub mod convert;
pub mod db;
pub mod merge;
pub mod patch;

// Re-export dispatcher functions for flat access from main.rs
pub use convert::{run_convert, run_convert_file};
pub use db::run_db;
pub use merge::{run_merge, run_order};
pub use patch::run_patch;
