//! migratectl-db: pooled PostgreSQL access for the migration tools.
//!
//! The pool is an explicit, caller-owned object rather than a process-wide
//! singleton; handles return themselves to it when dropped.

pub mod error;
pub mod loader;
pub mod pool;
pub mod settings;

pub use error::{DbError, DbResult};
pub use loader::{load_script, LoadReport};
pub use pool::{ConnectionPool, PoolState, PooledConnection};
pub use settings::DatabaseSettings;
