//! Error types for migratectl-db

use std::path::PathBuf;

use thiserror::Error;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Error, Debug)]
pub enum DbError {
    /// Driver failure: unreachable server, pool exhausted (acquire timeout),
    /// failed statement
    #[error("Database error: {0}")]
    Sqlx(sqlx::Error),

    #[error("Connection pool is closed")]
    Closed,

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolClosed => DbError::Closed,
            other => DbError::Sqlx(other),
        }
    }
}
