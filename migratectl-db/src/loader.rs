//! Replay a merged SQL script through the pool.

use std::path::Path;

use sqlx::Connection;
use tracing::{info, instrument};

use crate::error::{DbError, DbResult};
use crate::pool::ConnectionPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub bytes: usize,
    pub rows_affected: u64,
}

/// Execute the whole script in one transaction on one pooled connection.
/// Any failing statement rolls everything back.
#[instrument(skip(pool))]
pub async fn load_script(pool: &ConnectionPool, path: &Path) -> DbResult<LoadReport> {
    let script = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DbError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let mut conn = pool.acquire().await?;
    let mut tx = conn.begin().await?;
    let result = sqlx::raw_sql(&script).execute(&mut *tx).await?;
    tx.commit().await?;

    let report = LoadReport {
        bytes: script.len(),
        rows_affected: result.rows_affected(),
    };
    info!(rows = report.rows_affected, "loaded {}", path.display());
    Ok(report)
}
