//! Lazily created, bounded PostgreSQL connection pool.
//!
//! Lifecycle: `Uninitialized` until the first acquisition creates the pool,
//! `Active` afterwards, `Closed` once `close` has been called. Closed is
//! terminal: every later acquisition fails with [`DbError::Closed`].

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Postgres;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use crate::error::{DbError, DbResult};
use crate::settings::DatabaseSettings;

/// A checked-out connection. Dropping it returns it to the pool.
pub type PooledConnection = PoolConnection<Postgres>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    Uninitialized,
    Active,
    Closed,
}

pub struct ConnectionPool {
    settings: DatabaseSettings,
    pool: OnceCell<PgPool>,
    closed: AtomicBool,
    initializations: AtomicUsize,
}

impl ConnectionPool {
    pub fn new(settings: DatabaseSettings) -> Self {
        Self {
            settings,
            pool: OnceCell::new(),
            closed: AtomicBool::new(false),
            initializations: AtomicUsize::new(0),
        }
    }

    pub fn settings(&self) -> &DatabaseSettings {
        &self.settings
    }

    pub fn state(&self) -> PoolState {
        if self.closed.load(Ordering::Acquire) {
            PoolState::Closed
        } else if self.pool.initialized() {
            PoolState::Active
        } else {
            PoolState::Uninitialized
        }
    }

    /// How many times the underlying pool has been created (0 or 1).
    pub fn initializations(&self) -> usize {
        self.initializations.load(Ordering::Acquire)
    }

    /// Create the pool if needed. Repeated and concurrent calls share the
    /// first initialization. Connections are opened on demand, so an
    /// unreachable server surfaces on `acquire`, not here.
    pub async fn initialize(&self) -> DbResult<&PgPool> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DbError::Closed);
        }

        self.pool
            .get_or_try_init(|| async {
                let pool = PgPoolOptions::new()
                    .min_connections(self.settings.min_connections)
                    .max_connections(self.settings.max_connections)
                    .acquire_timeout(self.settings.acquire_timeout)
                    .connect_lazy_with(self.settings.connect.clone());

                self.initializations.fetch_add(1, Ordering::AcqRel);
                info!(
                    database = %self.settings.describe(),
                    min = self.settings.min_connections,
                    max = self.settings.max_connections,
                    "Connection pool created"
                );
                Ok::<_, DbError>(pool)
            })
            .await
    }

    /// Check out one connection. Fails when closed, when the pool stays
    /// exhausted past the acquire timeout, or when the server is unreachable.
    #[instrument(skip(self))]
    pub async fn acquire(&self) -> DbResult<PooledConnection> {
        let pool = self.initialize().await?;
        let conn = pool.acquire().await?;

        // close() may have raced with the checkout
        if self.closed.load(Ordering::Acquire) {
            return Err(DbError::Closed);
        }

        debug!(size = pool.size(), idle = pool.num_idle(), "connection acquired");
        Ok(conn)
    }

    /// Return a connection explicitly. No health check is performed.
    pub fn release(&self, conn: PooledConnection) {
        drop(conn);
        debug!("connection released");
    }

    /// Shut the pool down. Idle connections close immediately; the call
    /// returns once every checked-out connection has been released and
    /// closed. Idempotent.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Some(pool) = self.pool.get() {
            pool.close().await;
            info!("All connections closed");
        }
    }

    /// `SELECT version()` on a pooled connection.
    pub async fn server_version(&self) -> DbResult<String> {
        let mut conn = self.acquire().await?;
        let version: String = sqlx::query_scalar("SELECT version()")
            .fetch_one(&mut *conn)
            .await?;
        Ok(version)
    }
}
