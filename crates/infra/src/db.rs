//! Database pool lifecycle.
//!
//! The pool is explicit process state: opened once at startup, injected into
//! the stores, closed on shutdown. Nothing reads it from a global.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use taproll_core::StoreError;

/// Owned connection pool with an explicit open/close lifecycle.
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Open a connection pool against `url`.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(|e| StoreError::unavailable(format!("connect failed: {e}")))?;
        Ok(Self { pool })
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::unavailable(format!("migration failed: {e}")))?;
        tracing::info!("database migrations applied");
        Ok(())
    }

    /// Cheap clone of the underlying pool for store constructors.
    pub fn pool(&self) -> PgPool {
        self.pool.clone()
    }

    /// Close all connections. Call once during shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("database pool closed");
    }
}
