use sqlx::AnyPool;

use crate::config::{DatabaseConfig, Dialect};
use crate::core::Result;

/// Owner of the process-wide connection pool
///
/// The pool is opened on first use and can be disposed at any time; the
/// next `pool()` call reconnects.
pub struct Database {
    config: DatabaseConfig,
    dialect: Dialect,
    pool: Option<AnyPool>,
}

impl Database {
    pub fn new(config: DatabaseConfig) -> Result<Self> {
        let dialect = config.dialect()?;
        Ok(Self {
            config,
            dialect,
            pool: None,
        })
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn is_connected(&self) -> bool {
        self.pool.as_ref().is_some_and(|pool| !pool.is_closed())
    }

    /// Handle to the pool, connecting first if needed
    pub async fn pool(&mut self) -> Result<AnyPool> {
        if let Some(pool) = self.pool.as_ref().filter(|pool| !pool.is_closed()) {
            return Ok(pool.clone());
        }

        let pool = self.config.create_pool().await?;
        tracing::debug!(
            target_url = %self.config.redacted_url(),
            max_connections = self.config.max_connections,
            "Connection pool opened"
        );
        Ok(self.pool.insert(pool).clone())
    }

    /// Close every pooled connection
    ///
    /// Waits for checked-out connections to come back, so any open
    /// transaction must be finished first.
    pub async fn dispose(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
            tracing::debug!(
                target_url = %self.config.redacted_url(),
                "Connection pool disposed"
            );
        }
    }
}
