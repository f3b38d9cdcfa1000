use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::config;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Corrupt row: {0}")]
    Decode(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Lazily created, process-wide PostgreSQL pool
pub struct DatabaseManager {
    pool: RwLock<Option<PgPool>>,
}

impl DatabaseManager {
    fn instance() -> &'static DatabaseManager {
        static INSTANCE: OnceLock<DatabaseManager> = OnceLock::new();
        INSTANCE.get_or_init(|| DatabaseManager {
            pool: RwLock::new(None),
        })
    }

    /// Get the shared pool, connecting on first use
    pub async fn pool() -> Result<PgPool, DatabaseError> {
        let manager = Self::instance();

        // Fast path: try read lock
        {
            let pool = manager.pool.read().await;
            if let Some(pool) = pool.as_ref() {
                return Ok(pool.clone());
            }
        }

        let mut slot = manager.pool.write().await;
        if let Some(pool) = slot.as_ref() {
            return Ok(pool.clone());
        }

        let pool = Self::connect(&Self::connection_string()?).await?;
        *slot = Some(pool.clone());
        Ok(pool)
    }

    /// Open a new pool with the configured limits
    pub async fn connect(connection_string: &str) -> Result<PgPool, DatabaseError> {
        let settings = &config::config().database;
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.connection_timeout))
            .connect(connection_string)
            .await?;

        info!("Created database pool (max_connections={})", settings.max_connections);
        Ok(pool)
    }

    fn connection_string() -> Result<String, DatabaseError> {
        let base = config::config()
            .database
            .url
            .clone()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        Self::validate_url(&base)
    }

    /// Only postgres URLs are accepted
    fn validate_url(raw: &str) -> Result<String, DatabaseError> {
        let url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(url.into()),
            _ => Err(DatabaseError::InvalidDatabaseUrl),
        }
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Close and drop the pool (e.g., on shutdown)
    pub async fn close() {
        let mut slot = Self::instance().pool.write().await;
        if let Some(pool) = slot.take() {
            pool.close().await;
            info!("Closed database pool");
        }
    }
}
