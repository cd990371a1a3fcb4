use sqlx::{postgres::PgPoolOptions, Executor, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the document store layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    pub fn is_duplicate_key(&self) -> bool {
        match self {
            DatabaseError::DuplicateKey(_) => true,
            DatabaseError::Sqlx(sqlx::Error::Database(db)) => db.is_unique_violation(),
            _ => false,
        }
    }
}

const PRODUCTS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS "products" (
    "id"            UUID PRIMARY KEY,
    "name"          TEXT NOT NULL CHECK (length(btrim("name")) > 0),
    "price"         DOUBLE PRECISION NOT NULL CHECK ("price" >= 0),
    "stock"         BIGINT NOT NULL DEFAULT 0 CHECK ("stock" >= 0),
    "category"      TEXT NOT NULL CHECK (length(btrim("category")) > 0),
    "stock_visible" BOOLEAN NOT NULL DEFAULT TRUE,
    "user_id"       UUID NOT NULL,
    "created_at"    TIMESTAMPTZ NOT NULL DEFAULT now(),
    "updated_at"    TIMESTAMPTZ NOT NULL DEFAULT now()
);
CREATE INDEX IF NOT EXISTS "products_user_category_idx" ON "products" ("user_id", "category");
CREATE INDEX IF NOT EXISTS "products_user_stock_idx" ON "products" ("user_id", "stock");
"#;

/// Owns the connection pool for the products database
#[derive(Clone)]
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    /// Connect using the configured `DATABASE_URL`
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = config.url.as_deref().ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the products table and its indexes if missing
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        (&self.pool).execute(PRODUCTS_SCHEMA).await?;
        info!("Products schema is up to date");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_requires_url() {
        let config = crate::config::AppConfig::development().database;
        let err = DatabaseManager::connect(&config).await.err().unwrap();
        assert!(matches!(err, DatabaseError::ConfigMissing("DATABASE_URL")));
    }

    #[test]
    fn duplicate_key_is_detected() {
        assert!(DatabaseError::DuplicateKey("id".into()).is_duplicate_key());
        assert!(!DatabaseError::QueryError("boom".into()).is_duplicate_key());
    }

    #[test]
    fn schema_declares_owner_indexes() {
        assert!(PRODUCTS_SCHEMA.contains("(\"user_id\", \"category\")"));
        assert!(PRODUCTS_SCHEMA.contains("(\"user_id\", \"stock\")"));
    }
}
