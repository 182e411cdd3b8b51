use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use tracing::info;

use crate::config::{ConfigurationError, DatabaseConfig};
use crate::error::{CropMindError, Result};

/// Schema migrations bundled from `migrations/`
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    /// Open a pool sized from configuration and apply migrations when enabled
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config.url.as_deref().ok_or_else(|| {
            ConfigurationError::missing_required_field("database.url", "postgres backend")
        })?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(url)
            .await?;

        if config.run_migrations {
            MIGRATOR
                .run(&pool)
                .await
                .map_err(|e| CropMindError::DatabaseError(format!("migration failed: {e}")))?;
            info!("Database migrations applied");
        }

        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "💾 Database pool ready"
        );

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<bool> {
        let row = sqlx::query("SELECT 1 AS health")
            .fetch_one(&self.pool)
            .await?;

        let health: i32 = row.try_get("health")?;
        Ok(health == 1)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
