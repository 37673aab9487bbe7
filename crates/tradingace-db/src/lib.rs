//! TradingAce Database Layer
//!
//! PostgreSQL persistence for campaigns, tasks and per-user task progress.
//!
//! # Repository Pattern
//!
//! Each table has its own repository returning `Db*` row models. [`PgStore`]
//! maps those rows onto the engine's store traits.
//!
//! Every trade event is written in a single transaction, and the
//! completed-is-sticky merge rule is evaluated by the upsert itself.

pub mod config;
pub mod error;
pub mod repos;
pub mod models;
pub mod store;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

pub use config::DatabaseConfig;
pub use error::{DbError, DbResult};
pub use repos::*;
pub use models::*;
pub use store::PgStore;

/// Database connection pool
pub struct Database {
    /// PostgreSQL connection pool
    pub pg: PgPool,
}

impl Database {
    /// Connect to PostgreSQL
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        info!("Connecting to PostgreSQL: {}", config.url_masked());

        let pg = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DbError::Connection(format!("PostgreSQL: {}", e)))?;

        info!("Connected to PostgreSQL");
        Ok(Self { pg })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> DbResult<()> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pg)
            .await
            .map_err(|e| DbError::Migration(e.to_string()))?;
        info!("Migrations complete");
        Ok(())
    }

    /// Whether PostgreSQL answers a trivial query
    pub async fn health_check(&self) -> HealthStatus {
        let postgres = sqlx::query("SELECT 1").fetch_one(&self.pg).await.is_ok();
        HealthStatus {
            postgres,
            healthy: postgres,
        }
    }

    /// Store implementing every engine trait over this pool
    pub fn store(&self) -> PgStore {
        PgStore::new(self.pg.clone())
    }
}

/// Health status of database connections
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthStatus {
    pub postgres: bool,
    pub healthy: bool,
}
