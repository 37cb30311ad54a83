//! AgentMarket Catalog Store
//!
//! Durable storage for the marketplace using SQLite through SQLx.
//!
//! # Tables
//!
//! - **agents**: registered agents with their sale counters and rating aggregate
//! - **transactions**: one row per purchase or execution attempt
//!
//! # Repository Pattern
//!
//! Each table has its own repository. Aggregate updates (ratings, sale
//! counters) are done inside the database so concurrent writers never
//! lose an update.

pub mod config;
pub mod error;
pub mod models;
pub mod repos;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

pub use config::{DatabaseConfig, DEFAULT_DATABASE_URL};
pub use error::{DbError, DbResult};
pub use models::*;
pub use repos::*;

/// Catalog connection pool
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the SQLite database
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        info!("Connecting to SQLite: {}", config.url_masked());

        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| DbError::Connection(format!("SQLite: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(config.acquire_timeout_secs));

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs));

        // Every connection to `:memory:` is a separate database, so the single
        // connection must never be recycled.
        if config.is_in_memory() {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection(format!("SQLite: {}", e)))?;

        info!("Connected to SQLite");

        Ok(Self { pool })
    }

    /// Fresh migrated in-memory catalog
    pub async fn in_memory() -> DbResult<Self> {
        let db = Self::connect(&DatabaseConfig::in_memory()).await?;
        db.migrate().await?;
        Ok(db)
    }

    /// Run database migrations
    pub async fn migrate(&self) -> DbResult<()> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DbError::Migration(e.to_string()))?;
        info!("Migrations complete");
        Ok(())
    }

    /// Health check
    pub async fn health_check(&self) -> DbResult<HealthStatus> {
        let sqlite_ok = sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok();

        Ok(HealthStatus {
            sqlite: sqlite_ok,
            healthy: sqlite_ok,
        })
    }

    pub fn agent_repo(&self) -> AgentRepo {
        AgentRepo::new(self.pool.clone())
    }

    pub fn transaction_repo(&self) -> TransactionRepo {
        TransactionRepo::new(self.pool.clone())
    }

    pub fn stats_repo(&self) -> StatsRepo {
        StatsRepo::new(self.pool.clone())
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Database health status
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthStatus {
    pub sqlite: bool,
    pub healthy: bool,
}
