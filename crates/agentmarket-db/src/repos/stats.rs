//! Marketplace-wide aggregates

use agentmarket_types::{sum_amounts, TransactionStatus, ANONYMOUS_BUYER};
use sqlx::SqlitePool;

use crate::{CatalogStats, DbResult};

pub struct StatsRepo {
    pool: SqlitePool,
}

impl StatsRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn snapshot(&self) -> DbResult<CatalogStats> {
        let total_agents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM agents")
            .fetch_one(&self.pool)
            .await?;

        let total_users: i64 =
            sqlx::query_scalar("SELECT COUNT(DISTINCT buyer) FROM transactions WHERE buyer != ?")
                .bind(ANONYMOUS_BUYER)
                .fetch_one(&self.pool)
                .await?;

        let amounts: Vec<String> =
            sqlx::query_scalar("SELECT amount FROM transactions WHERE status = ?")
                .bind(TransactionStatus::Completed.as_str())
                .fetch_all(&self.pool)
                .await?;

        Ok(CatalogStats {
            total_agents,
            total_users,
            total_transactions: amounts.len() as i64,
            total_volume: sum_amounts(amounts.iter().map(String::as_str)),
        })
    }
}
