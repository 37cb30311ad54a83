//! Transaction repository
//!
//! Every purchase or execution attempt is one row. Rows are append-only apart
//! from their status; settling a row (moving it to `completed`) credits the
//! agent's earnings and sales counter in the same database transaction.

use agentmarket_types::{
    normalize_address, parse_amount, TransactionStatus, ANONYMOUS_BUYER, PENDING_TX_HASH,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::{DbError, DbResult, DbTransaction, NewTransaction};

/// Number of transactions embedded in an agent detail view
pub const RECENT_TRANSACTIONS: i64 = 10;

const LOCK_AGENT: &str = "UPDATE agents SET updated_at = updated_at WHERE id = ?";
const LOCK_TRANSACTION: &str = "UPDATE transactions SET status = status WHERE id = ?";

pub struct TransactionRepo {
    pool: SqlitePool,
}

impl TransactionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a transaction and, if it is completed, credit the agent
    pub async fn record_sale(&self, new: &NewTransaction) -> DbResult<DbTransaction> {
        if new.amount.is_sign_negative() {
            return Err(DbError::InvalidInput(format!(
                "amount must be non-negative: {}",
                new.amount
            )));
        }

        let mut tx = self.pool.begin().await?;

        if !lock_row(&mut tx, LOCK_AGENT, &new.agent_id).await? {
            return Err(DbError::NotFound(format!("Agent {}", new.agent_id)));
        }

        let buyer = new
            .buyer
            .as_deref()
            .map(normalize_address)
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| ANONYMOUS_BUYER.to_string());
        let tx_hash = new
            .tx_hash
            .clone()
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| PENDING_TX_HASH.to_string());

        let row = sqlx::query_as::<_, DbTransaction>(
            r#"
            INSERT INTO transactions (id, agent_id, buyer, amount, tx_hash, status, prompt, response, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&new.agent_id)
        .bind(buyer)
        .bind(new.amount.normalize().to_string())
        .bind(tx_hash)
        .bind(new.status.as_str())
        .bind(&new.prompt)
        .bind(&new.response)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::from_write)?;

        if new.status.is_settled() {
            credit_agent(&mut tx, &new.agent_id, new.amount, 1).await?;
        }

        tx.commit().await?;

        debug!(id = %row.id, agent_id = %row.agent_id, status = %row.status, "Recorded transaction");

        Ok(row)
    }

    /// Find transaction by ID
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<DbTransaction>> {
        let row = sqlx::query_as::<_, DbTransaction>("SELECT * FROM transactions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Most recent transactions for an agent, newest first
    pub async fn recent_for_agent(&self, agent_id: &str, limit: i64) -> DbResult<Vec<DbTransaction>> {
        let rows = sqlx::query_as::<_, DbTransaction>(
            r#"
            SELECT * FROM transactions
            WHERE agent_id = ?
            ORDER BY timestamp DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(agent_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Change a transaction's status.
    ///
    /// Crossing into `completed` credits the agent, leaving it debits the
    /// agent, so the counters always match the set of settled rows.
    pub async fn update_status(
        &self,
        id: &str,
        status: TransactionStatus,
    ) -> DbResult<Option<DbTransaction>> {
        let mut tx = self.pool.begin().await?;

        if !lock_row(&mut tx, LOCK_TRANSACTION, id).await? {
            return Ok(None);
        }

        let current = sqlx::query_as::<_, DbTransaction>("SELECT * FROM transactions WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(current) = current else {
            return Ok(None);
        };

        let was_settled = current.status().map(|s| s.is_settled()).unwrap_or(false);

        let updated = sqlx::query_as::<_, DbTransaction>(
            "UPDATE transactions SET status = ? WHERE id = ? RETURNING *",
        )
        .bind(status.as_str())
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::from_write)?;

        match (was_settled, status.is_settled()) {
            (false, true) => {
                credit_agent(&mut tx, &current.agent_id, current.amount_value(), 1).await?
            }
            (true, false) => {
                credit_agent(&mut tx, &current.agent_id, -current.amount_value(), -1).await?
            }
            _ => {}
        }

        tx.commit().await?;

        Ok(Some(updated))
    }
}

/// No-op write on one row, returning whether the row exists.
///
/// Must be the first statement of the transaction. A transaction that reads
/// before writing gets `SQLITE_BUSY` on lock upgrade instead of waiting on the
/// busy timeout.
async fn lock_row(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    lock_sql: &'static str,
    id: &str,
) -> DbResult<bool> {
    let result = sqlx::query(lock_sql).bind(id).execute(&mut **tx).await?;
    Ok(result.rows_affected() > 0)
}

/// Adjust earnings and sales of an agent inside an open transaction.
///
/// Earnings are stored as decimal text, so the sum is computed here rather
/// than in SQL. The caller must already hold the write lock ([`lock_row`]).
async fn credit_agent(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    agent_id: &str,
    amount: Decimal,
    sales_delta: i64,
) -> DbResult<()> {
    let earnings: Option<String> = sqlx::query_scalar("SELECT earnings FROM agents WHERE id = ?")
        .bind(agent_id)
        .fetch_optional(&mut **tx)
        .await?;
    let earnings = earnings.ok_or_else(|| DbError::NotFound(format!("Agent {}", agent_id)))?;

    let current = parse_amount(&earnings).unwrap_or_default();
    let updated = (current + amount).max(Decimal::ZERO).normalize();

    sqlx::query(
        r#"
        UPDATE agents
        SET earnings = ?, total_sales = MAX(total_sales + ?, 0), updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(updated.to_string())
    .bind(sales_delta)
    .bind(Utc::now())
    .bind(agent_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
