//! Agent repository

use agentmarket_types::{normalize_address, RatingAggregate};
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{AgentFilter, DbAgent, DbError, DbResult, NewAgent};

/// Maximum number of agents returned by a listing
pub const LIST_LIMIT: i64 = 50;

/// Agent repository for registration, discovery and ratings
pub struct AgentRepo {
    pool: SqlitePool,
}

impl AgentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a new agent. Counters start at zero and the agent is active.
    pub async fn create(&self, agent: &NewAgent) -> DbResult<DbAgent> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, DbAgent>(
            r#"
            INSERT INTO agents (
                id, contract_id, owner, name, description, agent_type, price, metadata,
                active, earnings, total_sales, rating, rating_count, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, TRUE, '0', 0, 0, 0, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(agent.contract_id)
        .bind(normalize_address(&agent.owner))
        .bind(&agent.name)
        .bind(&agent.description)
        .bind(agent.agent_type.as_str())
        .bind(agent.price.normalize().to_string())
        .bind(Json(&agent.metadata))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from_write)?;

        Ok(row)
    }

    /// Find agent by ID
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<DbAgent>> {
        let agent = sqlx::query_as::<_, DbAgent>("SELECT * FROM agents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(agent)
    }

    /// Active agents matching the filter, best rated first, ties broken by sales
    pub async fn list_active(&self, filter: &AgentFilter) -> DbResult<Vec<DbAgent>> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM agents WHERE active = TRUE");

        if let Some(agent_type) = filter.agent_type {
            qb.push(" AND agent_type = ").push_bind(agent_type.as_str());
        }
        if let Some(owner) = &filter.owner {
            qb.push(" AND owner = ").push_bind(normalize_address(owner));
        }

        qb.push(" ORDER BY rating DESC, total_sales DESC, created_at ASC LIMIT ")
            .push_bind(LIST_LIMIT);

        let agents = qb.build_query_as::<DbAgent>().fetch_all(&self.pool).await?;

        Ok(agents)
    }

    /// Every agent owned by an address, active or not
    pub async fn list_by_owner(&self, owner: &str) -> DbResult<Vec<DbAgent>> {
        let agents = sqlx::query_as::<_, DbAgent>(
            "SELECT * FROM agents WHERE owner = ? ORDER BY created_at ASC",
        )
        .bind(normalize_address(owner))
        .fetch_all(&self.pool)
        .await?;

        Ok(agents)
    }

    /// Fold one vote into the running mean.
    ///
    /// The read-modify-write happens in a single statement so concurrent
    /// votes cannot overwrite each other. Returns `None` for unknown agents.
    pub async fn record_rating(&self, id: &str, vote: f64) -> DbResult<Option<RatingAggregate>> {
        let vote = RatingAggregate::validate_vote(vote)?;

        let row = sqlx::query_as::<_, (f64, i64)>(
            r#"
            UPDATE agents
            SET rating = (rating * rating_count + ?) / (rating_count + 1),
                rating_count = rating_count + 1,
                updated_at = ?
            WHERE id = ?
            RETURNING rating, rating_count
            "#,
        )
        .bind(vote)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(rating, rating_count)| RatingAggregate::new(rating, rating_count)))
    }

    /// Flip the active flag
    pub async fn toggle_active(&self, id: &str) -> DbResult<Option<DbAgent>> {
        let agent = sqlx::query_as::<_, DbAgent>(
            "UPDATE agents SET active = NOT active, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(agent)
    }
}
