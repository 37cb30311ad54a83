//! Database models - mapped from SQLite tables

use agentmarket_types::{parse_amount, AgentType, TransactionStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

// ============================================================================
// Agent Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbAgent {
    pub id: String,
    pub contract_id: i64,
    pub owner: String,
    pub name: String,
    pub description: String,
    pub agent_type: String,
    pub price: String,
    pub metadata: Json<serde_json::Value>,
    pub active: bool,
    pub earnings: String,
    pub total_sales: i64,
    pub rating: f64,
    pub rating_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbAgent {
    pub fn kind(&self) -> Option<AgentType> {
        self.agent_type.parse().ok()
    }

    pub fn price_amount(&self) -> Decimal {
        parse_amount(&self.price).unwrap_or_default()
    }

    pub fn earnings_amount(&self) -> Decimal {
        parse_amount(&self.earnings).unwrap_or_default()
    }
}

/// Fields supplied when an agent is registered
#[derive(Debug, Clone)]
pub struct NewAgent {
    pub contract_id: i64,
    pub owner: String,
    pub name: String,
    pub description: String,
    pub agent_type: AgentType,
    pub price: Decimal,
    pub metadata: serde_json::Value,
}

/// Listing filter. Only active agents are ever listed.
#[derive(Debug, Clone, Default)]
pub struct AgentFilter {
    pub agent_type: Option<AgentType>,
    pub owner: Option<String>,
}

// ============================================================================
// Transaction Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbTransaction {
    pub id: String,
    pub agent_id: String,
    pub buyer: String,
    pub amount: String,
    pub tx_hash: String,
    pub status: String,
    pub prompt: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

impl DbTransaction {
    pub fn status(&self) -> Option<TransactionStatus> {
        self.status.parse().ok()
    }

    pub fn amount_value(&self) -> Decimal {
        parse_amount(&self.amount).unwrap_or_default()
    }
}

/// Fields supplied when a purchase or execution attempt is recorded
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub agent_id: String,
    /// Buyer wallet; `None` is stored as `anonymous`
    pub buyer: Option<String>,
    pub amount: Decimal,
    /// Chain hash; `None` is stored as `pending`
    pub tx_hash: Option<String>,
    pub status: TransactionStatus,
    pub prompt: String,
    pub response: String,
}

// ============================================================================
// Aggregates
// ============================================================================

/// Marketplace-wide counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_agents: i64,
    /// Distinct known buyer wallets
    pub total_users: i64,
    /// Completed transactions
    pub total_transactions: i64,
    /// Sum of completed transaction amounts
    pub total_volume: Decimal,
}
