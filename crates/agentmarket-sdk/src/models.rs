//! Wire models for the AgentMarket HTTP API

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use agentmarket_types::{parse_amount, AgentType, TypesResult};

// ============================================================================
// Requests
// ============================================================================

/// Body of `POST /api/agent/register`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAgent {
    pub contract_id: i64,
    pub owner: String,
    pub name: String,
    pub description: String,
    pub agent_type: AgentType,
    pub price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Body of `POST /api/agent/run`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAgent {
    pub agent_type: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

impl RunAgent {
    /// Unpaid run of an agent type
    pub fn new(agent_type: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            agent_type: agent_type.into(),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Attach the payment that settles this run
    pub fn paid_by(
        mut self,
        agent_id: impl Into<String>,
        buyer: impl Into<String>,
        tx_hash: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        self.agent_id = Some(agent_id.into());
        self.buyer = Some(buyer.into());
        self.tx_hash = Some(tx_hash.into());
        self.amount = Some(amount.into());
        self
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Catalog agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub contract_id: i64,
    pub owner: String,
    pub name: String,
    pub description: String,
    pub agent_type: String,
    pub price: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub active: bool,
    pub earnings: String,
    pub total_sales: i64,
    pub rating: f64,
    pub rating_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agent {
    pub fn price_amount(&self) -> TypesResult<Decimal> {
        parse_amount(&self.price)
    }
}

/// Purchase record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
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

/// Agent with its most recent transactions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDetail {
    #[serde(flatten)]
    pub agent: Agent,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// Outcome of an agent run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    pub agent_type: String,
    #[serde(default)]
    pub tokens_used: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AgentEnvelope {
    pub agent: Agent,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AgentList {
    pub agents: Vec<Agent>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TransactionEnvelope {
    pub transaction: Transaction,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StatsEnvelope {
    pub stats: MarketStats,
}

/// Running mean after a vote
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub rating: f64,
    pub rating_count: i64,
}

/// Per-agent line of an earnings report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentEarnings {
    pub id: String,
    pub contract_id: i64,
    pub name: String,
    pub earnings: String,
    pub total_sales: i64,
    pub rating: f64,
}

/// Earnings of one owner address
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Earnings {
    pub address: String,
    pub total_earnings: String,
    pub agent_count: usize,
    pub agents: Vec<AgentEarnings>,
}

/// Marketplace-wide aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStats {
    pub total_agents: i64,
    pub total_users: i64,
    pub total_transactions: i64,
    pub total_volume: String,
}

/// Public on-chain coordinates from `/api/config`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketConfig {
    pub chain_id: u64,
    #[serde(default)]
    pub marketplace_address: Option<String>,
    #[serde(default)]
    pub token_address: Option<String>,
    #[serde(default)]
    pub rpc_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub database: String,
    pub ai: String,
}

/// Service health
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    pub uptime_secs: u64,
    pub services: ServiceStatus,
}

impl Health {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub details: Vec<FieldDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FieldDetail {
    pub field: String,
    pub message: String,
}

impl ErrorBody {
    pub fn message(&self) -> String {
        if self.details.is_empty() {
            return self.error.clone();
        }
        let fields: Vec<String> = self
            .details
            .iter()
            .map(|d| format!("{}: {}", d.field, d.message))
            .collect();
        format!("{} ({})", self.error, fields.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_request_skips_absent_fields() {
        let body = serde_json::to_value(RunAgent::new("code", "Review this function")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"agentType": "code", "prompt": "Review this function"})
        );

        let paid = RunAgent::new("seo", "Audit example.com").paid_by("a1", "0xb", "0xt", "0.01");
        let body = serde_json::to_value(paid).unwrap();
        assert_eq!(body["agentId"], "a1");
        assert_eq!(body["txHash"], "0xt");
    }

    #[test]
    fn test_error_body_message() {
        let body: ErrorBody = serde_json::from_value(serde_json::json!({
            "success": false,
            "error": "Invalid request data",
            "details": [{"field": "prompt", "message": "must be 10-10000 characters"}]
        }))
        .unwrap();
        assert_eq!(
            body.message(),
            "Invalid request data (prompt: must be 10-10000 characters)"
        );
    }

    #[test]
    fn test_agent_detail_flattened() {
        let detail: AgentDetail = serde_json::from_value(serde_json::json!({
            "id": "a1",
            "contractId": 3,
            "owner": "0xabc",
            "name": "Reviewer",
            "description": "Reviews code",
            "agentType": "code",
            "price": "0.01",
            "metadata": {},
            "active": true,
            "earnings": "0",
            "totalSales": 0,
            "rating": 0.0,
            "ratingCount": 0,
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z",
            "transactions": []
        }))
        .unwrap();
        assert_eq!(detail.agent.contract_id, 3);
        assert!(detail.transactions.is_empty());
        assert_eq!(detail.agent.price_amount().unwrap().to_string(), "0.01");
    }
}
