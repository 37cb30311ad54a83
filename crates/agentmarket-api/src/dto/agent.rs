//! Agent DTOs

use agentmarket_db::{DbAgent, DbTransaction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::common::{validate_agent_type, validate_amount};
use super::transaction::TransactionDto;

/// Register agent request
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAgentRequest {
    /// On-chain agent id assigned by the marketplace contract
    #[validate(range(min = 0, message = "must be a non-negative integer"))]
    pub contract_id: i64,
    /// Owner wallet address
    #[validate(length(min = 1, max = 128, message = "must be 1-128 characters"))]
    pub owner: String,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 2000, message = "must be 1-2000 characters"))]
    pub description: String,
    /// `code`, `seo`, `content` or `data`
    #[validate(custom(function = "validate_agent_type"))]
    pub agent_type: String,
    /// Price per run in the chain's native unit, as a decimal string
    #[validate(custom(function = "validate_amount"))]
    pub price: String,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Run agent request
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunAgentRequest {
    /// Selects the system prompt; unknown values yield a failure result
    pub agent_type: String,
    #[validate(length(min = 10, max = 10000, message = "must be 10-10000 characters"))]
    pub prompt: String,
    /// Catalog agent to record the run against
    #[serde(default)]
    pub agent_id: Option<String>,
    /// Paying wallet
    #[serde(default)]
    #[validate(length(min = 1, max = 128, message = "must be 1-128 characters"))]
    pub buyer: Option<String>,
    /// Payment transaction hash
    #[serde(default)]
    #[validate(length(min = 1, max = 128, message = "must be 1-128 characters"))]
    pub tx_hash: Option<String>,
    /// Amount paid, decimal string
    #[serde(default)]
    pub amount: Option<String>,
}

/// Rate agent request
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct RateAgentRequest {
    #[validate(range(min = 1.0, max = 5.0, message = "must be between 1 and 5"))]
    pub rating: f64,
}

/// Listing filter
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListAgentsQuery {
    /// Agent type
    #[serde(rename = "type")]
    pub agent_type: Option<String>,
    /// Owner address (case-insensitive)
    pub owner: Option<String>,
}

/// Agent record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentDto {
    pub id: String,
    pub contract_id: i64,
    pub owner: String,
    pub name: String,
    pub description: String,
    pub agent_type: String,
    pub price: String,
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
    pub active: bool,
    pub earnings: String,
    pub total_sales: i64,
    pub rating: f64,
    pub rating_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbAgent> for AgentDto {
    fn from(agent: DbAgent) -> Self {
        Self {
            id: agent.id,
            contract_id: agent.contract_id,
            owner: agent.owner,
            name: agent.name,
            description: agent.description,
            agent_type: agent.agent_type,
            price: agent.price,
            metadata: agent.metadata.0,
            active: agent.active,
            earnings: agent.earnings,
            total_sales: agent.total_sales,
            rating: agent.rating,
            rating_count: agent.rating_count,
            created_at: agent.created_at,
            updated_at: agent.updated_at,
        }
    }
}

/// Agent with its most recent transactions
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AgentDetail {
    #[serde(flatten)]
    pub agent: AgentDto,
    pub transactions: Vec<TransactionDto>,
}

impl AgentDetail {
    pub fn new(agent: DbAgent, transactions: Vec<DbTransaction>) -> Self {
        Self {
            agent: agent.into(),
            transactions: transactions.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AgentResponse {
    pub success: bool,
    pub agent: AgentDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AgentListResponse {
    pub success: bool,
    pub agents: Vec<AgentDto>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub success: bool,
    pub rating: f64,
    pub rating_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn register(value: serde_json::Value) -> RegisterAgentRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_register_validation() {
        let ok = register(json!({
            "contractId": 3,
            "owner": "0xAbC",
            "name": "Reviewer",
            "description": "Reviews Rust",
            "agentType": "code",
            "price": "0.01"
        }));
        assert!(ok.validate().is_ok());

        let bad = register(json!({
            "contractId": -1,
            "owner": "",
            "name": "Reviewer",
            "description": "Reviews Rust",
            "agentType": "legal",
            "price": "free"
        }));
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("contract_id"));
        assert!(fields.contains_key("owner"));
        assert!(fields.contains_key("agent_type"));
        assert!(fields.contains_key("price"));
        assert!(!fields.contains_key("name"));
    }

    #[test]
    fn test_run_prompt_bounds() {
        let short: RunAgentRequest =
            serde_json::from_value(json!({"agentType": "code", "prompt": "too short"})).unwrap();
        assert!(short.validate().is_err());

        let ok: RunAgentRequest =
            serde_json::from_value(json!({"agentType": "anything", "prompt": "long enough prompt"}))
                .unwrap();
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_rating_bounds() {
        assert!(RateAgentRequest { rating: 1.0 }.validate().is_ok());
        assert!(RateAgentRequest { rating: 5.0 }.validate().is_ok());
        assert!(RateAgentRequest { rating: 0.5 }.validate().is_err());
        assert!(RateAgentRequest { rating: 5.1 }.validate().is_err());
    }
}
