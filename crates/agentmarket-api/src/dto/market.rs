//! Marketplace-wide DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-agent line of an earnings report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentEarnings {
    pub id: String,
    pub contract_id: i64,
    pub name: String,
    pub earnings: String,
    pub total_sales: i64,
    pub rating: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EarningsResponse {
    pub success: bool,
    /// Lower-cased owner address
    pub address: String,
    /// Sum over every agent the address owns, decimal string
    pub total_earnings: String,
    pub agent_count: usize,
    pub agents: Vec<AgentEarnings>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarketStats {
    pub total_agents: i64,
    /// Distinct buyer wallets
    pub total_users: i64,
    /// Completed transactions
    pub total_transactions: i64,
    /// Sum of completed transaction amounts, decimal string
    pub total_volume: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: MarketStats,
}

/// Public chain configuration for wallets
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub success: bool,
    pub chain_id: u64,
    pub marketplace_address: Option<String>,
    pub token_address: Option<String>,
    pub rpc_url: Option<String>,
}
