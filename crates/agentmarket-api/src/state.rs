//! Application State

use std::sync::Arc;
use std::time::Instant;

use agentmarket_db::Database;
use agentmarket_llm::AgentExecutor;
use serde::{Deserialize, Serialize};

/// Public on-chain coordinates handed to clients
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub chain_id: u64,
    pub marketplace_address: Option<String>,
    pub token_address: Option<String>,
    pub rpc_url: Option<String>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Catalog store
    pub db: Arc<Database>,
    /// Prompt execution service
    pub executor: Arc<AgentExecutor>,
    /// Contract addresses for `/api/config`
    pub market: MarketConfig,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: Arc<Database>, executor: Arc<AgentExecutor>, market: MarketConfig) -> Self {
        Self {
            db,
            executor,
            market,
            started_at: Instant::now(),
        }
    }
}
