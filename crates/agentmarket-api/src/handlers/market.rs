//! Marketplace Handlers
//!
//! Earnings per owner, global statistics and public chain configuration.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use rust_decimal::Decimal;

use agentmarket_types::normalize_address;

use crate::dto::{AgentEarnings, ConfigResponse, EarningsResponse, MarketStats, StatsResponse};
use crate::error::{db_failure, ApiResult};
use crate::state::AppState;

/// Earnings across every agent an address owns, active or not
#[utoipa::path(
    get,
    path = "/api/earnings/{address}",
    tag = "Market",
    params(("address" = String, Path, description = "Owner wallet address")),
    responses(
        (status = 200, description = "Earnings report", body = EarningsResponse)
    )
)]
pub async fn get_earnings(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> ApiResult<Json<EarningsResponse>> {
    let address = normalize_address(&address);

    let agents = state
        .db
        .agent_repo()
        .list_by_owner(&address)
        .await
        .map_err(db_failure("Failed to fetch earnings"))?;

    let total: Decimal = agents.iter().map(|a| a.earnings_amount()).sum();

    let agents: Vec<AgentEarnings> = agents
        .into_iter()
        .map(|a| AgentEarnings {
            earnings: a.earnings_amount().normalize().to_string(),
            id: a.id,
            contract_id: a.contract_id,
            name: a.name,
            total_sales: a.total_sales,
            rating: a.rating,
        })
        .collect();

    Ok(Json(EarningsResponse {
        success: true,
        address,
        total_earnings: total.normalize().to_string(),
        agent_count: agents.len(),
        agents,
    }))
}

/// Marketplace statistics
#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "Market",
    responses(
        (status = 200, description = "Statistics", body = StatsResponse)
    )
)]
pub async fn get_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<StatsResponse>> {
    let snapshot = state
        .db
        .stats_repo()
        .snapshot()
        .await
        .map_err(db_failure("Failed to fetch stats"))?;

    Ok(Json(StatsResponse {
        success: true,
        stats: MarketStats {
            total_agents: snapshot.total_agents,
            total_users: snapshot.total_users,
            total_transactions: snapshot.total_transactions,
            total_volume: snapshot.total_volume.normalize().to_string(),
        },
    }))
}

/// Contract addresses and chain id for wallet clients
#[utoipa::path(
    get,
    path = "/api/config",
    tag = "Market",
    responses(
        (status = 200, description = "Public chain configuration", body = ConfigResponse)
    )
)]
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    let market = &state.market;
    Json(ConfigResponse {
        success: true,
        chain_id: market.chain_id,
        marketplace_address: market.marketplace_address.clone(),
        token_address: market.token_address.clone(),
        rpc_url: market.rpc_url.clone(),
    })
}
