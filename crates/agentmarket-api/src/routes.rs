//! API Routes

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Routes under `/api`
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Agents
        .route("/agents", get(handlers::agent::list_agents))
        .route("/agent/run", post(handlers::agent::run_agent))
        .route("/agent/register", post(handlers::agent::register_agent))
        .route("/agent/:id", get(handlers::agent::get_agent))
        .route("/agent/:id/rate", post(handlers::agent::rate_agent))
        .route("/agent/:id/toggle", post(handlers::agent::toggle_agent))
        // Transactions
        .route(
            "/transaction/:id/status",
            post(handlers::transaction::update_transaction_status),
        )
        // Market
        .route("/earnings/:address", get(handlers::market::get_earnings))
        .route("/stats", get(handlers::market::get_stats))
        .route("/config", get(handlers::market::get_config))
}
