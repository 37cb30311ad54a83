//! Health Check Handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// Dependency connectivity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceStatus {
    /// `connected` or `disconnected`
    pub database: String,
    /// `connected` or `disconnected`
    pub ai: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `healthy` or `unhealthy`
    pub status: String,
    pub version: String,
    /// RFC 3339
    pub timestamp: String,
    pub uptime_secs: u64,
    pub services: ServiceStatus,
}

fn connected(ok: bool) -> String {
    if ok { "connected" } else { "disconnected" }.to_string()
}

/// Health check endpoint
///
/// Verifies the database and probes the model. Only a database failure makes
/// the service unhealthy; a disconnected model is reported but still 200.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let database_ok = match state.db.health_check().await {
        Ok(health) => health.healthy,
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            false
        }
    };

    let ai_ok = state.executor.probe().await;

    let status_code = if database_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if database_ok { "healthy" } else { "unhealthy" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now().to_rfc3339(),
            uptime_secs: state.started_at.elapsed().as_secs(),
            services: ServiceStatus {
                database: connected(database_ok),
                ai: connected(ai_ok),
            },
        }),
    )
}

/// Service banner
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "AgentMarket AI API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "documentation": "/api-docs/openapi.json",
        "endpoints": {
            "health": "/health",
            "agents": "/api/agents",
            "agent": "/api/agent/:id",
            "run": "/api/agent/run",
            "register": "/api/agent/register",
            "rate": "/api/agent/:id/rate",
            "earnings": "/api/earnings/:address",
            "stats": "/api/stats",
            "config": "/api/config"
        }
    }))
}
