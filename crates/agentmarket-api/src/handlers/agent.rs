//! Agent Handlers
//!
//! Registration, discovery, execution, rating and activation of agents.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;

use agentmarket_db::{AgentFilter, NewAgent, NewTransaction, RECENT_TRANSACTIONS};
use agentmarket_llm::ExecutionResult;
use agentmarket_types::{parse_amount, AgentType, TransactionStatus};

use crate::dto::{
    AgentDetail, AgentDto, AgentListResponse, AgentResponse, ListAgentsQuery, RateAgentRequest,
    RatingResponse, RegisterAgentRequest, RunAgentRequest,
};
use crate::error::{db_failure, ApiError, ApiResult};
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// Run an agent
///
/// Provider failures are reported in the body with `success: false` and a
/// 200 status. When `agentId` is given the agent must be active and of the
/// requested type, and the attempt is recorded against it; a successful run
/// counts as a completed sale.
#[utoipa::path(
    post,
    path = "/api/agent/run",
    tag = "Agents",
    request_body = RunAgentRequest,
    responses(
        (status = 200, description = "Execution result, successful or not"),
        (status = 400, description = "Invalid request, unknown agent type, or inactive agent"),
        (status = 404, description = "Agent not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn run_agent(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RunAgentRequest>,
) -> ApiResult<(StatusCode, Json<ExecutionResult>)> {
    let amount = match req.amount.as_deref() {
        Some(raw) => parse_amount(raw)
            .map_err(|_| ApiError::invalid_field("amount", "must be a non-negative decimal number"))?,
        None => Decimal::ZERO,
    };

    let agent = match req.agent_id.as_deref() {
        Some(id) => Some(
            state
                .db
                .agent_repo()
                .find_by_id(id)
                .await
                .map_err(db_failure("Failed to execute agent"))?
                .ok_or(ApiError::AgentNotFound)?,
        ),
        None => None,
    };

    if let Some(agent) = &agent {
        if !agent.active {
            return Err(ApiError::AgentInactive);
        }
        if agent.agent_type != req.agent_type {
            return Err(ApiError::invalid_field(
                "agentType",
                format!("must match the agent's type ({})", agent.agent_type),
            ));
        }
    }

    let result = state.executor.run(&req.agent_type, &req.prompt).await;

    let type_label = req
        .agent_type
        .parse::<AgentType>()
        .map(|t| t.as_str())
        .unwrap_or("invalid");
    let outcome = if result.success { "success" } else { "failure" };
    metrics::counter!("agentmarket_agent_runs_total", "agent_type" => type_label, "outcome" => outcome)
        .increment(1);

    if result.is_invalid_agent_type() {
        return Ok((StatusCode::BAD_REQUEST, Json(result)));
    }

    if let Some(agent) = agent {
        let status = if result.success {
            TransactionStatus::Completed
        } else {
            TransactionStatus::Failed
        };
        let response = result
            .result
            .clone()
            .or_else(|| result.error.clone())
            .unwrap_or_default();

        let recorded = state
            .db
            .transaction_repo()
            .record_sale(&NewTransaction {
                agent_id: agent.id,
                buyer: req.buyer,
                amount,
                tx_hash: req.tx_hash,
                status,
                prompt: req.prompt,
                response,
            })
            .await
            .map_err(db_failure("Failed to execute agent"))?;

        tracing::info!(
            transaction_id = %recorded.id,
            agent_id = %recorded.agent_id,
            status = %recorded.status,
            "Recorded agent run"
        );
    }

    Ok((StatusCode::OK, Json(result)))
}

/// Register an agent in the catalog
#[utoipa::path(
    post,
    path = "/api/agent/register",
    tag = "Agents",
    request_body = RegisterAgentRequest,
    responses(
        (status = 200, description = "Agent registered", body = AgentResponse),
        (status = 400, description = "Validation failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn register_agent(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterAgentRequest>,
) -> ApiResult<Json<AgentResponse>> {
    let agent_type: AgentType = req
        .agent_type
        .parse()
        .map_err(|_| ApiError::invalid_field("agentType", "must be one of: code, seo, content, data"))?;
    let price = parse_amount(&req.price)
        .map_err(|_| ApiError::invalid_field("price", "must be a non-negative decimal number"))?;

    let new_agent = NewAgent {
        contract_id: req.contract_id,
        owner: req.owner,
        name: req.name,
        description: req.description,
        agent_type,
        price,
        metadata: serde_json::Value::Object(req.metadata.unwrap_or_default()),
    };

    let agent = state
        .db
        .agent_repo()
        .create(&new_agent)
        .await
        .map_err(db_failure("Failed to register agent"))?;

    metrics::counter!("agentmarket_agents_registered_total", "agent_type" => agent_type.as_str())
        .increment(1);
    tracing::info!(agent_id = %agent.id, owner = %agent.owner, agent_type = %agent.agent_type, "Registered agent");

    Ok(Json(AgentResponse {
        success: true,
        agent: agent.into(),
    }))
}

/// Get an agent with its ten most recent transactions
#[utoipa::path(
    get,
    path = "/api/agent/{id}",
    tag = "Agents",
    params(("id" = String, Path, description = "Agent id")),
    responses(
        (status = 200, description = "Agent detail", body = AgentDetail),
        (status = 404, description = "Agent not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<AgentDetail>> {
    let agent = state
        .db
        .agent_repo()
        .find_by_id(&id)
        .await
        .map_err(db_failure("Failed to fetch agent"))?
        .ok_or(ApiError::AgentNotFound)?;

    let transactions = state
        .db
        .transaction_repo()
        .recent_for_agent(&agent.id, RECENT_TRANSACTIONS)
        .await
        .map_err(db_failure("Failed to fetch agent"))?;

    Ok(Json(AgentDetail::new(agent, transactions)))
}

/// List active agents
///
/// Best rated first, ties broken by total sales, at most 50 rows.
#[utoipa::path(
    get,
    path = "/api/agents",
    tag = "Agents",
    params(ListAgentsQuery),
    responses(
        (status = 200, description = "Active agents", body = AgentListResponse)
    )
)]
pub async fn list_agents(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListAgentsQuery>,
) -> ApiResult<Json<AgentListResponse>> {
    let agent_type = match query.agent_type.as_deref().filter(|t| !t.is_empty()) {
        Some(raw) => match raw.parse::<AgentType>() {
            Ok(t) => Some(t),
            // No agent can have an unknown type
            Err(_) => {
                return Ok(Json(AgentListResponse {
                    success: true,
                    agents: Vec::new(),
                    count: 0,
                }))
            }
        },
        None => None,
    };

    let filter = AgentFilter {
        agent_type,
        owner: query.owner.filter(|o| !o.trim().is_empty()),
    };

    let agents: Vec<AgentDto> = state
        .db
        .agent_repo()
        .list_active(&filter)
        .await
        .map_err(db_failure("Failed to fetch agents"))?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(AgentListResponse {
        success: true,
        count: agents.len(),
        agents,
    }))
}

/// Rate an agent
#[utoipa::path(
    post,
    path = "/api/agent/{id}/rate",
    tag = "Agents",
    params(("id" = String, Path, description = "Agent id")),
    request_body = RateAgentRequest,
    responses(
        (status = 200, description = "Updated rating", body = RatingResponse),
        (status = 400, description = "Rating outside 1-5", body = crate::error::ErrorResponse),
        (status = 404, description = "Agent not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn rate_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<RateAgentRequest>,
) -> ApiResult<Json<RatingResponse>> {
    let aggregate = state
        .db
        .agent_repo()
        .record_rating(&id, req.rating)
        .await?
        .ok_or(ApiError::AgentNotFound)?;

    metrics::counter!("agentmarket_ratings_total").increment(1);

    Ok(Json(RatingResponse {
        success: true,
        rating: aggregate.rating,
        rating_count: aggregate.rating_count,
    }))
}

/// Activate or deactivate an agent
#[utoipa::path(
    post,
    path = "/api/agent/{id}/toggle",
    tag = "Agents",
    params(("id" = String, Path, description = "Agent id")),
    responses(
        (status = 200, description = "Agent after the toggle", body = AgentResponse),
        (status = 404, description = "Agent not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn toggle_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<AgentResponse>> {
    let agent = state
        .db
        .agent_repo()
        .toggle_active(&id)
        .await
        .map_err(db_failure("Failed to update agent"))?
        .ok_or(ApiError::AgentNotFound)?;

    tracing::info!(agent_id = %agent.id, active = agent.active, "Toggled agent");

    Ok(Json(AgentResponse {
        success: true,
        agent: agent.into(),
    }))
}
