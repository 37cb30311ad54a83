//! OpenAPI Documentation

use axum::Json;
use utoipa::OpenApi;

use crate::dto;
use crate::error::{ErrorResponse, FieldError};
use crate::handlers;

/// AgentMarket API Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "AgentMarket AI API",
        description = "Catalog, execution, rating and earnings endpoints for the AgentMarket AI agent marketplace."
    ),
    paths(
        handlers::health::health_check,
        handlers::agent::run_agent,
        handlers::agent::register_agent,
        handlers::agent::get_agent,
        handlers::agent::list_agents,
        handlers::agent::rate_agent,
        handlers::agent::toggle_agent,
        handlers::transaction::update_transaction_status,
        handlers::market::get_earnings,
        handlers::market::get_stats,
        handlers::market::get_config,
    ),
    components(schemas(
        ErrorResponse,
        FieldError,
        handlers::health::HealthResponse,
        handlers::health::ServiceStatus,
        dto::RegisterAgentRequest,
        dto::RunAgentRequest,
        dto::RateAgentRequest,
        dto::AgentDto,
        dto::AgentDetail,
        dto::AgentResponse,
        dto::AgentListResponse,
        dto::RatingResponse,
        dto::TransactionDto,
        dto::UpdateTransactionStatusRequest,
        dto::TransactionResponse,
        dto::AgentEarnings,
        dto::EarningsResponse,
        dto::MarketStats,
        dto::StatsResponse,
        dto::ConfigResponse,
    )),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Agents", description = "Agent catalog and execution"),
        (name = "Transactions", description = "Purchase records"),
        (name = "Market", description = "Earnings, statistics and chain configuration")
    )
)]
pub struct ApiDoc;

/// `GET /api-docs/openapi.json`
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_endpoints() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/agent/run"));
        assert!(paths.contains_key("/api/agent/{id}/rate"));
        assert!(paths.contains_key("/api/earnings/{address}"));
        assert!(paths.contains_key("/health"));
    }

    #[test]
    fn test_error_responses_reference_schema() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let schema_ref = "#/components/schemas/ErrorResponse";

        let not_found = &doc["paths"]["/api/agent/{id}"]["get"]["responses"]["404"];
        assert_eq!(not_found["content"]["application/json"]["schema"]["$ref"], schema_ref);

        let bad_status = &doc["paths"]["/api/transaction/{id}/status"]["post"]["responses"]["400"];
        assert_eq!(bad_status["content"]["application/json"]["schema"]["$ref"], schema_ref);
        assert!(doc["components"]["schemas"]["ErrorResponse"].is_object());
    }
}
