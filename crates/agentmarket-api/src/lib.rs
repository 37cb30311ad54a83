//! AgentMarket REST API
//!
//! HTTP surface of the AI agent marketplace.
//!
//! # API Structure
//!
//! ```text
//! /                       - Service banner
//! /health                 - Database and model connectivity
//! /api-docs/openapi.json  - OpenAPI document
//! /api/
//! ├── /agents             - Browse active agents (?type=&owner=)
//! ├── /agent/run          - Execute an agent
//! ├── /agent/register     - Register an agent
//! ├── /agent/:id          - Agent detail with recent transactions
//! ├── /agent/:id/rate     - Rate an agent (1-5)
//! ├── /agent/:id/toggle   - Activate / deactivate an agent
//! ├── /transaction/:id/status - Settle or fail a purchase record
//! ├── /earnings/:address  - Creator earnings
//! ├── /stats              - Marketplace statistics
//! └── /config             - Contract addresses for wallets
//! ```

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod rate_limit;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub use error::{ApiError, ApiResult};
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use state::{AppState, MarketConfig};

/// API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Enable CORS for browser clients
    pub enable_cors: bool,
    /// Allowed origins for CORS (`*` for any)
    pub cors_origins: Vec<String>,
    /// Enable response compression
    pub enable_compression: bool,
    /// Enable request tracing
    pub enable_tracing: bool,
    /// Per-IP request budget
    pub rate_limit: RateLimitConfig,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            cors_origins: vec!["http://localhost:3000".to_string()],
            enable_compression: true,
            enable_tracing: true,
            rate_limit: RateLimitConfig::default(),
            max_body_size: 1024 * 1024,
        }
    }
}

fn base_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", routes::api_routes())
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health_check))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
}

/// Create the main API router with all middleware
pub fn create_router(state: Arc<AppState>, config: ApiConfig) -> Router {
    let limiter = RateLimiter::new(config.rate_limit.clone());

    let mut router = base_router()
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(axum::middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::timing_middleware))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ));

    // Add tracing
    if config.enable_tracing {
        router = router.layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");

                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            },
        ));
    }

    // Request ids are assigned outside the trace layer so spans can see them
    let x_request_id = HeaderName::from_static("x-request-id");
    router = router
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid));

    // Add compression
    if config.enable_compression {
        router = router.layer(CompressionLayer::new());
    }

    // Add CORS
    if config.enable_cors {
        let cors = if config.cors_origins.iter().any(|o| o == "*") {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_origin(
                    config
                        .cors_origins
                        .iter()
                        .filter_map(|o| o.parse::<HeaderValue>().ok())
                        .collect::<Vec<_>>(),
                )
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any)
        };
        router = router.layer(cors);
    }

    router
}

/// Create a minimal router for testing
pub fn create_test_router(state: Arc<AppState>) -> Router {
    base_router().with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.enable_cors);
        assert!(config.enable_compression);
        assert_eq!(config.rate_limit.requests_per_window, 100);
        assert_eq!(config.rate_limit.window.as_secs(), 900);
    }

    #[tokio::test]
    async fn test_bare_router_serves_health() {
        use agentmarket_db::Database;
        use agentmarket_llm::{AgentExecutor, StaticProvider};
        use axum::body::Body;
        use axum::http::{Request, StatusCode};
        use tower::ServiceExt;

        let db = Arc::new(Database::in_memory().await.unwrap());
        let executor = Arc::new(AgentExecutor::new(Arc::new(StaticProvider::replying("ok"))));
        let state = Arc::new(AppState::new(db, executor, MarketConfig::default()));

        let response = create_test_router(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(!response.headers().contains_key("x-request-id"));
    }
}
