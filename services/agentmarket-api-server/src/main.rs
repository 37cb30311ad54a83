//! AgentMarket API Server
//!
//! Serves the agent catalog and the prompt execution endpoint.
//!
//! # Features
//!
//! - Agent registration, discovery, rating and paid execution
//! - Gemini-backed prompt execution with per-type system prompts
//! - Per-IP rate limiting
//! - OpenAPI document at `/api-docs/openapi.json`
//! - Prometheus metrics export
//! - Graceful shutdown handling
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings
//! agentmarket-api-server
//!
//! # Start with a config file
//! agentmarket-api-server --config /path/to/config.toml
//!
//! # Start with environment overrides
//! AGENTMARKET__SERVER__PORT=8080 agentmarket-api-server
//! ```

mod config;

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use agentmarket_api::{create_router, AppState};
use agentmarket_db::Database;
use agentmarket_llm::{provider_for, AgentExecutor, ProviderKind};

use crate::config::ServerConfig;

// =============================================================================
// CLI Arguments
// =============================================================================

/// AgentMarket API Server - AI agent catalog and execution API
#[derive(Parser, Debug)]
#[command(name = "agentmarket-api-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "AGENTMARKET_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "AGENTMARKET_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "AGENTMARKET_LOG_FORMAT")]
    log_format: Option<String>,

    /// SQLite connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Model provider (gemini, static)
    #[arg(long, env = "AGENTMARKET_LLM_PROVIDER")]
    llm_provider: Option<String>,

    /// Google Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL")]
    gemini_model: Option<String>,

    /// Browser origin allowed by CORS
    #[arg(long, env = "FRONTEND_URL")]
    frontend_url: Option<String>,

    /// Requests per client IP per 15 minutes (0 disables)
    #[arg(long, env = "API_RATE_LIMIT")]
    rate_limit: Option<u32>,

    /// Marketplace contract address served to clients
    #[arg(long, env = "MARKETPLACE_ADDRESS")]
    marketplace_address: Option<String>,

    /// Payment token contract address served to clients
    #[arg(long, env = "TOKEN_ADDRESS")]
    token_address: Option<String>,

    /// Chain id of the marketplace contract
    #[arg(long, env = "CHAIN_ID")]
    chain_id: Option<u64>,

    /// JSON-RPC endpoint served to clients
    #[arg(long, env = "RPC_URL")]
    rpc_url: Option<String>,

    /// Development mode: in-memory catalog, static model, no rate limit
    #[arg(long, env = "AGENTMARKET_DEV_MODE")]
    dev_mode: bool,
}

impl Args {
    /// Apply CLI and well-known environment overrides on top of the loaded config
    fn apply(self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if let Some(url) = self.database_url {
            config.database.url = url;
        }
        if let Some(provider) = self.llm_provider {
            config.llm.provider = provider;
        }
        if let Some(key) = self.gemini_api_key {
            config.llm.api_key = Some(key);
        }
        if let Some(model) = self.gemini_model {
            config.llm.model = model;
        }
        if let Some(origin) = self.frontend_url {
            config.api.cors_origins = vec![origin];
        }
        if let Some(limit) = self.rate_limit {
            config.api.rate_limit = limit;
        }
        if let Some(address) = self.marketplace_address {
            config.market.marketplace_address = Some(address);
        }
        if let Some(address) = self.token_address {
            config.market.token_address = Some(address);
        }
        if let Some(chain_id) = self.chain_id {
            config.market.chain_id = chain_id;
        }
        if let Some(rpc_url) = self.rpc_url {
            config.market.rpc_url = Some(rpc_url);
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let dev_mode = args.dev_mode;

    let mut server_config = if dev_mode {
        ServerConfig::development()
    } else {
        ServerConfig::load(args.config.as_deref())?
    };
    args.apply(&mut server_config);

    init_logging(&server_config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        dev_mode,
        "Starting AgentMarket API Server"
    );

    validate_config(&server_config, dev_mode)?;

    let db = init_database(&server_config.database).await?;
    let executor = init_executor(&server_config).await;

    let state = Arc::new(AppState::new(
        db.clone(),
        executor,
        server_config.market.clone(),
    ));

    let app = create_router(state, server_config.api.to_api_config());

    if server_config.metrics.enabled {
        start_metrics_server(&server_config.metrics)?;
    }

    let addr = server_config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        host = %server_config.server.host,
        port = server_config.server.port,
        "Server listening"
    );

    serve_with_grace(
        listener,
        app,
        shutdown_signal(),
        server_config.server.shutdown_timeout(),
    )
    .await?;

    db.close().await;
    tracing::info!("Server shutdown complete");

    Ok(())
}

// =============================================================================
// Initialization Functions
// =============================================================================

/// Initialize tracing/logging
fn init_logging(config: &config::LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => subscriber
            .with(fmt::layer().json().with_target(true))
            .try_init()?,
        _ => subscriber
            .with(fmt::layer().pretty().with_target(true))
            .try_init()?,
    }

    Ok(())
}

/// Validate configuration
fn validate_config(config: &ServerConfig, dev_mode: bool) -> anyhow::Result<()> {
    if config.api.rate_limit > 0 && config.api.rate_limit_window_secs == 0 {
        anyhow::bail!("Rate limit window must be at least one second");
    }

    if config.llm.kind() == ProviderKind::Gemini && config.llm.gemini().is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; every agent run will report a failure");
    }

    if !dev_mode && config.market.marketplace_address.is_none() {
        tracing::warn!("MARKETPLACE_ADDRESS is not set; clients cannot pay for agents");
    }

    if config.api.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS allows any origin");
    }

    Ok(())
}

/// Connect to the catalog store and bring the schema up to date
async fn init_database(settings: &config::DatabaseSettings) -> anyhow::Result<Arc<Database>> {
    let db_config = settings.to_db_config();

    tracing::info!(url = %db_config.url_masked(), "Connecting to database...");

    let db = Database::connect(&db_config).await?;

    if settings.run_migrations {
        db.migrate().await?;
        tracing::info!("Database migrations applied");
    }

    let health = db.health_check().await?;
    if !health.healthy {
        anyhow::bail!("Database health check failed");
    }

    tracing::info!(sqlite = health.sqlite, "Database health check passed");

    Ok(Arc::new(db))
}

/// Build the prompt execution service and report whether the model answers
async fn init_executor(config: &ServerConfig) -> Arc<AgentExecutor> {
    let provider = provider_for(config.llm.kind(), config.llm.gemini());
    let executor = AgentExecutor::new(provider);

    if executor.probe().await {
        tracing::info!(provider = executor.provider_name(), "AI service connected");
    } else {
        tracing::warn!(provider = executor.provider_name(), "AI service unreachable");
    }

    Arc::new(executor)
}

/// Start Prometheus metrics server
fn start_metrics_server(config: &config::MetricsConfig) -> anyhow::Result<()> {
    if let Some(port) = config.port {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;

        tracing::info!(port, "Metrics server started");
    }

    Ok(())
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

}

/// Serve until `shutdown` resolves, then stop accepting connections and give
/// in-flight requests at most `grace` to finish.
async fn serve_with_grace<F>(
    listener: tokio::net::TcpListener,
    app: Router,
    shutdown: F,
    grace: Duration,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
    let signal = async move {
        shutdown.await;
        let _ = signalled_tx.send(());
    };

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(signal)
    .into_future();
    tokio::pin!(server);

    let deadline = async {
        if signalled_rx.await.is_err() {
            std::future::pending::<()>().await;
        }
        tracing::info!(
            grace_secs = grace.as_secs(),
            "Waiting for in-flight requests to complete..."
        );
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = &mut server => result?,
        _ = deadline => {
            tracing::warn!("Grace period elapsed, dropping open connections");
        }
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["agentmarket-api-server", "--port", "8080", "--dev-mode"]);
        assert_eq!(args.port, Some(8080));
        assert!(args.dev_mode);
    }

    #[test]
    fn test_cli_overrides() {
        let args = Args::parse_from([
            "agentmarket-api-server",
            "--frontend-url",
            "https://market.example",
            "--rate-limit",
            "20",
            "--marketplace-address",
            "0xabc",
            "--chain-id",
            "11155111",
        ]);

        let mut config = ServerConfig::default();
        args.apply(&mut config);

        assert_eq!(config.api.cors_origins, vec!["https://market.example"]);
        assert_eq!(config.api.rate_limit, 20);
        assert_eq!(config.market.marketplace_address.as_deref(), Some("0xabc"));
        assert_eq!(config.market.chain_id, 11155111);
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut config = ServerConfig::default();
        config.api.rate_limit_window_secs = 0;
        assert!(validate_config(&config, true).is_err());

        config.api.rate_limit = 0;
        assert!(validate_config(&config, true).is_ok());
    }

    #[tokio::test]
    async fn test_dev_database_initializes() {
        let config = ServerConfig::development();
        let db = init_database(&config.database).await.unwrap();
        assert!(db.health_check().await.unwrap().healthy);
    }

    fn slow_router() -> Router {
        Router::new().route(
            "/slow",
            axum::routing::get(|| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                "done"
            }),
        )
    }

    #[tokio::test]
    async fn test_idle_server_stops_right_after_signal() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();

        let result = tokio::time::timeout(
            Duration::from_secs(2),
            serve_with_grace(listener, slow_router(), async {}, Duration::from_secs(30)),
        )
        .await;

        assert!(result.expect("server should not wait for the grace period").is_ok());
    }

    #[tokio::test]
    async fn test_grace_period_bounds_in_flight_requests() {
        use tokio::io::AsyncWriteExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

        let server = tokio::spawn(serve_with_grace(
            listener,
            slow_router(),
            async {
                let _ = stop_rx.await;
            },
            Duration::from_millis(200),
        ));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /slow HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        stop_tx.send(()).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), server).await;
        assert!(result.expect("grace period should bound shutdown").unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_static_executor() {
        let config = ServerConfig::development();
        let executor = init_executor(&config).await;
        assert_eq!(executor.provider_name(), "Static");
    }
}
