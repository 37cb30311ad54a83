//! Server Configuration
//!
//! Layered configuration for the AgentMarket API server: optional config
//! file, `config/default`, `config/local`, then `AGENTMARKET__*` environment
//! variables. CLI flags are applied on top in `main`.

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use agentmarket_api::{ApiConfig, MarketConfig, RateLimitConfig};
use agentmarket_db::DatabaseConfig as DbConfig;
use agentmarket_llm::{GeminiConfig, ProviderKind, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};

/// Server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    /// Model provider used by the prompt execution service
    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub api: ApiSettings,

    /// Public contract coordinates served at `/api/config`
    #[serde(default)]
    pub market: MarketConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Server binding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Grace period for in-flight requests after a shutdown signal
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address {}:{}: {}", self.host, self.port, e))?;
        Ok(addr)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Catalog store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite connection URL
    #[serde(default = "default_database_url")]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Run migrations on startup
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            run_migrations: true,
        }
    }
}

impl DatabaseSettings {
    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            acquire_timeout_secs: self.acquire_timeout_secs,
        }
    }
}

/// Model provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// `gemini` or `static`
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            api_key: None,
            model: default_llm_model(),
            base_url: default_llm_base_url(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl LlmSettings {
    /// Unknown provider names fall back to Gemini
    pub fn kind(&self) -> ProviderKind {
        ProviderKind::from_str(&self.provider).unwrap_or(ProviderKind::Gemini)
    }

    pub fn gemini(&self) -> Option<GeminiConfig> {
        self.api_key.as_ref().filter(|k| !k.is_empty()).map(|key| {
            GeminiConfig::new(key.clone())
                .with_model(self.model.clone())
                .with_base_url(self.base_url.clone())
                .with_timeout_secs(self.timeout_secs)
        })
    }
}

/// API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_true")]
    pub enable_compression: bool,

    #[serde(default = "default_true")]
    pub enable_tracing: bool,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Requests admitted per client IP and window; 0 disables limiting
    #[serde(default = "default_rate_limit")]
    pub rate_limit: u32,

    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_secs: u64,

    /// Key the rate limit on proxy headers; enable only behind a reverse proxy
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            enable_cors: true,
            cors_origins: default_cors_origins(),
            enable_compression: true,
            enable_tracing: true,
            max_body_size: default_max_body_size(),
            rate_limit: default_rate_limit(),
            rate_limit_window_secs: default_rate_limit_window(),
            trust_proxy_headers: false,
        }
    }
}

impl ApiSettings {
    pub fn to_api_config(&self) -> ApiConfig {
        ApiConfig {
            enable_cors: self.enable_cors,
            cors_origins: self.cors_origins.clone(),
            enable_compression: self.enable_compression,
            enable_tracing: self.enable_tracing,
            rate_limit: RateLimitConfig {
                enabled: self.rate_limit > 0,
                requests_per_window: self.rate_limit,
                window: Duration::from_secs(self.rate_limit_window_secs),
                trust_proxy_headers: self.trust_proxy_headers,
            },
            max_body_size: self.max_body_size,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Prometheus exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Exporter port, separate from the API listener
    #[serde(default = "default_metrics_port")]
    pub port: Option<u16>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_metrics_port(),
        }
    }
}

// =============================================================================
// Default Functions
// =============================================================================

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_shutdown_timeout() -> u64 {
    5
}

fn default_database_url() -> String {
    agentmarket_db::DEFAULT_DATABASE_URL.to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_llm_provider() -> String {
    "gemini".to_string()
}

fn default_llm_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_llm_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

fn default_llm_timeout() -> u64 {
    60
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_max_body_size() -> usize {
    1024 * 1024
}

fn default_rate_limit() -> u32 {
    100
}

fn default_rate_limit_window() -> u64 {
    15 * 60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_metrics_port() -> Option<u16> {
    Some(9090)
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Configuration Loading
// =============================================================================

impl ServerConfig {
    /// Load configuration from an optional file, the default locations and
    /// `AGENTMARKET__SECTION__KEY` environment variables
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("AGENTMARKET")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Debug logging, static model provider, in-memory catalog, no limits
    pub fn development() -> Self {
        Self {
            database: DatabaseSettings {
                url: DbConfig::in_memory().url,
                max_connections: 1,
                ..Default::default()
            },
            llm: LlmSettings {
                provider: "static".to_string(),
                ..Default::default()
            },
            api: ApiSettings {
                rate_limit: 0,
                ..Default::default()
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: "pretty".to_string(),
            },
            metrics: MetricsConfig {
                enabled: false,
                port: None,
            },
            ..Default::default()
        }
    }
}
