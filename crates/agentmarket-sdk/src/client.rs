//! HTTP client for the AgentMarket API

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{SdkError, SdkResult};
use crate::models::*;

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3001";

/// Client for every AgentMarket HTTP endpoint
#[derive(Clone)]
pub struct MarketClient {
    endpoint: String,
    client: Client,
}

impl MarketClient {
    /// Connect to a specific endpoint with a 120s timeout
    pub fn new(endpoint: &str) -> SdkResult<Self> {
        Self::with_timeout(endpoint, Duration::from_secs(120))
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> SdkResult<Self> {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(SdkError::Config(format!(
                "endpoint must start with http:// or https://, got {}",
                endpoint
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SdkError::Config(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// Active agents, best rated first, optionally filtered
    pub async fn list_agents(
        &self,
        agent_type: Option<&str>,
        owner: Option<&str>,
    ) -> SdkResult<Vec<Agent>> {
        let mut query = Vec::new();
        if let Some(t) = agent_type {
            query.push(("type", t));
        }
        if let Some(o) = owner {
            query.push(("owner", o));
        }

        let resp = self
            .client
            .get(self.url("/api/agents"))
            .query(&query)
            .send()
            .await?;
        let list: AgentList = parse(resp).await?;
        Ok(list.agents)
    }

    /// One agent with its most recent transactions
    pub async fn get_agent(&self, id: &str) -> SdkResult<AgentDetail> {
        let resp = self
            .client
            .get(self.url(&format!("/api/agent/{}", id)))
            .send()
            .await?;
        parse(resp).await
    }

    pub async fn register_agent(&self, request: &RegisterAgent) -> SdkResult<Agent> {
        let resp = self
            .client
            .post(self.url("/api/agent/register"))
            .json(request)
            .send()
            .await?;
        let envelope: AgentEnvelope = parse(resp).await?;
        Ok(envelope.agent)
    }

    /// Run an agent.
    ///
    /// A failed execution (including an unknown agent type) is returned as
    /// an [`ExecutionResult`] with `success == false`, not as an error.
    pub async fn run_agent(&self, request: &RunAgent) -> SdkResult<ExecutionResult> {
        let resp = self
            .client
            .post(self.url("/api/agent/run"))
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;

        if status.is_success() {
            return Ok(serde_json::from_slice(&bytes)?);
        }
        if status == StatusCode::BAD_REQUEST {
            if let Ok(result) = serde_json::from_slice::<ExecutionResult>(&bytes) {
                return Ok(result);
            }
        }
        Err(api_error(status, &bytes))
    }

    pub async fn rate_agent(&self, id: &str, rating: f64) -> SdkResult<Rating> {
        let resp = self
            .client
            .post(self.url(&format!("/api/agent/{}/rate", id)))
            .json(&serde_json::json!({ "rating": rating }))
            .send()
            .await?;
        parse(resp).await
    }

    /// Flip an agent between listed and unlisted
    pub async fn toggle_agent(&self, id: &str) -> SdkResult<Agent> {
        let resp = self
            .client
            .post(self.url(&format!("/api/agent/{}/toggle", id)))
            .send()
            .await?;
        let envelope: AgentEnvelope = parse(resp).await?;
        Ok(envelope.agent)
    }

    pub async fn update_transaction_status(&self, id: &str, status: &str) -> SdkResult<Transaction> {
        let resp = self
            .client
            .post(self.url(&format!("/api/transaction/{}/status", id)))
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await?;
        let envelope: TransactionEnvelope = parse(resp).await?;
        Ok(envelope.transaction)
    }

    pub async fn earnings(&self, address: &str) -> SdkResult<Earnings> {
        let resp = self
            .client
            .get(self.url(&format!("/api/earnings/{}", address)))
            .send()
            .await?;
        parse(resp).await
    }

    pub async fn stats(&self) -> SdkResult<MarketStats> {
        let resp = self.client.get(self.url("/api/stats")).send().await?;
        let envelope: StatsEnvelope = parse(resp).await?;
        Ok(envelope.stats)
    }

    pub async fn config(&self) -> SdkResult<MarketConfig> {
        let resp = self.client.get(self.url("/api/config")).send().await?;
        parse(resp).await
    }

    /// Service health. An unhealthy (503) report is still returned as a value.
    pub async fn health(&self) -> SdkResult<Health> {
        let resp = self.client.get(self.url("/health")).send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        if status.is_success() || status == StatusCode::SERVICE_UNAVAILABLE {
            if let Ok(health) = serde_json::from_slice::<Health>(&bytes) {
                return Ok(health);
            }
        }
        Err(api_error(status, &bytes))
    }
}

async fn parse<T: DeserializeOwned>(resp: Response) -> SdkResult<T> {
    let status = resp.status();
    let bytes = resp.bytes().await?;

    if !status.is_success() {
        return Err(api_error(status, &bytes));
    }
    Ok(serde_json::from_slice(&bytes)?)
}

fn api_error(status: StatusCode, body: &[u8]) -> SdkError {
    let message = match serde_json::from_slice::<ErrorBody>(body) {
        Ok(error) => error.message(),
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    };
    SdkError::Api {
        status: status.as_u16(),
        message,
    }
}
