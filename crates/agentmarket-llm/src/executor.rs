//! Agent execution

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::providers::LLMProvider;
use crate::templates::{compose, template_for};
use crate::types::CompletionRequest;

/// Prompt sent by [`AgentExecutor::probe`]
pub const PROBE_PROMPT: &str = "Test connection";

/// Error text for agent types without a template
pub const INVALID_AGENT_TYPE: &str = "Invalid agent type";

/// Outcome of one execution. Failures are values, never errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub agent_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
}

impl ExecutionResult {
    pub fn succeeded(agent_type: &str, result: String, tokens_used: Option<u32>) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
            agent_type: agent_type.to_string(),
            tokens_used,
        }
    }

    pub fn failed(agent_type: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
            agent_type: agent_type.to_string(),
            tokens_used: None,
        }
    }

    /// True when the failure came from an unrecognised agent type
    pub fn is_invalid_agent_type(&self) -> bool {
        !self.success && self.error.as_deref() == Some(INVALID_AGENT_TYPE)
    }
}

/// Runs prompts through the system prompt for an agent type
#[derive(Clone)]
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    model: Option<String>,
}

impl AgentExecutor {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            model: None,
        }
    }

    /// Override the provider's default model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    fn request(&self, prompt: String) -> CompletionRequest {
        let request = CompletionRequest::new(prompt);
        match &self.model {
            Some(model) => request.with_model(model.clone()),
            None => request,
        }
    }

    /// Execute `prompt` as an agent of `agent_type`
    pub async fn run(&self, agent_type: &str, prompt: &str) -> ExecutionResult {
        let Some(system_prompt) = template_for(agent_type) else {
            debug!(agent_type, "Rejected unknown agent type");
            return ExecutionResult::failed(agent_type, INVALID_AGENT_TYPE);
        };

        let started = Instant::now();
        let request = self.request(compose(system_prompt, prompt));

        match self.provider.complete(request).await {
            Ok(response) => {
                let tokens_used = response.usage.as_ref().map(|u| u.total_tokens);
                info!(
                    agent_type,
                    provider = self.provider.name(),
                    tokens_used = ?tokens_used,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Agent execution succeeded"
                );
                ExecutionResult::succeeded(agent_type, response.content, tokens_used)
            }
            Err(e) => {
                warn!(
                    agent_type,
                    provider = self.provider.name(),
                    error = %e,
                    "Agent execution failed"
                );
                ExecutionResult::failed(agent_type, e.to_string())
            }
        }
    }

    /// Send a trivial prompt and report whether the model answered.
    ///
    /// Providers that report themselves unavailable are not called.
    pub async fn probe(&self) -> bool {
        if !self.provider.is_available().await {
            warn!(provider = self.provider.name(), "Model provider not available");
            return false;
        }

        match self.provider.complete(self.request(PROBE_PROMPT.to_string())).await {
            Ok(_) => true,
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Model connectivity probe failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::StaticProvider;

    #[tokio::test]
    async fn test_run_success() {
        let provider = Arc::new(StaticProvider::replying("looks good").with_total_tokens(42));
        let executor = AgentExecutor::new(provider.clone());

        let result = executor.run("code", "fn main() { println!(\"hi\"); }").await;
        assert!(result.success);
        assert_eq!(result.result.as_deref(), Some("looks good"));
        assert_eq!(result.tokens_used, Some(42));
        assert_eq!(result.agent_type, "code");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_type_skips_provider() {
        let provider = Arc::new(StaticProvider::replying("unused"));
        let executor = AgentExecutor::new(provider.clone());

        let result = executor.run("legal", "Draft me a contract please").await;
        assert!(!result.success);
        assert!(result.is_invalid_agent_type());
        assert_eq!(result.agent_type, "legal");
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_is_a_result() {
        let executor = AgentExecutor::new(Arc::new(StaticProvider::failing("quota exceeded")));

        let result = executor.run("seo", "Audit https://example.com").await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Request failed: quota exceeded"));
        assert!(result.result.is_none());
        assert!(!result.is_invalid_agent_type());
    }

    #[tokio::test]
    async fn test_probe() {
        assert!(AgentExecutor::new(Arc::new(StaticProvider::replying("pong"))).probe().await);
        assert!(!AgentExecutor::new(Arc::new(StaticProvider::failing("down"))).probe().await);
    }

    #[tokio::test]
    async fn test_probe_skips_unavailable_provider() {
        let provider = Arc::new(StaticProvider::failing("GEMINI_API_KEY is not configured"));
        let executor = AgentExecutor::new(provider.clone());

        assert!(!executor.probe().await);
        assert_eq!(provider.calls(), 0);

        let provider = Arc::new(StaticProvider::replying("pong"));
        assert!(AgentExecutor::new(provider.clone()).probe().await);
        assert_eq!(provider.calls(), 1);
    }

    #[test]
    fn test_result_serialization() {
        let ok = ExecutionResult::succeeded("data", "insights".to_string(), Some(7));
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["agentType"], "data");
        assert_eq!(json["tokensUsed"], 7);
        assert!(json.get("error").is_none());

        let failed = ExecutionResult::failed("code", INVALID_AGENT_TYPE);
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Invalid agent type");
        assert!(json.get("result").is_none());
    }
}
