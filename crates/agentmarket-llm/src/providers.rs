//! LLM Provider implementations

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Trait for LLM providers
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Get the provider kind
    fn kind(&self) -> ProviderKind;

    /// Whether the provider is configured well enough to attempt a call
    async fn is_available(&self) -> bool;

    /// Complete a prompt
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}

// ============================================================================
// Gemini Provider
// ============================================================================

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Configuration for Gemini provider
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Google Gemini `generateContent` provider
pub struct GeminiProvider {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize, Deserialize, Default)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: String,
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn is_available(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let model = request.model.unwrap_or_else(|| self.config.model.clone());

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: request.prompt,
                }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint(&model))
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| LLMError::NetworkError {
                message: e.without_url().to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {}: {}", status, text));
            return Err(if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                LLMError::RateLimited { message }
            } else {
                LLMError::RequestFailed { message }
            });
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| LLMError::InvalidResponse {
            message: e.to_string(),
        })?;

        let Some(candidate) = parsed.candidates.into_iter().next() else {
            let reason = parsed
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!("Prompt blocked: {}", r))
                .unwrap_or_else(|| "No candidates returned".to_string());
            return Err(LLMError::InvalidResponse { message: reason });
        };

        let content: String = candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect();

        Ok(CompletionResponse {
            content,
            usage: parsed.usage_metadata.map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            }),
            model: Some(model),
        })
    }
}

// ============================================================================
// Static Provider
// ============================================================================

#[derive(Debug, Clone)]
enum StaticOutcome {
    Reply { content: String, total_tokens: Option<u32> },
    Fail(String),
}

/// Provider with a fixed outcome. Used when no model is configured and in tests.
#[derive(Debug)]
pub struct StaticProvider {
    outcome: StaticOutcome,
    calls: AtomicUsize,
}

impl StaticProvider {
    /// Always answers with `content`
    pub fn replying(content: impl Into<String>) -> Self {
        Self {
            outcome: StaticOutcome::Reply {
                content: content.into(),
                total_tokens: None,
            },
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: StaticOutcome::Fail(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_total_tokens(mut self, total: u32) -> Self {
        if let StaticOutcome::Reply { total_tokens, .. } = &mut self.outcome {
            *total_tokens = Some(total);
        }
        self
    }

    /// Number of completions requested so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LLMProvider for StaticProvider {
    fn name(&self) -> &'static str {
        "Static"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Static
    }

    async fn is_available(&self) -> bool {
        matches!(self.outcome, StaticOutcome::Reply { .. })
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            StaticOutcome::Reply { content, total_tokens } => Ok(CompletionResponse {
                content: content.clone(),
                usage: total_tokens.map(|total| TokenUsage {
                    prompt_tokens: 0,
                    completion_tokens: total,
                    total_tokens: total,
                }),
                model: Some("static".to_string()),
            }),
            StaticOutcome::Fail(message) => Err(LLMError::RequestFailed {
                message: message.clone(),
            }),
        }
    }
}

/// Build the provider for a configured kind.
///
/// Gemini without an API key degrades to a provider that fails every call,
/// so executions report the misconfiguration instead of the process refusing
/// to start.
pub fn provider_for(kind: ProviderKind, gemini: Option<GeminiConfig>) -> Arc<dyn LLMProvider> {
    match kind {
        ProviderKind::Gemini => match gemini.filter(|c| !c.api_key.is_empty()) {
            Some(config) => Arc::new(GeminiProvider::new(config)),
            None => {
                tracing::warn!("GEMINI_API_KEY not set, executions will fail");
                Arc::new(StaticProvider::failing("GEMINI_API_KEY is not configured"))
            }
        },
        ProviderKind::Static => Arc::new(StaticProvider::replying(
            "This is a canned response from the offline provider.",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_reply() {
        let provider = StaticProvider::replying("done").with_total_tokens(12);
        let response = provider.complete(CompletionRequest::new("x")).await.unwrap();
        assert_eq!(response.content, "done");
        assert_eq!(response.usage.unwrap().total_tokens, 12);
        assert_eq!(provider.calls(), 1);
        assert!(provider.is_available().await);
    }

    #[tokio::test]
    async fn test_static_failure() {
        let provider = StaticProvider::failing("quota exceeded");
        let err = provider.complete(CompletionRequest::new("x")).await.unwrap_err();
        assert_eq!(err.to_string(), "Request failed: quota exceeded");
        assert!(!provider.is_available().await);
    }

    #[tokio::test]
    async fn test_gemini_without_key_degrades() {
        let provider = provider_for(ProviderKind::Gemini, Some(GeminiConfig::new("")));
        assert_eq!(provider.kind(), ProviderKind::Static);
        assert!(provider.complete(CompletionRequest::new("x")).await.is_err());
    }

    #[test]
    fn test_endpoint_format() {
        let provider = GeminiProvider::new(
            GeminiConfig::new("k").with_base_url("http://localhost:9999/"),
        );
        assert_eq!(
            provider.endpoint("gemini-pro"),
            "http://localhost:9999/v1beta/models/gemini-pro:generateContent"
        );
    }
}
