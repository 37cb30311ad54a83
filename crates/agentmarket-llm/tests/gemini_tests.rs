//! Gemini provider against a mock HTTP server

use std::sync::Arc;

use agentmarket_llm::{
    AgentExecutor, CompletionRequest, GeminiConfig, GeminiProvider, LLMError, LLMProvider,
};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> GeminiProvider {
    GeminiProvider::new(GeminiConfig::new("test-key").with_base_url(server.uri()))
}

#[tokio::test]
async fn test_generate_content_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-pro:generateContent"))
        .and(query_param("key", "test-key"))
        .and(body_string_contains("User Request:\\nReview my code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Quality: 8/10. "}, {"text": "Ship it."}]}
            }],
            "usageMetadata": {"promptTokenCount": 100, "candidatesTokenCount": 20, "totalTokenCount": 120}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let executor = AgentExecutor::new(Arc::new(provider(&server)));
    let result = executor.run("code", "Review my code").await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.result.as_deref(), Some("Quality: 8/10. Ship it."));
    assert_eq!(result.tokens_used, Some(120));
}

#[tokio::test]
async fn test_api_error_message_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}
        })))
        .mount(&server)
        .await;

    let executor = AgentExecutor::new(Arc::new(provider(&server)));
    let result = executor.run("content", "Write a blog post about Rust").await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Request failed: API key not valid."));
    assert_eq!(result.agent_type, "content");
}

#[tokio::test]
async fn test_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .complete(CompletionRequest::new("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, LLMError::RateLimited { .. }));
}

#[tokio::test]
async fn test_blocked_prompt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .complete(CompletionRequest::new("hi"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid response: Prompt blocked: SAFETY");
}

#[tokio::test]
async fn test_probe_sends_test_prompt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("Test connection"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let executor = AgentExecutor::new(Arc::new(provider(&server)));
    assert!(executor.probe().await);
}

#[tokio::test]
async fn test_model_override() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "fast"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let executor = AgentExecutor::new(Arc::new(provider(&server))).with_model("gemini-1.5-flash");
    let result = executor.run("data", "Summarise these numbers: 1, 2, 3").await;
    assert_eq!(result.result.as_deref(), Some("fast"));
}
