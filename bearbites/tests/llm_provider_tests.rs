mod common;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use bearbites::config::LlmConfig;
use bearbites::error::BearBitesError;
use bearbites::llm::prompts::{SPICY_MAX_TOKENS, SPICY_SYSTEM_PROMPT};
use bearbites::llm::{ChatPrompt, LlmBackend, LlmProvider};

use common::completion_body;

fn llm_config(model: &str, base_url: Option<String>) -> LlmConfig {
    LlmConfig {
        model: model.to_string(),
        api_key: Some("test-key".to_string()),
        base_url,
        timeout_secs: 5,
    }
}

fn spicy_prompt(user: &str) -> ChatPrompt<'_> {
    ChatPrompt {
        system: SPICY_SYSTEM_PROMPT,
        user,
        max_tokens: SPICY_MAX_TOKENS,
    }
}

fn api_error_body(message: &str, error_type: &str, code: &str) -> serde_json::Value {
    serde_json::json!({
        "error": {
            "message": message,
            "type": error_type,
            "param": serde_json::Value::Null,
            "code": code
        }
    })
}

fn provider_for(server: &MockServer) -> LlmProvider {
    let config = llm_config("openai/gpt-4o-mini", Some(format!("{}/v1", server.uri())));
    LlmProvider::new(Some(&config))
}

#[test]
fn test_provider_detection() {
    let cases = [
        ("openai/gpt-4o", LlmBackend::OpenAI),
        ("openrouter/openai/gpt-4o", LlmBackend::OpenRouter),
        ("ollama/llama3.2", LlmBackend::Ollama),
        ("lmstudio/qwen2.5", LlmBackend::LmStudio),
    ];
    for (model, expected) in cases {
        let provider = LlmProvider::new(Some(&llm_config(model, None)));
        assert_eq!(provider.backend(), Some(&expected), "model {model}");
    }
}

#[test]
fn test_unavailable_provider() {
    let provider = LlmProvider::new(None);
    assert!(provider.backend().is_none());
    assert!(!provider.is_available());

    let mut config = llm_config("openai/gpt-4o", None);
    config.api_key = None;
    assert!(!LlmProvider::new(Some(&config)).is_available());
}

#[tokio::test]
async fn test_complete_sends_system_prompt_and_token_cap() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains(format!("\"max_tokens\":{SPICY_MAX_TOKENS}")))
        .and(body_string_contains("\"role\":\"system\""))
        .and(body_string_contains("Food: Rice"))
        .and(body_string_contains("\"model\":\"gpt-4o-mini\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(r#"{"spicy": false}"#)))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let reply = provider
        .complete(&spicy_prompt("Food: Rice\nIngredients: Rice"))
        .await
        .expect("completion should succeed");
    assert_eq!(reply, r#"{"spicy": false}"#);
}

#[tokio::test]
async fn test_empty_reply_is_returned_as_is() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("")))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let reply = provider.complete(&spicy_prompt("Food: Rice")).await.unwrap();
    assert_eq!(reply, "");
}

#[tokio::test]
async fn test_rate_limited_call_backs_off_and_succeeds() {
    let server = MockServer::start().await;
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_for_mock = Arc::clone(&attempts);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(move |_request: &Request| {
            if attempts_for_mock.fetch_add(1, Ordering::SeqCst) == 0 {
                ResponseTemplate::new(429).set_body_json(api_error_body(
                    "Rate limit reached",
                    "requests",
                    "rate_limit_exceeded",
                ))
            } else {
                ResponseTemplate::new(200).set_body_json(completion_body(r#"{"spicy": true}"#))
            }
        })
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let reply = provider.complete(&spicy_prompt("Food: Hot Wings")).await.unwrap();

    assert_eq!(reply, r#"{"spicy": true}"#);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_api_error_is_reported_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(api_error_body(
            "Invalid API key",
            "invalid_request_error",
            "invalid_api_key",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    match provider.complete(&spicy_prompt("Food: Rice")).await {
        Err(BearBitesError::Llm(message)) => assert!(message.contains("Invalid API key")),
        other => panic!("Expected Llm error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_prompt_validation() {
    let provider = LlmProvider::new(Some(&llm_config("ollama/llama3.2", None)));

    match provider.complete(&spicy_prompt("   ")).await {
        Err(BearBitesError::Validation(message)) => assert!(message.contains("Prompt cannot be empty")),
        other => panic!("Expected Validation error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_api_key_makes_provider_unavailable() {
    let mut config = llm_config("openai/gpt-4o", None);
    config.api_key = None;
    let provider = LlmProvider::new(Some(&config));

    match provider.complete(&spicy_prompt("Hello")).await {
        Err(BearBitesError::LlmUnavailable(reason)) => assert!(reason.contains("LLM_API_KEY")),
        other => panic!("Expected LlmUnavailable, got: {other:?}"),
    }
}
