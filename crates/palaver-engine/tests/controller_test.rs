// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! End-to-end controller tests: in-memory state plus a mock provider.

use palaver_ai::{AiConfig, AiError, ChatClient, ChatOptions, EmbeddingMode};
use palaver_core::{CoreError, RunStatus, StateManager};
use palaver_engine::{EngineError, ExecutionController, Validation, ValidatorRegistry};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn controller_for(server: &MockServer) -> ExecutionController {
    let config = AiConfig {
        base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        model: "gpt-4o-mini".to_string(),
        timeout_ms: 2_000,
        retries: 1,
        retry_delay_ms: 1,
        embedding_mode: EmbeddingMode::Stub,
        embedding_model: "text-embedding-3-small".to_string(),
    };
    ExecutionController::new(StateManager::in_memory(), ChatClient::new(config))
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}}
        ],
        "usage": {"prompt_tokens": 10, "completion_tokens": 3, "total_tokens": 13}
    })
}

#[tokio::test]
async fn test_successful_turn_completes_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hello!")))
        .expect(1)
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    let turn = controller
        .run_chat("Hi", None, &ChatOptions::default())
        .await
        .unwrap();

    assert_eq!(turn.reply, "Hello!");
    assert_eq!(turn.tokens_out, Some(3));

    let run = controller
        .state()
        .get(&turn.run_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    let result = run.result.unwrap();
    assert_eq!(result["reply"], "Hello!");
    assert_eq!(result["input"], "Hi");
    assert_eq!(result["model"], "gpt-4o-mini");
    assert!(result["costUsd"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_system_prompt_reaches_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "system", "content": "Be terse."},
                {"role": "user", "content": "Hi"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    controller
        .run_chat("Hi", Some("Be terse."), &ChatOptions::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_provider_failure_marks_the_run_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    let err = controller
        .run_chat_with_id("turn-1", "Hi", None, &ChatOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Ai(_)));

    let run = controller.state().get("turn-1").await.unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert!(run.error.unwrap().contains("HTTP 500"));
}

#[tokio::test]
async fn test_validation_failure_fails_the_run_without_a_request() {
    let server = MockServer::start().await;
    let controller = controller_for(&server);

    let err = controller
        .run_chat_with_id("turn-1", "   ", None, &ChatOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Ai(AiError::Validation { .. })));
    assert!(server.received_requests().await.unwrap().is_empty());

    let run = controller.state().get("turn-1").await.unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert!(run.error.unwrap().contains("validation"));
}

#[tokio::test]
async fn test_duplicate_run_id_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    controller
        .run_chat_with_id("turn-1", "Hi", None, &ChatOptions::default())
        .await
        .unwrap();

    let err = controller
        .run_chat_with_id("turn-1", "Hi again", None, &ChatOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Core(CoreError::RunAlreadyExists { .. })
    ));
    // the completed run is untouched
    let run = controller.state().get("turn-1").await.unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
}

#[tokio::test]
async fn test_tool_payload_validation() {
    let server = MockServer::start().await;
    let registry = ValidatorRegistry::new();
    registry.register("search", |payload: &serde_json::Value| {
        match payload.get("query").and_then(serde_json::Value::as_str) {
            Some(query) => Validation::Valid(json!({"query": query.trim()})),
            None => Validation::invalid("missing 'query'"),
        }
    });

    let config = AiConfig {
        base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        ..AiConfig::default()
    };
    let controller = ExecutionController::with_validators(
        StateManager::in_memory(),
        ChatClient::new(config),
        registry,
    );

    // the validator's normalized payload is what comes back
    let parsed = controller
        .validate_tool_payload("search", &json!({"query": "  rust  "}))
        .unwrap();
    assert_eq!(parsed, json!({"query": "rust"}));

    let err = controller
        .validate_tool_payload("search", &json!({}))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidPayload { .. }));

    // unregistered tools pass their payload through unchanged
    let payload = json!({"url": "https://example.com"});
    assert_eq!(
        controller.validate_tool_payload("fetch", &payload).unwrap(),
        payload
    );
}
