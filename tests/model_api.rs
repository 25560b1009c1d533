//! HTTP contract tests for the hosted inference backend.

use httpmock::prelude::*;

use docchat::config::ModelsConfig;
use docchat::error::EngineError;
use docchat::inference::{HostedBackend, InferenceBackend};

fn backend_for(server: &MockServer, max_retries: u32) -> HostedBackend {
    HostedBackend::new(&ModelsConfig {
        provider: "huggingface".to_string(),
        base_url: server.base_url(),
        summarizer_model: "Falconsai/text_summarization".to_string(),
        qa_model: "deepset/roberta-base-squad2".to_string(),
        timeout_secs: 5,
        max_retries,
    })
}

#[tokio::test]
async fn summarize_sends_bounds_and_parses_summary_text() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/models/Falconsai/text_summarization")
                .json_body_partial(
                    r#"{"parameters": {"max_length": 150, "min_length": 30, "do_sample": false}}"#,
                );
            then.status(200)
                .json_body(serde_json::json!([{"summary_text": "a tidy summary"}]));
        })
        .await;

    let backend = backend_for(&server, 0);
    let summary = backend.summarize("some long passage of text").await.unwrap();

    assert_eq!(summary, "a tidy summary");
    mock.assert_async().await;
}

#[tokio::test]
async fn answer_parses_span_and_score() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/models/deepset/roberta-base-squad2");
            then.status(200).json_body(serde_json::json!({
                "answer": "Paris",
                "score": 0.9732,
                "start": 0,
                "end": 5,
            }));
        })
        .await;

    let backend = backend_for(&server, 0);
    let span = backend
        .answer("What is the capital of France?", "Paris capital France")
        .await
        .unwrap();

    assert_eq!(span.answer, "Paris");
    assert!((span.score - 0.9732).abs() < 1e-9);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/models/deepset/roberta-base-squad2");
            then.status(404).body("model not found");
        })
        .await;

    let backend = backend_for(&server, 3);
    let err = backend.answer("q", "c").await.unwrap_err();

    assert!(matches!(err, EngineError::Inference(_)));
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn server_errors_retry_then_surface_as_unavailable() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/models/Falconsai/text_summarization");
            then.status(503).body("model loading");
        })
        .await;

    let backend = backend_for(&server, 1);
    let err = backend.summarize("text").await.unwrap_err();

    assert!(matches!(err, EngineError::ModelUnavailable(_)));
    mock.assert_hits_async(2).await;
}

#[tokio::test]
async fn malformed_payload_is_an_invalid_response() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/models/Falconsai/text_summarization");
            then.status(200).json_body(serde_json::json!({"unexpected": true}));
        })
        .await;

    let backend = backend_for(&server, 0);
    let err = backend.summarize("text").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidResponse(_)));
}
