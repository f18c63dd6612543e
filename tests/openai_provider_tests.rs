//! HTTP error-mapping tests for the OpenAI-compatible providers.

use docrag::{EmbeddingProvider, LanguageModel, RagError};
use docrag::openai::{OpenAiChatProvider, OpenAiEmbeddingProvider};
use httpmock::prelude::*;
use serde_json::json;

fn embedding_provider(server: &MockServer) -> OpenAiEmbeddingProvider {
    OpenAiEmbeddingProvider::new("test-key").unwrap().with_base_url(server.base_url())
}

fn chat_provider(server: &MockServer) -> OpenAiChatProvider {
    OpenAiChatProvider::new("test-key").unwrap().with_base_url(server.base_url())
}

#[tokio::test]
async fn embed_batch_orders_vectors_by_the_reported_index() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/embeddings").header("authorization", "Bearer test-key");
            then.status(200).json_body(json!({
                "data": [
                    { "index": 1, "embedding": [0.0, 1.0] },
                    { "index": 0, "embedding": [1.0, 0.0] },
                ]
            }));
        })
        .await;

    let provider = embedding_provider(&server);
    let vectors = provider.embed_batch(&["first", "second"]).await.unwrap();
    assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    mock.assert_async().await;
}

#[tokio::test]
async fn server_errors_map_to_provider_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/embeddings");
            then.status(500).json_body(json!({ "error": { "message": "overloaded" } }));
        })
        .await;

    let err = embedding_provider(&server).embed("hello").await.unwrap_err();
    assert!(matches!(err, RagError::ProviderUnavailable { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn rate_limiting_maps_to_provider_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/embeddings");
            then.status(429).json_body(json!({ "error": { "message": "rate limited" } }));
        })
        .await;

    let err = embedding_provider(&server).embed("hello").await.unwrap_err();
    assert!(matches!(err, RagError::ProviderUnavailable { .. }));
}

#[tokio::test]
async fn client_errors_map_to_provider_rejected() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/embeddings");
            then.status(400).json_body(json!({ "error": { "message": "invalid model" } }));
        })
        .await;

    let err = embedding_provider(&server).embed("hello").await.unwrap_err();
    match err {
        RagError::ProviderRejected { message, .. } => assert!(message.contains("invalid model")),
        other => panic!("expected ProviderRejected, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_input_is_rejected_without_a_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/embeddings");
            then.status(200).json_body(json!({ "data": [] }));
        })
        .await;

    let err = embedding_provider(&server).embed("   ").await.unwrap_err();
    assert!(matches!(err, RagError::ProviderRejected { .. }));
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn over_limit_input_fails_with_too_long_without_a_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/embeddings");
            then.status(200).json_body(json!({ "data": [] }));
        })
        .await;

    let provider = embedding_provider(&server).with_max_input_chars(8);
    let err = provider.embed("way past the limit").await.unwrap_err();
    assert!(matches!(err, RagError::TooLong { max: 8, .. }));
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn a_length_mismatched_response_is_an_error_not_a_silent_drop() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/embeddings");
            then.status(200).json_body(json!({
                "data": [ { "index": 0, "embedding": [1.0, 0.0] } ]
            }));
        })
        .await;

    let err = embedding_provider(&server).embed_batch(&["a", "b"]).await.unwrap_err();
    assert!(matches!(err, RagError::ProviderUnavailable { .. }));
}

#[tokio::test]
async fn chat_provider_returns_the_first_choice_content() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("authorization", "Bearer test-key");
            then.status(200).json_body(json!({
                "choices": [ { "message": { "content": "the answer" } } ]
            }));
        })
        .await;

    let answer = chat_provider(&server).generate("a prompt").await.unwrap();
    assert_eq!(answer, "the answer");
    mock.assert_async().await;
}

#[tokio::test]
async fn chat_failures_collapse_to_generation_failed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(500).json_body(json!({ "error": { "message": "overloaded" } }));
        })
        .await;

    let err = chat_provider(&server).generate("a prompt").await.unwrap_err();
    assert!(matches!(err, RagError::GenerationFailed(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn chat_response_with_no_choices_is_generation_failed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(json!({ "choices": [] }));
        })
        .await;

    let err = chat_provider(&server).generate("a prompt").await.unwrap_err();
    assert!(matches!(err, RagError::GenerationFailed(_)));
}
