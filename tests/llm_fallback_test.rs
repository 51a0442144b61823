//! LLM client and fallback-chain behavior against a local mock provider.

use askdb::llm::{CompletionRequest, OpenAiCompatibleClient, ProviderError, SqlGenerator, TextCompletion};
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;

fn completion_body(content: &str) -> String {
    json!({
        "choices": [{"message": {"content": content}}]
    })
    .to_string()
}

#[tokio::test]
async fn successful_completion_returns_trimmed_text() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body("  SELECT 1  "))
        .create_async()
        .await;

    let client = OpenAiCompatibleClient::new("test-key", server.url()).unwrap();
    let request = CompletionRequest::new("model-a", "system", "prompt");
    let text = client.complete(&request).await.unwrap();

    assert_eq!(text, "SELECT 1");
    mock.assert_async().await;
}

#[tokio::test]
async fn unauthorized_maps_to_auth_tag() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(json!({"error": {"message": "bad key"}}).to_string())
        .create_async()
        .await;

    let client = OpenAiCompatibleClient::new("test-key", server.url()).unwrap();
    let request = CompletionRequest::new("model-a", "system", "prompt");
    let err = client.complete(&request).await.unwrap_err();

    assert!(matches!(err, ProviderError::Auth { .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn rate_limit_maps_to_retryable_tag_with_retry_after() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_header("retry-after", "3")
        .with_body(json!({"error": {"message": "slow down"}}).to_string())
        .create_async()
        .await;

    let client = OpenAiCompatibleClient::new("test-key", server.url()).unwrap();
    let request = CompletionRequest::new("model-a", "system", "prompt");
    let err = client.complete(&request).await.unwrap_err();

    match err {
        ProviderError::RateLimited { retry_after, .. } => assert_eq!(retry_after, Some(3)),
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn fallback_chain_moves_past_rate_limited_primary() {
    let mut server = mockito::Server::new_async().await;

    let primary = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({"model": "primary"})))
        .with_status(429)
        .with_body(json!({"error": {"message": "rate limited"}}).to_string())
        .create_async()
        .await;

    let fallback = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({"model": "fallback"})))
        .with_status(200)
        .with_body(completion_body("```sql\nSELECT count(*) FROM users\n```"))
        .create_async()
        .await;

    let client = Arc::new(OpenAiCompatibleClient::new("test-key", server.url()).unwrap());
    let generator = SqlGenerator::new(
        client,
        vec!["primary".to_string(), "fallback".to_string()],
    );

    let sql = generator
        .generate_sql("how many users are there?", "Table: users")
        .await
        .unwrap();

    // Fences are stripped from the winning model's output.
    assert_eq!(sql, "SELECT count(*) FROM users");
    primary.assert_async().await;
    fallback.assert_async().await;
}

#[tokio::test]
async fn auth_failure_stops_chain_without_trying_fallback() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({"model": "primary"})))
        .with_status(401)
        .with_body(json!({"error": {"message": "bad key"}}).to_string())
        .create_async()
        .await;

    let fallback = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({"model": "fallback"})))
        .expect(0)
        .create_async()
        .await;

    let client = Arc::new(OpenAiCompatibleClient::new("test-key", server.url()).unwrap());
    let generator = SqlGenerator::new(
        client,
        vec!["primary".to_string(), "fallback".to_string()],
    );

    let err = generator
        .generate_sql("anything", "Table: t")
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Auth { .. }));
    fallback.assert_async().await;
}

#[tokio::test]
async fn exhausted_chain_reports_last_failure() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("POST", "/chat/completions")
        .with_status(402)
        .with_body(json!({"error": {"message": "insufficient credit"}}).to_string())
        .expect(2)
        .create_async()
        .await;

    let client = Arc::new(OpenAiCompatibleClient::new("test-key", server.url()).unwrap());
    let generator = SqlGenerator::new(client, vec!["a".to_string(), "b".to_string()]);

    let err = generator.generate_sql("q", "Table: t").await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("All 2 configured model(s) failed"));
    assert!(message.contains("insufficient credit"));
}
