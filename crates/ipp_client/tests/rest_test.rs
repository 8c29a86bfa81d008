use assert_matches::assert_matches;
use httpmock::prelude::*;
use ipp_client::{Client, Error, types::Role};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_search_queries() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/scrapers/queries");
            then.status(200).json_body(json!([
                {
                    "id": 42,
                    "query": "Rust backend engineer",
                    "total_results": 17,
                    "created_at": "2025-01-01T10:00:00",
                    "updated_at": "2025-01-01T10:05:00"
                },
                { "id": 43, "query": "Go developer", "total_results": null,
                  "created_at": "2025-01-02T10:00:00", "updated_at": "2025-01-02T10:00:00" }
            ]));
        })
        .await;

    let queries = Client::new(server.url("/api/v1"))
        .search_queries()
        .await
        .unwrap();

    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].id, 42);
    assert_eq!(queries[0].total_results, Some(17));
    assert_eq!(queries[1].total_results, None);
}

#[tokio::test]
async fn test_session_details() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/conversation_history/session/S1");
            then.status(200).json_body(json!({
                "session_id": "S1",
                "title": null,
                "created_at": "2025-01-01T10:00:00",
                "updated_at": "2025-01-01T10:05:00",
                "total_messages": 2,
                "interview_finished": false,
                "evaluated": false,
                "search_query_id": 42,
                "price": 0.0012,
                "messages": [
                    { "id": 1, "role": "user", "content": "Hi" },
                    { "id": 2, "role": "assistant", "content": "Welcome." }
                ]
            }));
        })
        .await;

    let session = Client::new(server.url("/api/v1"))
        .session("S1")
        .await
        .unwrap();

    assert_eq!(session.search_query_id, Some(42));
    assert_eq!(session.messages.len(), 2);
    assert_eq!(session.messages[1].role, Role::Assistant);
}

#[tokio::test]
async fn test_session_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/conversation_history/session/missing");
            then.status(404).body(r#"{"detail":"Session not found"}"#);
        })
        .await;

    let error = Client::new(server.url("/api/v1"))
        .session("missing")
        .await
        .unwrap_err();

    assert_matches!(error, Error::Api { code: 404, .. });
}

#[tokio::test]
async fn test_evaluate() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/evaluation/evaluate")
                .json_body(json!({ "chat_session_id": "S1", "search_query_id": 42 }));
            then.status(202);
        })
        .await;

    Client::new(server.url("/api/v1"))
        .evaluate("S1", 42)
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_one_shot_chat() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/chat/interview/S1")
                .json_body(json!({ "search_query_id": 42, "query": "What is Go?" }));
            then.status(200)
                .json_body(json!({ "response": "Go is a language.", "interview_finished": true }));
        })
        .await;

    let response = Client::new(server.url("/api/v1"))
        .chat("S1", 42, "What is Go?")
        .await
        .unwrap();

    assert_eq!(response.response, "Go is a language.");
    assert!(response.interview_finished);
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/health");
            then.status(200)
                .json_body(json!({ "status": "ok", "message": "ML API is running" }));
        })
        .await;

    let health = Client::new(server.url("/api/v1")).health().await.unwrap();
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn test_custom_http_client_is_used() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/health")
                .header("user-agent", "ipp-test/1");
            then.status(200).json_body(json!({ "status": "ok" }));
        })
        .await;

    let http_client = reqwest::Client::builder()
        .user_agent("ipp-test/1")
        .build()
        .unwrap();

    Client::new(server.url("/api/v1"))
        .with_http_client(http_client)
        .health()
        .await
        .unwrap();

    mock.assert_async().await;
}
