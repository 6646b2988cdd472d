//! Integration tests driving the real `/sse` and `/messages` HTTP surface,
//! wired to an actual [`McpServer`] rather than a stub message handler.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use mcp_core::authentication::strategies::apikey::validator::InMemoryApiKeyValidator;
use mcp_core::authentication::ApiKeyAuthenticator;
use mcp_core::transport::http::HttpConnectionManager;
use mcp_core::{McpServerBuilder, ToolRegistry};
use tower::ServiceExt;

fn manager() -> Arc<HttpConnectionManager> {
    let server = McpServerBuilder::new()
        .with_tool_provider(Arc::new(ToolRegistry::new()))
        .build();
    Arc::new(HttpConnectionManager::new(server.handler()))
}

#[tokio::test]
async fn message_for_unknown_session_is_not_found() {
    let app = HttpConnectionManager::router(manager());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/messages?sessionId=does-not-exist")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn message_without_session_id_is_bad_request() {
    let app = HttpConnectionManager::router(manager());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/messages")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sse_connection_rejected_without_api_key() {
    let server = McpServerBuilder::new()
        .with_tool_provider(Arc::new(ToolRegistry::new()))
        .build();
    let validator = InMemoryApiKeyValidator::new(std::collections::HashMap::new());
    let manager = Arc::new(
        HttpConnectionManager::new(server.handler())
            .with_authenticator(Arc::new(ApiKeyAuthenticator::new(validator))),
    );
    let app = HttpConnectionManager::router(manager);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/sse")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn sse_connection_accepted_opens_event_stream() {
    let app = HttpConnectionManager::router(manager());

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/sse")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").map(|v| v.as_bytes()),
        Some("text/event-stream".as_bytes())
    );
}
