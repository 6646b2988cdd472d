//! HTTP Connection Manager
//!
//! Owns the `sessionId -> ServerTransport` map and exposes the two HTTP entry
//! points a host application mounts to serve MCP over SSE: `GET /sse` (opens
//! the stream) and `POST /messages` (delivers a request or notification to an
//! existing session). A background timer periodically evicts sessions whose
//! SSE stream has already gone away.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use dashmap::DashMap;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tokio_stream::wrappers::ReceiverStream;

use crate::authentication::{HttpAuthenticator, NoneAuthenticator};
use crate::protocol::{JsonRpcError, MessageContext, MessageHandler, Transport, TransportBuilder};

use super::session::{SseServerTransport, SseServerTransportBuilder};

/// Cleanup timer cadence (spec: every 5 minutes).
const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Ceiling for draining all open sessions on shutdown (spec: 10 seconds).
const SHUTDOWN_CEILING: Duration = Duration::from_secs(10);

/// Server-side registry of live SSE sessions plus the two HTTP handlers that
/// drive them.
///
/// A single `message_handler` (typically [`crate::integration::McpServer::handler`])
/// is shared across every session; sessions are distinguished by the
/// `session_id` carried on each [`MessageContext`].
pub struct HttpConnectionManager {
    sessions: DashMap<String, Arc<Mutex<SseServerTransport>>>,
    message_handler: Arc<dyn MessageHandler<()>>,
    authenticator: Arc<dyn HttpAuthenticator>,
    cleanup_interval: Duration,
}

impl HttpConnectionManager {
    /// Create a manager with no authentication requirement.
    pub fn new(message_handler: Arc<dyn MessageHandler<()>>) -> Self {
        Self {
            sessions: DashMap::new(),
            message_handler,
            authenticator: Arc::new(NoneAuthenticator),
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }

    /// Run authentication (§4.8) on both the SSE connection and every
    /// message POST using the supplied strategy.
    pub fn with_authenticator(mut self, authenticator: Arc<dyn HttpAuthenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    /// Override the session cleanup cadence.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Build the axum router exposing `/sse` and `/messages`.
    pub fn router(manager: Arc<Self>) -> Router {
        Router::new()
            .route("/sse", get(handle_sse_connection))
            .route("/messages", post(handle_message))
            .with_state(manager)
    }

    /// Spawn the background cleanup timer; the returned handle may be
    /// dropped, the task keeps running for the manager's lifetime.
    pub fn spawn_cleanup_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(manager.cleanup_interval);
            loop {
                interval.tick().await;
                manager.evict_closed_sessions();
            }
        })
    }

    fn evict_closed_sessions(&self) {
        self.sessions.retain(|_, transport| match transport.try_lock() {
            Ok(guard) => guard.is_connected(),
            Err(_) => true,
        });
    }

    /// Close every open session in parallel with a 10-second ceiling, then
    /// clear the map.
    pub async fn shutdown(&self) {
        let transports: Vec<_> = self
            .sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        self.sessions.clear();

        let closes = transports.into_iter().map(|transport| async move {
            let mut guard = transport.lock().await;
            let _ = guard.close().await;
        });

        let _ = tokio::time::timeout(SHUTDOWN_CEILING, futures::future::join_all(closes)).await;
    }

    async fn authenticate(&self, headers: &HeaderMap, query: &HashMap<String, String>) -> Result<(), String> {
        let result = self.authenticator.authenticate(headers, query).await;
        if result.succeeded {
            Ok(())
        } else {
            Err(result.failure_reason.unwrap_or_else(|| "authentication failed".to_string()))
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

async fn handle_sse_connection(
    State(manager): State<Arc<HttpConnectionManager>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Err(message) = manager.authenticate(&headers, &query).await {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response();
    }

    let builder = SseServerTransportBuilder::new().with_message_handler(manager.message_handler.clone());
    let mut transport = match builder.build().await {
        Ok(transport) => transport,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    };

    let session_id = transport
        .session_id()
        .expect("freshly built SSE transport always carries a session id");

    let event_stream = transport
        .take_event_stream()
        .await
        .expect("freshly built transport always owns its event stream");

    if let Err(e) = transport.start().await {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response();
    }

    manager
        .sessions
        .insert(session_id, Arc::new(Mutex::new(transport)));

    let stream = ReceiverStream::new(event_stream).map(Ok::<_, Infallible>);
    Sse::new(stream).keep_alive(KeepAlive::default()).into_response()
}

async fn handle_message(
    State(manager): State<Arc<HttpConnectionManager>>,
    Query(query): Query<MessageQuery>,
    Query(raw_query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let Some(session_id) = query.session_id else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing sessionId" })),
        )
            .into_response();
    };

    if let Err(message) = manager.authenticate(&headers, &raw_query).await {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response();
    }

    let Some(transport) = manager.sessions.get(&session_id).map(|entry| entry.value().clone()) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Session not found" })),
        )
            .into_response();
    };

    let message = match serde_json::from_str(&body) {
        Ok(message) => message,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "code": JsonRpcError::PARSE_ERROR,
                    "message": "Parse error",
                })),
            )
                .into_response();
        }
    };

    let context = MessageContext::<()>::new(session_id);
    let transport = transport.lock().await;
    transport.dispatch_incoming(message, context).await;
    drop(transport);

    (StatusCode::ACCEPTED, Json(json!({ "status": "accepted" }))).into_response()
}
