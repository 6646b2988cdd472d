//! SSE Server Transport
//!
//! One transport instance backs a single long-lived `GET /sse` response. The
//! transport never reads from the HTTP connection itself — inbound JSON-RPC
//! requests arrive out-of-band via `POST /messages?sessionId=<sid>` and are
//! handed to this transport by [`super::manager::HttpConnectionManager`]
//! through [`SseServerTransport::dispatch_incoming`].

use std::sync::Arc;

use async_trait::async_trait;
use axum::response::sse::Event;
use tokio::sync::{mpsc, Mutex};

use crate::protocol::{JsonRpcMessage, MessageContext, MessageHandler, Transport, TransportBuilder, TransportError};

/// Channel depth for buffered outbound SSE frames.
const DEFAULT_CHANNEL_CAPACITY: usize = 128;

/// Server-side half of the SSE transport.
///
/// `start()` emits the `endpoint` event; `send()` emits subsequent responses
/// as anonymous `data:` frames. The receiving half of the event channel is
/// handed to axum's `Sse` response by the connection manager via
/// [`SseServerTransport::take_event_stream`].
pub struct SseServerTransport {
    session_id: String,
    message_handler: Option<Arc<dyn MessageHandler<()>>>,
    sender: mpsc::Sender<Event>,
    receiver: Mutex<Option<mpsc::Receiver<Event>>>,
    is_running: bool,
}

impl SseServerTransport {
    /// Hand off the receiving half of the SSE event channel.
    ///
    /// Returns `None` if already taken — a transport's event stream may only
    /// be consumed once.
    pub async fn take_event_stream(&self) -> Option<mpsc::Receiver<Event>> {
        self.receiver.lock().await.take()
    }

    /// Deliver an inbound JSON-RPC message received via `POST /messages` to
    /// the configured message handler.
    ///
    /// This is the re-emission path described for the SSE server transport:
    /// the HTTP connection manager owns the request, this transport owns the
    /// session and the registered handler.
    pub async fn dispatch_incoming(&self, message: JsonRpcMessage, context: MessageContext<()>) {
        if let Some(handler) = &self.message_handler {
            handler.handle_message(message, context).await;
        }
    }

    /// Forward a transport-level error (e.g. a malformed POST body) to the
    /// configured handler.
    pub async fn dispatch_error(&self, error: TransportError) {
        if let Some(handler) = &self.message_handler {
            handler.handle_error(error).await;
        }
    }

    fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[async_trait]
impl Transport for SseServerTransport {
    type Error = TransportError;

    async fn start(&mut self) -> Result<(), Self::Error> {
        if self.is_running {
            return Err(TransportError::Connection {
                message: "SSE server transport already started".to_string(),
            });
        }

        let endpoint = format!("/messages?sessionId={}", self.session_id);
        let event = Event::default().event("endpoint").data(endpoint);
        self.sender
            .send(event)
            .await
            .map_err(|_| TransportError::Connection {
                message: "SSE stream closed before endpoint event could be written".to_string(),
            })?;

        self.is_running = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), Self::Error> {
        if !self.is_running {
            return Ok(());
        }

        self.is_running = false;
        if let Some(handler) = &self.message_handler {
            handler.handle_close().await;
        }
        Ok(())
    }

    async fn send(&mut self, message: &JsonRpcMessage) -> Result<(), Self::Error> {
        if !self.is_running {
            return Err(TransportError::Connection {
                message: "SSE server transport not started".to_string(),
            });
        }

        let json = serde_json::to_string(message)
            .map_err(|e| TransportError::Serialization { source: e })?;

        self.sender
            .send(Event::default().data(json))
            .await
            .map_err(|_| TransportError::Connection {
                message: "SSE stream closed".to_string(),
            })
    }

    fn session_id(&self) -> Option<String> {
        Some(self.session_id.clone())
    }

    fn set_session_context(&mut self, session_id: Option<String>) {
        if let Some(id) = session_id {
            self.session_id = id;
        }
    }

    fn is_connected(&self) -> bool {
        self.is_running && !self.is_closed()
    }

    fn transport_type(&self) -> &'static str {
        "sse-server"
    }
}

/// Pre-configured builder for [`SseServerTransport`] (ADR-011 pattern).
pub struct SseServerTransportBuilder {
    message_handler: Option<Arc<dyn MessageHandler<()>>>,
    session_id: Option<String>,
    channel_capacity: usize,
}

impl SseServerTransportBuilder {
    /// Create a builder with a freshly minted v4 UUID session id.
    pub fn new() -> Self {
        Self {
            message_handler: None,
            session_id: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Use an explicit session id instead of generating one.
    pub fn with_session_id(mut self, session_id: String) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Override the buffered event channel depth.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }
}

impl Default for SseServerTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportBuilder<()> for SseServerTransportBuilder {
    type Transport = SseServerTransport;
    type Error = TransportError;

    fn with_message_handler(mut self, handler: Arc<dyn MessageHandler<()>>) -> Self {
        self.message_handler = Some(handler);
        self
    }

    fn build(self) -> impl std::future::Future<Output = Result<Self::Transport, Self::Error>> + Send {
        async move {
            let handler = self.message_handler.ok_or_else(|| TransportError::Connection {
                message: "Message handler must be set before building transport".to_string(),
            })?;

            let session_id = self
                .session_id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

            let (sender, receiver) = mpsc::channel(self.channel_capacity);

            Ok(SseServerTransport {
                session_id,
                message_handler: Some(handler),
                sender,
                receiver: Mutex::new(Some(receiver)),
                is_running: false,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::RequestId;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex as StdMutex;

    struct RecordingHandler {
        messages: StdMutex<Vec<JsonRpcMessage>>,
        closed: AtomicBool,
    }

    impl RecordingHandler {
        fn new() -> Self {
            Self {
                messages: StdMutex::new(Vec::new()),
                closed: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl MessageHandler<()> for RecordingHandler {
        async fn handle_message(&self, message: JsonRpcMessage, _context: MessageContext<()>) {
            self.messages.lock().unwrap().push(message);
        }

        async fn handle_error(&self, _error: TransportError) {}

        async fn handle_close(&self) {
            self.closed.store(true, Ordering::Release);
        }
    }

    #[tokio::test]
    async fn start_emits_endpoint_event_with_session_id() {
        let handler = Arc::new(RecordingHandler::new());
        let mut transport = SseServerTransportBuilder::new()
            .with_session_id("abc-123".to_string())
            .with_message_handler(handler)
            .build()
            .await
            .unwrap();

        let mut rx = transport.take_event_stream().await.unwrap();
        transport.start().await.unwrap();

        let event = rx.recv().await.unwrap();
        let rendered = format!("{event:?}");
        assert!(rendered.contains("endpoint"));
        assert!(rendered.contains("sessionId=abc-123"));
    }

    #[tokio::test]
    async fn send_before_start_fails() {
        let handler = Arc::new(RecordingHandler::new());
        let mut transport = SseServerTransportBuilder::new()
            .with_message_handler(handler)
            .build()
            .await
            .unwrap();

        let message = JsonRpcMessage::from_notification("ping", None);
        let result = transport.send(&message).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn dispatch_incoming_reaches_handler() {
        let handler = Arc::new(RecordingHandler::new());
        let transport = SseServerTransportBuilder::new()
            .with_message_handler(handler.clone())
            .build()
            .await
            .unwrap();

        let request = JsonRpcMessage::from_request("tools/list", None, RequestId::new_number(1));
        transport
            .dispatch_incoming(request, MessageContext::new("abc-123"))
            .await;

        assert_eq!(handler.messages.lock().unwrap().len(), 1);
    }
}
