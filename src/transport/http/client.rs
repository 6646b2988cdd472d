//! SSE Client Transport
//!
//! Opens a `GET` to the server's SSE endpoint and parses the event stream,
//! capturing the `endpoint` event (the URL subsequent requests POST to) and
//! dispatching anonymous `data:` events to the configured message handler as
//! JSON-RPC responses. Outbound requests and notifications are POSTed to the
//! captured endpoint; the server acknowledges with `202 Accepted` and the
//! actual response (if any) arrives later over the SSE stream.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::{broadcast, watch};

use crate::protocol::{JsonRpcMessage, MessageContext, MessageHandler, Transport, TransportBuilder, TransportError};

/// Client-side half of the SSE transport.
pub struct SseClientTransport {
    base_url: String,
    sse_path: String,
    http: reqwest::Client,
    message_handler: Option<Arc<dyn MessageHandler<()>>>,
    endpoint_url: watch::Receiver<Option<String>>,
    endpoint_tx: Option<watch::Sender<Option<String>>>,
    shutdown_tx: Option<broadcast::Sender<()>>,
    task_handle: Option<tokio::task::JoinHandle<()>>,
    session_id: Option<String>,
    is_running: bool,
}

impl SseClientTransport {
    /// Resolve the captured POST endpoint into an absolute URL, waiting for
    /// the `endpoint` event to arrive if the stream has just started.
    async fn resolve_post_url(&self) -> Result<String, TransportError> {
        let mut rx = self.endpoint_url.clone();
        if rx.borrow().is_none() {
            rx.changed().await.map_err(|_| TransportError::Connection {
                message: "SSE stream closed before endpoint event was received".to_string(),
            })?;
        }
        let path = rx
            .borrow()
            .clone()
            .ok_or_else(|| TransportError::Connection {
                message: "endpoint event never received".to_string(),
            })?;
        Ok(format!("{}{}", self.base_url, path))
    }
}

#[async_trait]
impl Transport for SseClientTransport {
    type Error = TransportError;

    async fn start(&mut self) -> Result<(), Self::Error> {
        if self.is_running {
            return Err(TransportError::Connection {
                message: "SSE client transport already started".to_string(),
            });
        }

        let handler = self
            .message_handler
            .as_ref()
            .ok_or_else(|| TransportError::Connection {
                message: "No message handler configured. Use SseClientTransportBuilder."
                    .to_string(),
            })?
            .clone();

        let url = format!("{}{}", self.base_url, self.sse_path);
        let response = self
            .http
            .get(&url)
            .header("accept", "text/event-stream")
            .send()
            .await
            .map_err(|e| TransportError::Connection {
                message: format!("failed to open SSE stream: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(TransportError::Connection {
                message: format!("SSE endpoint returned status {}", response.status()),
            });
        }

        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
        self.shutdown_tx = Some(shutdown_tx);

        let endpoint_tx = self
            .endpoint_tx
            .take()
            .expect("endpoint sender consumed twice");

        let task_handle = tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buf = String::new();
            let mut event_name: Option<String> = None;
            let mut data_lines: Vec<String> = Vec::new();

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        handler.handle_close().await;
                        break;
                    }
                    chunk = stream.next() => {
                        match chunk {
                            None => {
                                handler.handle_close().await;
                                break;
                            }
                            Some(Err(e)) => {
                                handler
                                    .handle_error(TransportError::Connection {
                                        message: format!("SSE stream read error: {e}"),
                                    })
                                    .await;
                                break;
                            }
                            Some(Ok(chunk)) => {
                                buf.push_str(&String::from_utf8_lossy(&chunk));

                                while let Some(idx) = buf.find('\n') {
                                    let line = buf[..idx].trim_end_matches('\r').to_string();
                                    buf.drain(..=idx);

                                    if line.is_empty() {
                                        if let Some(name) = event_name.take() {
                                            if name == "endpoint" {
                                                let data = data_lines.join("\n");
                                                let _ = endpoint_tx.send(Some(data));
                                            }
                                        } else if !data_lines.is_empty() {
                                            let data = data_lines.join("\n");
                                            match serde_json::from_str::<JsonRpcMessage>(&data) {
                                                Ok(message) => {
                                                    let context = MessageContext::<()>::without_session();
                                                    handler.handle_message(message, context).await;
                                                }
                                                Err(e) => {
                                                    handler
                                                        .handle_error(TransportError::Serialization { source: e })
                                                        .await;
                                                }
                                            }
                                        }
                                        data_lines.clear();
                                    } else if let Some(rest) = line.strip_prefix("event:") {
                                        event_name = Some(rest.trim().to_string());
                                    } else if let Some(rest) = line.strip_prefix("data:") {
                                        data_lines.push(rest.trim_start().to_string());
                                    }
                                }
                            }
                        }
                    }
                }
            }
        });

        self.task_handle = Some(task_handle);
        self.is_running = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), Self::Error> {
        if !self.is_running {
            return Ok(());
        }

        if let Some(shutdown_tx) = &self.shutdown_tx {
            let _ = shutdown_tx.send(());
        }

        if let Some(task_handle) = self.task_handle.take() {
            let _ = task_handle.await;
        }

        self.is_running = false;
        Ok(())
    }

    async fn send(&mut self, message: &JsonRpcMessage) -> Result<(), Self::Error> {
        if !self.is_running {
            return Err(TransportError::Connection {
                message: "SSE client transport not started".to_string(),
            });
        }

        let url = self.resolve_post_url().await?;
        let json = serde_json::to_string(message)
            .map_err(|e| TransportError::Serialization { source: e })?;

        let response = self
            .http
            .post(url)
            .header("content-type", "application/json")
            .body(json)
            .send()
            .await
            .map_err(|e| TransportError::Connection {
                message: format!("failed to POST message: {e}"),
            })?;

        if response.status() != reqwest::StatusCode::ACCEPTED {
            return Err(TransportError::Protocol {
                message: format!("unexpected status from message endpoint: {}", response.status()),
            });
        }

        Ok(())
    }

    fn session_id(&self) -> Option<String> {
        self.session_id.clone()
    }

    fn set_session_context(&mut self, session_id: Option<String>) {
        self.session_id = session_id;
    }

    fn is_connected(&self) -> bool {
        self.is_running
    }

    fn transport_type(&self) -> &'static str {
        "sse-client"
    }
}

/// Pre-configured builder for [`SseClientTransport`] (ADR-011 pattern).
pub struct SseClientTransportBuilder {
    base_url: String,
    sse_path: String,
    message_handler: Option<Arc<dyn MessageHandler<()>>>,
}

impl SseClientTransportBuilder {
    /// Create a builder pointed at `base_url` (e.g. `http://localhost:8080`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            sse_path: "/sse".to_string(),
            message_handler: None,
        }
    }

    /// Override the SSE stream path (defaults to `/sse`).
    pub fn with_sse_path(mut self, path: impl Into<String>) -> Self {
        self.sse_path = path.into();
        self
    }
}

impl TransportBuilder<()> for SseClientTransportBuilder {
    type Transport = SseClientTransport;
    type Error = TransportError;

    fn with_message_handler(mut self, handler: Arc<dyn MessageHandler<()>>) -> Self {
        self.message_handler = Some(handler);
        self
    }

    fn build(self) -> impl std::future::Future<Output = Result<Self::Transport, Self::Error>> + Send {
        async move {
            let http = reqwest::Client::builder()
                .build()
                .map_err(|e| TransportError::Connection {
                    message: format!("failed to build HTTP client: {e}"),
                })?;

            let (endpoint_tx, endpoint_rx) = watch::channel(None);

            Ok(SseClientTransport {
                base_url: self.base_url,
                sse_path: self.sse_path,
                http,
                message_handler: self.message_handler,
                endpoint_url: endpoint_rx,
                endpoint_tx: Some(endpoint_tx),
                shutdown_tx: None,
                task_handle: None,
                session_id: None,
                is_running: false,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builder_requires_handler_is_optional_but_start_requires_it() {
        let mut transport = SseClientTransportBuilder::new("http://127.0.0.1:0")
            .build()
            .await
            .unwrap();

        let result = transport.start().await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("No message handler configured"));
    }

    #[tokio::test]
    async fn builder_produces_disconnected_transport() {
        let transport = SseClientTransportBuilder::new("http://127.0.0.1:0").build().await.unwrap();
        assert!(!transport.is_connected());
        assert_eq!(transport.transport_type(), "sse-client");
    }
}
