//! High-level MCP Client API
//!
//! This module provides a high-level, type-safe MCP client that simplifies
//! interaction with MCP servers through intuitive method calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{oneshot, Mutex, RwLock};

use crate::integration::constants::{defaults, methods};
use crate::integration::error::{McpError, McpResult};
use crate::protocol::transport::{
    MessageContext, MessageHandler, Transport, TransportBuilder, TransportError,
};
use crate::protocol::RequestId;
use crate::protocol::{
    CallToolRequest, CallToolResponse, ClientCapabilities, ClientInfo, Content, InitializeRequest,
    InitializeResponse, ListToolsRequest, ListToolsResponse, ProtocolVersion, ServerCapabilities,
    Tool,
};
use crate::protocol::{JsonRpcMessage, JsonRpcRequest, JsonRpcResponse};
use tracing::warn;

/// MCP Protocol Session State (separate from transport connectivity)
#[derive(Debug, Clone, PartialEq)]
pub enum McpSessionState {
    /// Haven't done MCP handshake yet
    NotInitialized,
    /// MCP initialize request sent, waiting for response
    Initializing,
    /// MCP handshake complete, server capabilities received
    Ready,
    /// MCP protocol failed (handshake failed, incompatible version, etc.)
    Failed,
}

/// Configuration for MCP client behavior
#[derive(Debug, Clone)]
pub struct McpClientConfig {
    /// Client information to send during initialization
    pub client_info: ClientInfo,
    /// Client capabilities to advertise
    pub capabilities: ClientCapabilities,
    /// Protocol version to use
    pub protocol_version: ProtocolVersion,
    /// Default timeout for operations
    pub default_timeout: Duration,
    /// Whether to automatically retry failed operations
    pub auto_retry: bool,
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Whether to automatically reconnect on connection loss
    pub auto_reconnect: bool,
}

impl Default for McpClientConfig {
    fn default() -> Self {
        Self {
            client_info: ClientInfo {
                name: defaults::CLIENT_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            capabilities: ClientCapabilities::default(),
            protocol_version: ProtocolVersion::current(),
            default_timeout: Duration::from_secs(defaults::TIMEOUT_SECONDS),
            auto_retry: true,
            max_retries: defaults::MAX_RETRIES,
            auto_reconnect: false,
        }
    }
}

/// Builder for creating MCP clients
#[derive(Default)]
pub struct McpClientBuilder {
    config: McpClientConfig,
}

impl McpClientBuilder {
    /// Create a new MCP client builder
    pub fn new() -> Self {
        Self {
            config: McpClientConfig::default(),
        }
    }

    /// Set client information
    pub fn client_info(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.config.client_info = ClientInfo {
            name: name.into(),
            version: version.into(),
        };
        self
    }

    /// Set client capabilities
    pub fn capabilities(mut self, capabilities: ClientCapabilities) -> Self {
        self.config.capabilities = capabilities;
        self
    }

    /// Set protocol version
    pub fn protocol_version(mut self, version: ProtocolVersion) -> Self {
        self.config.protocol_version = version;
        self
    }

    /// Set default timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.default_timeout = timeout;
        self
    }

    /// Enable automatic retry on failures
    pub fn auto_retry(mut self, enabled: bool, max_retries: u32) -> Self {
        self.config.auto_retry = enabled;
        self.config.max_retries = max_retries;
        self
    }

    /// Enable automatic reconnection
    pub fn auto_reconnect(mut self, enabled: bool) -> Self {
        self.config.auto_reconnect = enabled;
        self
    }

    /// Build the MCP client from a transport builder.
    ///
    /// The handler that correlates responses to pending requests is attached
    /// to the transport *before* it is built, following the pre-configured
    /// transport pattern (`TransportBuilder`) rather than mutating a running
    /// transport after the fact.
    pub async fn build<B>(self, transport_builder: B) -> McpResult<McpClient<B::Transport>>
    where
        B: TransportBuilder,
        B::Transport: 'static,
    {
        McpClient::new_with_config(transport_builder, self.config).await
    }
}

/// Message handler for MCP client responses
#[derive(Clone)]
struct ClientMessageHandler {
    pending_requests: Arc<Mutex<HashMap<String, oneshot::Sender<JsonRpcResponse>>>>,
}

#[async_trait]
impl MessageHandler for ClientMessageHandler {
    async fn handle_message(&self, message: JsonRpcMessage, _context: MessageContext) {
        match message {
            JsonRpcMessage::Response(response) => {
                if let Some(id) = &response.id {
                    let id_str = id.to_string();
                    let mut pending = self.pending_requests.lock().await;
                    if let Some(sender) = pending.remove(&id_str) {
                        let _ = sender.send(response); // receiver may have been dropped
                    } else {
                        warn!(id = %id_str, "received response for unknown request id");
                    }
                } else {
                    warn!("received response with no request id");
                }
            }
            JsonRpcMessage::Notification(_) => {
                // No client-side subscriptions in this core; notifications are dropped.
            }
            JsonRpcMessage::Request(_) => {
                // Servers don't send requests to clients in this core.
            }
        }
    }

    async fn handle_error(&self, _error: TransportError) {}

    async fn handle_close(&self) {
        let mut pending = self.pending_requests.lock().await;
        pending.clear();
    }
}

/// High-level MCP client for interacting with MCP servers
pub struct McpClient<T: Transport> {
    /// Transport layer for communication
    transport: Arc<RwLock<T>>,
    /// Client configuration
    config: McpClientConfig,
    /// Current MCP session state (separate from transport connectivity)
    mcp_session: Arc<RwLock<McpSessionState>>,
    /// Server capabilities (available after initialization)
    server_capabilities: Arc<RwLock<Option<ServerCapabilities>>>,
    /// Cached tools for efficient access
    tool_cache: Arc<RwLock<HashMap<String, Tool>>>,
    /// Pending requests for correlation
    pending_requests: Arc<Mutex<HashMap<String, oneshot::Sender<JsonRpcResponse>>>>,
}

impl<T: Transport + 'static> McpClient<T> {
    /// Create a new MCP client from a transport builder
    pub async fn new<B>(transport_builder: B) -> McpResult<Self>
    where
        B: TransportBuilder<Transport = T>,
    {
        McpClientBuilder::new()
            .build(transport_builder)
            .await
    }

    /// Create a new MCP client with configuration
    pub(crate) async fn new_with_config<B>(
        transport_builder: B,
        config: McpClientConfig,
    ) -> McpResult<Self>
    where
        B: TransportBuilder<Transport = T>,
    {
        let pending_requests = Arc::new(Mutex::new(HashMap::new()));

        let handler = Arc::new(ClientMessageHandler {
            pending_requests: pending_requests.clone(),
        });

        let mut transport = transport_builder
            .with_message_handler(handler)
            .build()
            .await
            .map_err(|e| McpError::custom(format!("Failed to build transport: {e}")))?;

        transport
            .start()
            .await
            .map_err(|e| McpError::custom(format!("Failed to start transport: {e}")))?;

        Ok(Self {
            transport: Arc::new(RwLock::new(transport)),
            config,
            mcp_session: Arc::new(RwLock::new(McpSessionState::NotInitialized)),
            server_capabilities: Arc::new(RwLock::new(None)),
            tool_cache: Arc::new(RwLock::new(HashMap::new())),
            pending_requests,
        })
    }

    /// Initialize connection with the MCP server
    pub async fn initialize(&self) -> McpResult<ServerCapabilities> {
        if !self.transport_connected().await {
            return Err(McpError::custom("Transport not connected"));
        }

        {
            let session_state = self.mcp_session.read().await;
            match *session_state {
                McpSessionState::Ready => return Err(McpError::already_connected()),
                McpSessionState::Initializing => {
                    return Err(McpError::custom("Initialization already in progress"))
                }
                McpSessionState::Failed => return Err(McpError::custom("MCP session failed")),
                McpSessionState::NotInitialized => {}
            }
        }

        *self.mcp_session.write().await = McpSessionState::Initializing;

        let request = InitializeRequest::with_version(
            self.config.protocol_version.clone(),
            serde_json::to_value(&self.config.capabilities).map_err(|e| {
                McpError::invalid_request(format!("Failed to serialize capabilities: {e}"))
            })?,
            self.config.client_info.clone(),
        );

        let request_params = serde_json::to_value(&request).map_err(|e| {
            McpError::invalid_request(format!("Failed to serialize initialize request: {e}"))
        })?;

        let request_msg = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: methods::INITIALIZE.to_string(),
            params: Some(request_params),
            id: RequestId::new_string("init"),
        };

        let response = self.send_request(&request_msg).await?;

        let init_response: InitializeResponse =
            serde_json::from_value(response.result.ok_or_else(|| {
                McpError::invalid_response("Missing result in initialization response")
            })?)
            .map_err(|e| {
                McpError::invalid_response(format!("Invalid initialization response: {e}"))
            })?;

        let server_caps: ServerCapabilities = serde_json::from_value(init_response.capabilities)
            .map_err(|e| McpError::invalid_response(format!("Invalid server capabilities: {e}")))?;
        *self.server_capabilities.write().await = Some(server_caps.clone());

        *self.mcp_session.write().await = McpSessionState::Ready;

        Ok(server_caps)
    }

    /// Check if transport is connected
    pub async fn transport_connected(&self) -> bool {
        self.transport.read().await.is_connected()
    }

    /// Get current MCP session state
    pub async fn session_state(&self) -> McpSessionState {
        self.mcp_session.read().await.clone()
    }

    /// Check if client is ready for MCP operations
    pub async fn is_ready(&self) -> bool {
        self.transport_connected().await
            && matches!(self.session_state().await, McpSessionState::Ready)
    }

    /// Get server capabilities (available after initialization)
    pub async fn server_capabilities(&self) -> Option<ServerCapabilities> {
        self.server_capabilities.read().await.clone()
    }

    /// Ensure client is initialized, returning an error if not
    async fn ensure_initialized(&self) -> McpResult<()> {
        if !self.is_ready().await {
            return Err(McpError::NotConnected);
        }
        Ok(())
    }

    /// Check if server supports a specific capability
    pub async fn supports_capability(&self, check: impl Fn(&ServerCapabilities) -> bool) -> bool {
        if let Some(caps) = self.server_capabilities().await {
            check(&caps)
        } else {
            false
        }
    }

    /// List available tools from the server
    pub async fn list_tools(&self) -> McpResult<Vec<Tool>> {
        self.ensure_initialized().await?;

        if !self.supports_capability(|caps| caps.tools.is_some()).await {
            return Err(McpError::unsupported_capability("tools"));
        }

        let request = ListToolsRequest::new();
        let response = self.call_mcp(methods::TOOLS_LIST, &request).await?;

        let list_response: ListToolsResponse = serde_json::from_value(response)
            .map_err(|e| McpError::invalid_response(format!("Invalid list tools response: {e}")))?;

        {
            let mut cache = self.tool_cache.write().await;
            for tool in &list_response.tools {
                cache.insert(tool.name.clone(), tool.clone());
            }
        }

        Ok(list_response.tools)
    }

    /// Execute a tool with the given arguments
    pub async fn call_tool(
        &self,
        name: impl Into<String>,
        arguments: Option<Value>,
    ) -> McpResult<Vec<Content>> {
        self.ensure_initialized().await?;
        let name = name.into();

        let request = CallToolRequest::new(name.clone(), arguments.unwrap_or(Value::Null));
        let response = self.call_mcp(methods::TOOLS_CALL, &request).await?;

        let call_response: CallToolResponse = serde_json::from_value(response)
            .map_err(|e| McpError::invalid_response(format!("Invalid call tool response: {e}")))?;

        if call_response.is_error {
            let message = call_response
                .error_message
                .or_else(|| call_response.content.first().and_then(|c| c.as_text().map(str::to_string)))
                .unwrap_or_else(|| "Tool execution failed".to_string());
            return Err(McpError::tool_execution_failed(name, message));
        }

        Ok(call_response.content)
    }

    /// Close the connection to the server
    pub async fn close(&self) -> McpResult<()> {
        *self.mcp_session.write().await = McpSessionState::NotInitialized;

        let mut transport = self.transport.write().await;
        transport
            .close()
            .await
            .map_err(|e| McpError::custom(e.to_string()))?;
        Ok(())
    }

    /// Internal helper to send a JSON-RPC request and get response
    async fn send_request(&self, request: &JsonRpcRequest) -> McpResult<JsonRpcResponse> {
        let (sender, receiver) = oneshot::channel();

        let id_str = request.id.to_string();
        {
            let mut pending = self.pending_requests.lock().await;
            pending.insert(id_str.clone(), sender);
        }

        let mut transport = self.transport.write().await;
        let message = JsonRpcMessage::Request(request.clone());
        let send_result = transport.send(&message).await;
        drop(transport);

        if let Err(e) = send_result {
            self.pending_requests.lock().await.remove(&id_str);
            return Err(McpError::custom(format!("Failed to send request: {e}")));
        }

        let response = tokio::time::timeout(self.config.default_timeout, receiver)
            .await
            .map_err(|_| {
                // TimedOut: drop the now-stale slot so a late response can't match a new request.
                McpError::custom("Request timeout")
            })?
            .map_err(|_| McpError::custom("Request cancelled"))?;

        Ok(response)
    }

    /// Internal helper to make MCP method calls
    async fn call_mcp<P: serde::Serialize>(&self, method: &str, params: &P) -> McpResult<Value> {
        let params_value = serde_json::to_value(params)
            .map_err(|e| McpError::invalid_response(format!("Failed to serialize request: {e}")))?;

        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params: Some(params_value),
            id: RequestId::new_string(method),
        };

        let response = self.send_request(&request).await?;

        if let Some(error) = response.error {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(McpError::server_error(format!("RPC Error: {message}")));
        }

        Ok(response.result.unwrap_or(Value::Null))
    }
}

/// Lets an [`McpClient`] stand in for a local [`ToolProvider`] so the agent
/// driver can call tools through either a local registry or a remote MCP
/// server without caring which.
#[async_trait]
impl<T: Transport + 'static> crate::integration::server::ToolProvider for McpClient<T> {
    async fn list_tools(&self) -> McpResult<Vec<Tool>> {
        McpClient::list_tools(self).await
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<Vec<Content>> {
        McpClient::call_tool(self, name.to_string(), Some(arguments)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::adapters::stdio::StdioTransportBuilder;

    #[test]
    fn test_config_defaults() {
        let config = McpClientConfig::default();
        assert_eq!(config.client_info.name, defaults::CLIENT_NAME);
        assert_eq!(config.default_timeout, Duration::from_secs(30));
        assert!(config.auto_retry);
        assert_eq!(config.max_retries, 3);
        assert!(!config.auto_reconnect);
    }

    #[test]
    fn test_builder_pattern() {
        let builder = McpClientBuilder::new()
            .client_info("test-client", "1.0.0")
            .timeout(Duration::from_secs(60))
            .auto_retry(false, 0)
            .auto_reconnect(true);

        assert_eq!(builder.config.client_info.name, "test-client");
        assert_eq!(builder.config.client_info.version, "1.0.0");
        assert_eq!(builder.config.default_timeout, Duration::from_secs(60));
        assert!(!builder.config.auto_retry);
        assert_eq!(builder.config.max_retries, 0);
        assert!(builder.config.auto_reconnect);
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = McpClientBuilder::new()
            .client_info("test", "1.0")
            .build(StdioTransportBuilder::new())
            .await
            .unwrap();

        assert_eq!(
            client.session_state().await,
            McpSessionState::NotInitialized
        );
        assert!(!client.is_ready().await);
        assert!(client.server_capabilities().await.is_none());
    }

    #[tokio::test]
    async fn test_state_management() {
        let client = McpClient::new(StdioTransportBuilder::new()).await.unwrap();

        assert_eq!(
            client.session_state().await,
            McpSessionState::NotInitialized
        );
        assert!(!client.is_ready().await);

        let result = client.list_tools().await;
        assert!(matches!(result.unwrap_err(), McpError::NotConnected));
    }

    #[tokio::test]
    async fn test_capability_checking() {
        let client = McpClient::new(StdioTransportBuilder::new()).await.unwrap();

        let supports_tools = client.supports_capability(|caps| caps.tools.is_some()).await;
        assert!(!supports_tools);
    }
}
