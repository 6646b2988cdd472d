//! High-level MCP Server API
//!
//! This module provides a high-level, trait-based MCP server that wires a transport's
//! request/notification events to the built-in MCP dispatch (`initialize`, `tools/list`,
//! `tools/call`) plus any handlers registered through a [`McpServerBuilder`].
//!
//! Prompt and resource management are reserved protocol slots but are not dispatched
//! here; a conforming core only needs tool registration and invocation.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};

use super::constants::{defaults, error_codes, methods};
use super::error::{McpError, McpResult};
use crate::protocol::transport::{MessageContext, MessageHandler, Transport, TransportError};
use crate::protocol::{
    CallToolRequest, CallToolResponse, ClientCapabilities, Content, InitializeRequest,
    InitializeResponse, JsonRpcMessage, JsonRpcRequest, JsonRpcResponse, ListToolsResponse,
    ProtocolVersion, ServerCapabilities, ServerInfo, Tool, ToolCapabilities,
};

/// Trait for providing MCP tool functionality to a server.
///
/// This mirrors [`crate::providers::ToolProvider`]; servers depend on the trait
/// object here to avoid a circular module dependency on `providers`.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// List all available tools, in registration order.
    async fn list_tools(&self) -> McpResult<Vec<Tool>>;

    /// Execute the named tool with the given arguments.
    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<Vec<Content>>;
}

/// Message handler that bridges a transport's events to the MCP dispatch table.
///
/// Transports are built with their handler pre-attached (the [`TransportBuilder`]
/// pattern, see `protocol::transport`), so a server hands out this handler via
/// [`McpServer::handler`] *before* the transport is constructed rather than
/// mutating an already-running transport.
///
/// [`TransportBuilder`]: crate::protocol::transport::TransportBuilder
struct ServerMessageHandler {
    config: McpServerConfig,
    client_capabilities: Arc<RwLock<Option<ClientCapabilities>>>,
    tool_provider: Option<Arc<dyn ToolProvider>>,
    initialized: Arc<RwLock<bool>>,
}

#[async_trait]
impl MessageHandler for ServerMessageHandler {
    async fn handle_message(&self, message: JsonRpcMessage, _context: MessageContext) {
        match message {
            JsonRpcMessage::Request(request) => {
                let response = McpServer::handle_request_static(
                    &request,
                    &self.config,
                    &self.client_capabilities,
                    &self.tool_provider,
                    &self.initialized,
                )
                .await;
                debug!(method = %request.method, "handled request");
                let _ = response;
            }
            JsonRpcMessage::Notification(notification) => {
                if notification.method == methods::INITIALIZED {
                    *self.initialized.write().await = true;
                    info!("client signalled initialized");
                }
            }
            JsonRpcMessage::Response(_) => {
                // Servers do not originate requests in this core; ignore stray responses.
            }
        }
    }

    async fn handle_error(&self, error: TransportError) {
        error!(%error, "transport error");
    }

    async fn handle_close(&self) {
        info!("transport closed");
    }
}

/// Core MCP configuration shared by every transport.
#[derive(Debug, Clone)]
pub struct McpCoreConfig {
    pub server_info: ServerInfo,
    pub capabilities: ServerCapabilities,
    pub protocol_version: ProtocolVersion,
    pub instructions: Option<String>,
}

impl Default for McpCoreConfig {
    fn default() -> Self {
        Self {
            server_info: ServerInfo {
                name: defaults::SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            capabilities: ServerCapabilities::default(),
            protocol_version: ProtocolVersion::current(),
            instructions: None,
        }
    }
}

/// Full server configuration, including operational flags.
#[derive(Debug, Clone, Default)]
pub struct McpServerConfig {
    pub core: McpCoreConfig,
    pub strict_validation: bool,
    pub log_operations: bool,
}

/// Builder for [`McpServer`].
#[derive(Default)]
pub struct McpServerBuilder {
    config: McpServerConfig,
    tool_provider: Option<Arc<dyn ToolProvider>>,
}

impl McpServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server_info(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.config.core.server_info = ServerInfo {
            name: name.into(),
            version: version.into(),
        };
        self
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.config.core.instructions = Some(instructions.into());
        self
    }

    pub fn strict_validation(mut self, strict: bool) -> Self {
        self.config.strict_validation = strict;
        self
    }

    pub fn log_operations(mut self, log: bool) -> Self {
        self.config.log_operations = log;
        self
    }

    pub fn with_tool_provider(mut self, provider: Arc<dyn ToolProvider>) -> Self {
        self.tool_provider = Some(provider);
        self
    }

    /// Build the server. Capabilities are auto-detected from whichever
    /// providers were registered.
    ///
    /// The returned server is not yet bound to a transport: call
    /// [`McpServer::handler`] to obtain the [`MessageHandler`] to attach via
    /// a [`TransportBuilder`][crate::protocol::transport::TransportBuilder], then
    /// pass the resulting transport to [`McpServer::run`].
    pub fn build(mut self) -> McpServer {
        if self.tool_provider.is_some() {
            self.config.core.capabilities.tools = Some(ToolCapabilities::default());
        }

        McpServer {
            config: self.config,
            client_capabilities: Arc::new(RwLock::new(None)),
            tool_provider: self.tool_provider,
            initialized: Arc::new(RwLock::new(false)),
        }
    }
}

/// High-level MCP server, transport-agnostic until [`run`](McpServer::run) is called.
pub struct McpServer {
    config: McpServerConfig,
    client_capabilities: Arc<RwLock<Option<ClientCapabilities>>>,
    tool_provider: Option<Arc<dyn ToolProvider>>,
    initialized: Arc<RwLock<bool>>,
}

impl McpServer {
    /// Build the message handler that drives this server's dispatch table.
    ///
    /// Attach it to a transport via `TransportBuilder::with_message_handler`
    /// before calling [`run`](Self::run).
    pub fn handler(&self) -> Arc<dyn MessageHandler> {
        Arc::new(ServerMessageHandler {
            config: self.config.clone(),
            client_capabilities: self.client_capabilities.clone(),
            tool_provider: self.tool_provider.clone(),
            initialized: self.initialized.clone(),
        })
    }

    /// Start a transport that was already built with [`handler`](Self::handler) attached.
    #[instrument(skip(self, transport))]
    pub async fn run<T: Transport>(&self, mut transport: T) -> McpResult<()> {
        transport
            .start()
            .await
            .map_err(|e| McpError::internal_error(e.to_string()))?;
        Ok(())
    }

    /// Dispatch a single JSON-RPC request to the built-in MCP methods.
    pub async fn handle_request(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        Self::handle_request_static(
            request,
            &self.config,
            &self.client_capabilities,
            &self.tool_provider,
            &self.initialized,
        )
        .await
    }

    async fn handle_request_static(
        request: &JsonRpcRequest,
        config: &McpServerConfig,
        client_capabilities: &Arc<RwLock<Option<ClientCapabilities>>>,
        tool_provider: &Option<Arc<dyn ToolProvider>>,
        initialized: &Arc<RwLock<bool>>,
    ) -> JsonRpcResponse {
        let result = match request.method.as_str() {
            methods::INITIALIZE => {
                Self::handle_initialize(request, config, client_capabilities, initialized).await
            }
            methods::TOOLS_LIST => Self::handle_list_tools(tool_provider).await,
            methods::TOOLS_CALL => Self::handle_call_tool(request, tool_provider).await,
            "ping" => Ok(Value::Null),
            other => Err(McpError::method_not_found(other)),
        };

        match result {
            Ok(value) => JsonRpcResponse::success(value, request.id.clone()),
            Err(error) => {
                let code = Self::error_code(&error);
                JsonRpcResponse::error(
                    serde_json::json!({"code": code, "message": error.to_string()}),
                    Some(request.id.clone()),
                )
            }
        }
    }

    fn error_code(error: &McpError) -> i32 {
        match error {
            McpError::NotConnected => error_codes::INVALID_REQUEST,
            McpError::UnsupportedCapability { .. } => error_codes::METHOD_NOT_FOUND,
            McpError::ToolNotFound { .. } => error_codes::METHOD_NOT_FOUND,
            McpError::MethodNotFound { .. } => error_codes::METHOD_NOT_FOUND,
            McpError::InvalidParams { .. } => error_codes::INVALID_PARAMS,
            McpError::Authentication { .. } => error_codes::INVALID_REQUEST,
            McpError::Transport(_) => error_codes::INTERNAL_ERROR,
            _ => error_codes::INTERNAL_ERROR,
        }
    }

    async fn handle_initialize(
        request: &JsonRpcRequest,
        config: &McpServerConfig,
        client_capabilities: &Arc<RwLock<Option<ClientCapabilities>>>,
        initialized: &Arc<RwLock<bool>>,
    ) -> McpResult<Value> {
        let params = request
            .params
            .clone()
            .ok_or_else(|| McpError::invalid_params("initialize requires params"))?;
        let init_request: InitializeRequest = serde_json::from_value(params)
            .map_err(|e| McpError::invalid_params(format!("invalid initialize params: {e}")))?;

        *client_capabilities.write().await = Some(init_request.capabilities_as()?);

        let capabilities_json = serde_json::to_value(&config.core.capabilities)
            .map_err(|e| McpError::internal_error(e.to_string()))?;

        let response = InitializeResponse::new(
            capabilities_json,
            config.core.server_info.clone(),
            config.core.instructions.clone(),
        );

        *initialized.write().await = true;

        serde_json::to_value(response).map_err(|e| McpError::internal_error(e.to_string()))
    }

    async fn handle_list_tools(tool_provider: &Option<Arc<dyn ToolProvider>>) -> McpResult<Value> {
        let provider = tool_provider
            .as_ref()
            .ok_or_else(|| McpError::unsupported_capability("tools"))?;
        let tools = provider.list_tools().await?;
        serde_json::to_value(ListToolsResponse { tools })
            .map_err(|e| McpError::internal_error(e.to_string()))
    }

    async fn handle_call_tool(
        request: &JsonRpcRequest,
        tool_provider: &Option<Arc<dyn ToolProvider>>,
    ) -> McpResult<Value> {
        let provider = tool_provider
            .as_ref()
            .ok_or_else(|| McpError::unsupported_capability("tools"))?;

        let params = request.params.clone().unwrap_or(Value::Null);
        let call_request: CallToolRequest = serde_json::from_value(params)
            .map_err(|e| McpError::invalid_params(format!("invalid tools/call params: {e}")))?;

        let response = match provider
            .call_tool(&call_request.name, call_request.arguments)
            .await
        {
            Ok(content) => CallToolResponse::success(content),
            Err(McpError::ToolNotFound { name }) => {
                return Err(McpError::method_not_found(format!("Unknown tool: {name}")))
            }
            Err(domain_error @ McpError::InvalidParams { .. }) => return Err(domain_error),
            Err(McpError::ToolExecutionFailed { message, .. }) => {
                CallToolResponse::error_text(message)
            }
            Err(other) => CallToolResponse::error_text(other.to_string()),
        };

        serde_json::to_value(response).map_err(|e| McpError::internal_error(e.to_string()))
    }
}

// Helper: pull typed ClientCapabilities out of the raw `capabilities` JSON value
// sent on `initialize`.
trait InitializeRequestExt {
    fn capabilities_as(&self) -> McpResult<ClientCapabilities>;
}

impl InitializeRequestExt for InitializeRequest {
    fn capabilities_as(&self) -> McpResult<ClientCapabilities> {
        serde_json::from_value(self.capabilities.clone())
            .map_err(|e| McpError::invalid_params(format!("invalid capabilities: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::RequestId;

    struct EchoToolProvider;

    #[async_trait]
    impl ToolProvider for EchoToolProvider {
        async fn list_tools(&self) -> McpResult<Vec<Tool>> {
            Ok(vec![Tool {
                name: "echo".to_string(),
                description: Some("echoes input".to_string()),
                input_schema: serde_json::json!({"type": "object"}),
            }])
        }

        async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<Vec<Content>> {
            if name != "echo" {
                return Err(McpError::tool_not_found(name));
            }
            Ok(vec![Content::text(arguments.to_string())])
        }
    }

    fn test_config() -> McpServerConfig {
        McpServerConfig::default()
    }

    #[tokio::test]
    async fn initialize_lifecycle_sets_initialized() {
        let config = test_config();
        let client_capabilities = Arc::new(RwLock::new(None));
        let initialized = Arc::new(RwLock::new(false));

        let request = JsonRpcRequest::new(
            methods::INITIALIZE,
            Some(serde_json::json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "t", "version": "0"}
            })),
            RequestId::new_string("1"),
        );

        let response = McpServer::handle_request_static(
            &request,
            &config,
            &client_capabilities,
            &None,
            &initialized,
        )
        .await;

        assert!(response.error.is_none());
        assert!(*initialized.read().await);
    }

    #[tokio::test]
    async fn tools_list_without_provider_errors() {
        let config = test_config();
        let request = JsonRpcRequest::new(methods::TOOLS_LIST, None, RequestId::new_number(1));
        let response = McpServer::handle_request_static(
            &request,
            &config,
            &Arc::new(RwLock::new(None)),
            &None,
            &Arc::new(RwLock::new(false)),
        )
        .await;
        assert!(response.error.is_some());
    }

    #[tokio::test]
    async fn unknown_tool_maps_to_method_not_found() {
        let config = test_config();
        let provider: Arc<dyn ToolProvider> = Arc::new(EchoToolProvider);
        let request = JsonRpcRequest::new(
            methods::TOOLS_CALL,
            Some(serde_json::json!({"name": "nope", "arguments": {}})),
            RequestId::new_number(2),
        );
        let response = McpServer::handle_request_static(
            &request,
            &config,
            &Arc::new(RwLock::new(None)),
            &Some(provider),
            &Arc::new(RwLock::new(false)),
        )
        .await;
        let error = response.error.unwrap();
        assert_eq!(error["code"], error_codes::METHOD_NOT_FOUND);
    }
}
