//! Integration Layer Errors
//!
//! Error types for the high-level [`McpClient`](super::client::McpClient) and
//! [`McpServer`](super::server::McpServer) APIs, distinct from the lower-level
//! [`TransportError`] and wire-format [`ProtocolError`](crate::protocol::ProtocolError).

use thiserror::Error;

use crate::protocol::transport::TransportError;

/// Errors surfaced by the high-level MCP client/server integration layer.
#[derive(Error, Debug)]
pub enum McpError {
    /// The underlying transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// An operation was attempted before the MCP handshake completed.
    #[error("not connected")]
    NotConnected,

    /// `initialize` was called on a client already past the handshake.
    #[error("already connected")]
    AlreadyConnected,

    /// The peer does not advertise the capability required for this operation.
    #[error("unsupported capability: {capability}")]
    UnsupportedCapability { capability: String },

    /// `tools/call` named a tool the registry has no entry for.
    #[error("tool not found: {name}")]
    ToolNotFound { name: String },

    /// A tool ran but reported a domain-level failure.
    #[error("tool '{name}' failed: {message}")]
    ToolExecutionFailed { name: String, message: String },

    /// An outgoing request could not be constructed.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Request params failed validation against the method's expected shape.
    #[error("invalid params: {message}")]
    InvalidParams { message: String },

    /// A response did not match the shape expected for its method.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// The requested JSON-RPC method has no handler.
    #[error("method not found: {method}")]
    MethodNotFound { method: String },

    /// Authentication failed for the current request/session.
    #[error("authentication failed: {reason}")]
    Authentication { reason: String },

    /// The peer returned a JSON-RPC error object.
    #[error("{message}")]
    ServerError { message: String },

    /// Catch-all for failures that don't fit a more specific variant.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl McpError {
    /// Generic escape hatch for ad-hoc failure messages.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn already_connected() -> Self {
        Self::AlreadyConnected
    }

    pub fn unsupported_capability(capability: impl Into<String>) -> Self {
        Self::UnsupportedCapability {
            capability: capability.into(),
        }
    }

    pub fn tool_not_found(name: impl Into<String>) -> Self {
        Self::ToolNotFound { name: name.into() }
    }

    pub fn tool_execution_failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecutionFailed {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::MethodNotFound {
            method: method.into(),
        }
    }

    pub fn authentication(reason: impl Into<String>) -> Self {
        Self::Authentication {
            reason: reason.into(),
        }
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::ServerError {
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Convenient result type for integration-layer operations.
pub type McpResult<T> = Result<T, McpError>;

/// Lower-level error for integration-layer plumbing that isn't MCP-specific
/// (e.g. connection bookkeeping shared by client and server).
#[derive(Error, Debug)]
pub enum IntegrationError {
    /// Wraps an [`McpError`] for call sites that operate above the MCP layer.
    #[error(transparent)]
    Mcp(#[from] McpError),

    /// Wraps a raw [`TransportError`].
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Convenient result type for integration-layer plumbing.
pub type IntegrationResult<T> = Result<T, IntegrationError>;
