//! Integration Layer - High-Level MCP Client and Server APIs
//!
//! This module provides the high-level, trait-based MCP client and server that
//! application code is expected to use directly, wiring the wire-level
//! `protocol` types onto a concrete `Transport`.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use mcp_core::integration::{McpClientBuilder, McpServerBuilder};
//! use mcp_core::providers::MathToolProvider;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let server = McpServerBuilder::new()
//!     .server_info("mcp-core-server", "0.1.0")
//!     .with_tool_provider(Arc::new(MathToolProvider::new()))
//!     .build();
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod constants;
pub mod error;
pub mod server;

pub use client::{McpClient, McpClientBuilder, McpClientConfig, McpSessionState};
pub use error::{IntegrationError, IntegrationResult, McpError, McpResult};
pub use server::{McpCoreConfig, McpServer, McpServerBuilder, McpServerConfig, ToolProvider};
