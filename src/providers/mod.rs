//! Production-ready MCP Provider Implementations
//!
//! This module provides reference implementations of the [`ToolProvider`] contract
//! (see [`crate::integration::server::ToolProvider`]) that a server can register for
//! `tools/list` and `tools/call` dispatch.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use mcp_core::providers::MathToolProvider;
//! use mcp_core::integration::McpServerBuilder;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let server = McpServerBuilder::new()
//!     .server_info("production-server", "1.0.0")
//!     .with_tool_provider(Arc::new(MathToolProvider::new()))
//!     .build();
//! # Ok(())
//! # }
//! ```

pub mod tool;

pub use tool::{MathToolProvider, SystemToolProvider, TextToolProvider};
