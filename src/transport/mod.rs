//! Transport Abstraction Layer
//!
//! This module hosts concrete wire-protocol transports (see `adapters`) plus
//! supporting buffer management and transport-local error types. The
//! governing `Transport`/`TransportBuilder`/`MessageHandler` traits live in
//! [`crate::protocol::transport`]; this module provides implementations of
//! them.
//!
//! # Buffer Management
//!
//! - **Buffer Pooling**: Reusable buffer allocation to minimize GC pressure
//! - **Zero-Copy Operations**: Avoid unnecessary data copying where possible
//! - **Streaming Support**: Efficient handling of partial reads and writes
//!
//! ```rust
//! use mcp_core::transport::buffer::{BufferManager, BufferConfig};
//!
//! async fn buffer_example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BufferConfig::default();
//!     let buffer_manager = BufferManager::new(config);
//!
//!     let mut buffer = buffer_manager.acquire_read_buffer().await?;
//!     // Use buffer for I/O operations...
//!     // Buffer automatically returns to pool when dropped
//!     Ok(())
//! }
//! ```
//!
//! # Transports
//!
//! - **stdio** (see `adapters::stdio`) — newline-delimited JSON over
//!   stdin/stdout.
//! - **http** (see `http`) — Server-Sent Events over HTTP, plus the
//!   connection manager that fronts it.

pub mod adapters;
pub mod buffer;
pub mod error;
pub mod http;

pub use buffer::{BufferConfig, BufferManager, BufferMetrics, PooledBuffer, StreamingBuffer};
pub use error::TransportError;
pub use http::{
    HttpConnectionManager, SseClientTransport, SseClientTransportBuilder, SseServerTransport,
    SseServerTransportBuilder,
};
