//! HTTP/SSE Transport
//!
//! Server-Sent Events carry JSON-RPC responses from server to client over a
//! long-lived `GET /sse` connection; requests travel the other way as plain
//! `POST /messages?sessionId=<sid>` bodies, acknowledged with `202 Accepted`.
//!
//! - [`session`] — per-connection [`SseServerTransport`], the event-emitting
//!   half bound into an axum SSE response.
//! - [`client`] — [`SseClientTransport`], the consuming half used by an MCP
//!   client talking to a remote server.
//! - [`manager`] — [`HttpConnectionManager`], the `sessionId -> transport`
//!   registry and the two HTTP handlers a host mounts into its router.

pub mod client;
pub mod manager;
pub mod session;

pub use client::{SseClientTransport, SseClientTransportBuilder};
pub use manager::HttpConnectionManager;
pub use session::{SseServerTransport, SseServerTransportBuilder};
