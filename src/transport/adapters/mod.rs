//! Transport Adapters
//!
//! Concrete `Transport`/`TransportBuilder` implementations for specific wire
//! protocols. Each adapter follows the pre-configured transport pattern
//! (ADR-011): a `*Builder` attaches the `MessageHandler` and produces a
//! ready-to-start transport from `build()`.
//!
//! ## Available Adapters
//!
//! - **stdio**: newline-delimited JSON over stdin/stdout.

pub mod stdio;

pub use stdio::{StdioTransport, StdioTransportBuilder};
