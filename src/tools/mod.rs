//! Tool registry and reflective tool definition.
//!
//! In place of scanning annotated handler signatures at runtime, tools are
//! declared with explicit builder calls (spec Design Notes): [`schema::ParamType`]
//! describes a parameter's shape, [`registry::ToolBuilder`] assembles a tool
//! from a name, its parameters, and a handler, and [`registry::ToolRegistry`]
//! collects definitions into something that implements
//! [`ToolProvider`](crate::integration::ToolProvider) directly.

pub mod registry;
pub mod schema;

pub use registry::{ToolBuilder, ToolDefinition, ToolHandlerError, ToolOutcome, ToolRegistry};
pub use schema::ParamType;
