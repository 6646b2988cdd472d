//! Agentic chat-loop driver: LLM client contract, persisted agent
//! definitions, and the session state machine that ties them to an MCP
//! tool provider (spec §3, §4.7, §6).

pub mod definition;
pub mod llm;
pub mod session;

pub use definition::{AgentDefinition, AgentStore};
pub use llm::{LlmClient, LlmResponse, MessageRole, ToolCall, ToolCallResult};
pub use session::{ChatSession, ChatSessionEvent, ThinkingContext, ToolExecutionState};
