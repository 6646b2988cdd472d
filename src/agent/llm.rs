//! LLM client contract consumed by the chat-loop driver.
//!
//! Vendor specifics (OpenAI/Anthropic HTTP clients) are external collaborators;
//! this trait is the only seam the driver depends on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::integration::McpResult;

/// Role of one chat message, mirroring the wire shape in spec §4.7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool invocation requested by the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// The outcome of executing one [`ToolCall`], fed back to the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub id: String,
    pub name: String,
    pub result: Value,
}

impl ToolCallResult {
    pub fn success(id: impl Into<String>, name: impl Into<String>, result: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            result,
        }
    }

    pub fn error(id: impl Into<String>, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            result: serde_json::json!({ "Error": message.into() }),
        }
    }
}

/// One response turn from the LLM. A single `sendUserMessage` call may
/// produce several of these, interleaving assistant text with tool requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    #[serde(rename = "type")]
    pub kind: MessageRole,
    pub content: String,
    #[serde(rename = "toolCalls", default)]
    pub tool_calls: Vec<ToolCall>,
}

impl LlmResponse {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            kind: MessageRole::Assistant,
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_request(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            kind: MessageRole::Tool,
            content: String::new(),
            tool_calls,
        }
    }
}

/// The contract the chat-loop driver needs from an LLM-backed conversation.
///
/// Implementations own whatever provider-specific history/context the
/// underlying model needs; the driver only ever sees response batches.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn send_user_message(&self, text: &str) -> McpResult<Vec<LlmResponse>>;
    async fn send_tool_results(&self, results: Vec<ToolCallResult>) -> McpResult<Vec<LlmResponse>>;
}
