//! The agentic chat-loop driver (spec §4.7).
//!
//! A [`ChatSession`] interleaves LLM requests, tool execution via an MCP
//! client, result feedback, and event emission, with thinking-state
//! signaling around every LLM round-trip.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::{mpsc, RwLock};
use tracing::{instrument, warn};

use crate::integration::{McpResult, ToolProvider};

use super::definition::AgentDefinition;
use super::llm::{LlmClient, LlmResponse, MessageRole, ToolCall, ToolCallResult};

/// Context label threaded through [`ChatSessionEvent::ThinkingStateChanged`].
/// The driver only ever brackets the LLM round-trip itself.
pub const THINKING_CONTEXT: ThinkingContext = ThinkingContext::Thinking;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThinkingContext {
    Thinking,
}

impl ThinkingContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThinkingContext::Thinking => "thinking",
        }
    }
}

/// Lifecycle of one tool call within a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolExecutionState {
    Starting,
    Completed,
    Failed,
}

/// Everything a host application can observe about a running session.
#[derive(Debug, Clone)]
pub enum ChatSessionEvent {
    SessionStarted,
    UserMessageReceived(String),
    AssistantMessageReceived(String),
    ToolExecutionUpdated {
        tool_name: String,
        state: ToolExecutionState,
        error: Option<String>,
        tool_call_id: Option<String>,
    },
    ThinkingStateChanged {
        is_thinking: bool,
        context: ThinkingContext,
        session_id: Option<String>,
    },
}

/// A single-conversation driver. Owns an LLM client, an MCP client (used for
/// `tools/call`), and an optional [`AgentDefinition`]; holds no mutable state
/// beyond timestamps and whatever history the LLM client itself tracks.
pub struct ChatSession {
    id: String,
    agent: Option<AgentDefinition>,
    created_at: DateTime<Utc>,
    last_activity_at: RwLock<DateTime<Utc>>,
    llm_client: Arc<dyn LlmClient>,
    mcp_client: Arc<dyn ToolProvider>,
    known_tools: RwLock<HashSet<String>>,
    events: mpsc::UnboundedSender<ChatSessionEvent>,
}

impl ChatSession {
    /// Build a session and its event receiver. The receiver end is handed to
    /// whatever host surface renders `ChatSessionEvent`s (terminal UI,
    /// SignalR adapter, ...) — out of scope here.
    pub fn new(
        id: impl Into<String>,
        agent: Option<AgentDefinition>,
        llm_client: Arc<dyn LlmClient>,
        mcp_client: Arc<dyn ToolProvider>,
    ) -> (Self, mpsc::UnboundedReceiver<ChatSessionEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let now = Utc::now();
        let session = Self {
            id: id.into(),
            agent,
            created_at: now,
            last_activity_at: RwLock::new(now),
            llm_client,
            mcp_client,
            known_tools: RwLock::new(HashSet::new()),
            events,
        };
        session.emit(ChatSessionEvent::SessionStarted);
        (session, receiver)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn agent(&self) -> Option<&AgentDefinition> {
        self.agent.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub async fn last_activity_at(&self) -> DateTime<Utc> {
        *self.last_activity_at.read().await
    }

    /// Refresh the set of tool names known to be callable, so
    /// `sendUserMessage` can distinguish "unknown tool" from a genuine
    /// execution failure without making a round trip per call.
    pub async fn refresh_known_tools(&self) -> McpResult<()> {
        let tools = self.mcp_client.list_tools().await?;
        let mut known = self.known_tools.write().await;
        known.clear();
        known.extend(tools.into_iter().map(|tool| tool.name));
        Ok(())
    }

    fn emit(&self, event: ChatSessionEvent) {
        // The receiver may have been dropped by a host that stopped
        // listening; that is not this driver's problem.
        let _ = self.events.send(event);
    }

    /// Brackets one LLM round-trip with `ThinkingStateChanged` events. Any
    /// assistant-authored messages in the response are emitted before
    /// thinking is reported as stopped, so a host observing the event stream
    /// sees the message while thinking is still flagged true.
    async fn think<F, Fut>(&self, op: F) -> McpResult<Vec<LlmResponse>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = McpResult<Vec<LlmResponse>>>,
    {
        self.emit(ChatSessionEvent::ThinkingStateChanged {
            is_thinking: true,
            context: THINKING_CONTEXT,
            session_id: Some(self.id.clone()),
        });
        let result = op().await;
        if let Ok(batch) = &result {
            for response in batch {
                if response.kind == MessageRole::Assistant {
                    self.emit(ChatSessionEvent::AssistantMessageReceived(response.content.clone()));
                }
            }
        }
        self.emit(ChatSessionEvent::ThinkingStateChanged {
            is_thinking: false,
            context: THINKING_CONTEXT,
            session_id: Some(self.id.clone()),
        });
        result
    }

    /// Drive one user turn to completion: send the message, execute any
    /// requested tools serially in LLM order, feed results back, and repeat
    /// until the LLM stops requesting tools (spec §4.7 state machine).
    #[instrument(level = "debug", skip(self, text), fields(session_id = %self.id))]
    pub async fn send_user_message(&self, text: &str) -> McpResult<()> {
        *self.last_activity_at.write().await = Utc::now();
        self.emit(ChatSessionEvent::UserMessageReceived(text.to_string()));

        let text_owned = text.to_string();
        let mut queue: Vec<LlmResponse> = self
            .think(|| {
                let llm = self.llm_client.clone();
                async move { llm.send_user_message(&text_owned).await }
            })
            .await?;

        while !queue.is_empty() {
            let batch = std::mem::take(&mut queue);

            let tool_calls: Vec<ToolCall> = batch
                .into_iter()
                .filter(|response| response.kind == MessageRole::Tool)
                .flat_map(|response| response.tool_calls)
                .collect();

            if tool_calls.is_empty() {
                break;
            }

            let mut results = Vec::with_capacity(tool_calls.len());
            for call in tool_calls {
                results.push(self.execute_tool_call(call).await);
            }

            let results_for_llm = results.clone();
            queue = self
                .think(|| {
                    let llm = self.llm_client.clone();
                    async move { llm.send_tool_results(results_for_llm).await }
                })
                .await?;
        }

        *self.last_activity_at.write().await = Utc::now();
        Ok(())
    }

    /// Execute one tool call, always resolving to a [`ToolCallResult`] (never
    /// propagating the failure) so the turn's loop can continue.
    async fn execute_tool_call(&self, call: ToolCall) -> ToolCallResult {
        {
            let known = self.known_tools.read().await;
            if !known.is_empty() && !known.contains(&call.name) {
                self.emit(ChatSessionEvent::ToolExecutionUpdated {
                    tool_name: call.name.clone(),
                    state: ToolExecutionState::Failed,
                    error: Some("Tool not found".to_string()),
                    tool_call_id: Some(call.id.clone()),
                });
                return ToolCallResult::error(call.id, call.name, "Tool not found");
            }
        }

        self.emit(ChatSessionEvent::ToolExecutionUpdated {
            tool_name: call.name.clone(),
            state: ToolExecutionState::Starting,
            error: None,
            tool_call_id: Some(call.id.clone()),
        });

        match self.mcp_client.call_tool(&call.name, call.arguments.clone()).await {
            Ok(content) => {
                self.emit(ChatSessionEvent::ToolExecutionUpdated {
                    tool_name: call.name.clone(),
                    state: ToolExecutionState::Completed,
                    error: None,
                    tool_call_id: Some(call.id.clone()),
                });
                ToolCallResult::success(call.id, call.name, content_to_value(&content))
            }
            Err(err) => {
                warn!(tool = %call.name, error = %err, "tool execution failed");
                self.emit(ChatSessionEvent::ToolExecutionUpdated {
                    tool_name: call.name.clone(),
                    state: ToolExecutionState::Failed,
                    error: Some(err.to_string()),
                    tool_call_id: Some(call.id.clone()),
                });
                ToolCallResult::error(call.id, call.name, err.to_string())
            }
        }
    }
}

fn content_to_value(content: &[crate::protocol::Content]) -> Value {
    if let [crate::protocol::Content::Text { text, .. }] = content {
        if let Ok(parsed) = serde_json::from_str(text) {
            return parsed;
        }
        return Value::String(text.clone());
    }
    serde_json::to_value(content).unwrap_or(Value::Null)
}
