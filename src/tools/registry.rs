//! Explicit-builder-call tool registry.
//!
//! Replaces reflective "scan for annotated methods" tool discovery with
//! direct builder calls: `ToolBuilder::new("add", "...").param("a",
//! ParamType::Number).required().handle(...)`. A [`ToolRegistry`] collects
//! these definitions and implements [`ToolProvider`](crate::integration::ToolProvider)
//! so it can be handed straight to an [`McpServerBuilder`](crate::integration::McpServerBuilder).

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::integration::{McpError, McpResult, ToolProvider};
use crate::protocol::{CallToolResponse, Content, Tool};

use super::schema::ParamType;

/// What a tool handler produced, before it is folded into a `tools/call`
/// response.
pub enum ToolOutcome {
    /// A fully-formed result, forwarded as-is (its `is_error` flag controls
    /// whether the wire response carries an error payload).
    Response(CallToolResponse),
    /// An arbitrary value; serialized as indented JSON (or its natural string
    /// form if a primitive) and wrapped as a single text content part.
    Value(Value),
}

impl ToolOutcome {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Response(CallToolResponse::success(vec![Content::text(text.into())]))
    }
}

/// A handler-raised failure. `Domain` surfaces as a JSON-RPC error via
/// [`McpError`]; `Other` is rendered as an `isError: true` tool result instead
/// of aborting the RPC, mirroring a non-domain exception.
pub enum ToolHandlerError {
    Domain(McpError),
    Other(String),
}

impl From<McpError> for ToolHandlerError {
    fn from(err: McpError) -> Self {
        Self::Domain(err)
    }
}

type HandlerFn = dyn Fn(HashMap<String, Value>) -> BoxFuture<'static, Result<ToolOutcome, ToolHandlerError>>
    + Send
    + Sync;

struct ParamSpec {
    name: String,
    param_type: ParamType,
    required: bool,
    description: Option<String>,
    default: Option<Value>,
}

/// A fully built tool: its schema plus the handler that executes it.
pub struct ToolDefinition {
    name: String,
    description: String,
    params: Vec<ParamSpec>,
    handler: Arc<HandlerFn>,
}

impl ToolDefinition {
    fn descriptor(&self) -> Tool {
        let properties: serde_json::Map<String, Value> = self
            .params
            .iter()
            .map(|param| {
                let mut schema = param.param_type.to_json_schema();
                if let (Some(description), Value::Object(map)) = (&param.description, &mut schema) {
                    map.insert("description".to_string(), Value::String(description.clone()));
                }
                if let (Some(default), Value::Object(map)) = (&param.default, &mut schema) {
                    map.insert("default".to_string(), default.clone());
                }
                (param.name.clone(), schema)
            })
            .collect();

        let required: Vec<Value> = self
            .params
            .iter()
            .filter(|param| param.required)
            .map(|param| Value::String(param.name.clone()))
            .collect();

        Tool {
            name: self.name.clone(),
            description: Some(self.description.clone()),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        }
    }

    /// Resolve raw `tools/call` arguments into the handler's parameter map,
    /// enforcing required-ness, defaults, and type conversion (spec §4.5).
    fn resolve_arguments(&self, arguments: &Value) -> McpResult<HashMap<String, Value>> {
        let empty = serde_json::Map::new();
        let object = arguments.as_object().unwrap_or(&empty);
        let lowercase: HashMap<String, &Value> = object
            .iter()
            .map(|(key, value)| (key.to_lowercase(), value))
            .collect();

        let mut resolved = HashMap::new();
        for param in &self.params {
            let key = param.name.to_lowercase();
            match lowercase.get(&key) {
                Some(value) => {
                    if !param.param_type.accepts(value) {
                        return Err(McpError::invalid_params(format!(
                            "Parameter '{}' has the wrong type",
                            param.name
                        )));
                    }
                    resolved.insert(param.name.clone(), (*value).clone());
                }
                None => {
                    if let Some(default) = &param.default {
                        resolved.insert(param.name.clone(), default.clone());
                    } else if param.required {
                        return Err(McpError::invalid_params(format!(
                            "Required parameter '{}' was not provided",
                            param.name
                        )));
                    }
                }
            }
        }
        Ok(resolved)
    }
}

/// Builder for one [`ToolDefinition`].
pub struct ToolBuilder {
    name: String,
    description: String,
    params: Vec<ParamSpec>,
}

impl ToolBuilder {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
        }
    }

    /// Declare a parameter. Optional by default; chain [`required`](Self::required)
    /// to mark it mandatory.
    pub fn param(mut self, name: impl Into<String>, param_type: ParamType) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            param_type,
            required: false,
            description: None,
            default: None,
        });
        self
    }

    /// Mark the most recently added parameter as required.
    pub fn required(mut self) -> Self {
        if let Some(last) = self.params.last_mut() {
            last.required = true;
        }
        self
    }

    /// Attach a human-readable description to the most recently added parameter.
    pub fn param_description(mut self, description: impl Into<String>) -> Self {
        if let Some(last) = self.params.last_mut() {
            last.description = Some(description.into());
        }
        self
    }

    /// Give the most recently added parameter a default, implicitly making it
    /// optional regardless of [`required`](Self::required).
    pub fn default_value(mut self, value: Value) -> Self {
        if let Some(last) = self.params.last_mut() {
            last.default = Some(value);
            last.required = false;
        }
        self
    }

    /// Finish the tool, binding its handler.
    pub fn handle<F, Fut>(self, handler: F) -> ToolDefinition
    where
        F: Fn(HashMap<String, Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolOutcome, ToolHandlerError>> + Send + 'static,
    {
        ToolDefinition {
            name: self.name,
            description: self.description,
            params: self.params,
            handler: Arc::new(move |args| Box::pin(handler(args))),
        }
    }
}

/// Registry of tools built via [`ToolBuilder`]. Preserves registration order
/// for `tools/list`, and implements [`ToolProvider`] directly.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn register(&mut self, definition: ToolDefinition) -> &mut Self {
        self.tools.push(definition);
        self
    }

    pub fn with(mut self, definition: ToolDefinition) -> Self {
        self.register(definition);
        self
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    fn find(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name == name)
    }
}

#[async_trait]
impl ToolProvider for ToolRegistry {
    async fn list_tools(&self) -> McpResult<Vec<Tool>> {
        Ok(self.tools.iter().map(ToolDefinition::descriptor).collect())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<Vec<Content>> {
        let definition = self.find(name).ok_or_else(|| McpError::tool_not_found(name))?;
        let resolved = definition.resolve_arguments(&arguments)?;

        match (definition.handler)(resolved).await {
            Ok(ToolOutcome::Response(response)) => Ok(response.content),
            Ok(ToolOutcome::Value(value)) => Ok(vec![Content::text(render_value(&value))]),
            Err(ToolHandlerError::Domain(err)) => Err(err),
            Err(ToolHandlerError::Other(message)) => Ok(CallToolResponse::error_text(message).content),
        }
    }
}

/// Primitives render with their natural string form; everything else is
/// pretty-printed JSON with camelCase keys left as the caller supplied them.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
