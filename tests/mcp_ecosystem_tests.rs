//! End-to-end exercises of the high-level MCP server API against a real
//! `ToolRegistry`, covering the `tools/call` outcome matrix: a happy path, a
//! validation failure, an unknown tool, and a handler that raises a
//! non-domain error.

use std::sync::Arc;

use mcp_core::integration::constants::methods;
use mcp_core::protocol::{JsonRpcRequest, RequestId};
use mcp_core::{McpServerBuilder, ParamType, ToolBuilder, ToolHandlerError, ToolOutcome, ToolRegistry};
use serde_json::json;

fn registry() -> ToolRegistry {
    ToolRegistry::new()
        .with(
            ToolBuilder::new("add", "Add two numbers")
                .param("a", ParamType::Number)
                .required()
                .param("b", ParamType::Number)
                .required()
                .handle(|args| async move {
                    let a = args["a"].as_f64().unwrap();
                    let b = args["b"].as_f64().unwrap();
                    Ok(ToolOutcome::text((a + b).to_string()))
                }),
        )
        .with(
            ToolBuilder::new("explode", "Always raises a non-domain error").handle(
                |_args| async move { Err(ToolHandlerError::Other("kaboom".to_string())) },
            ),
        )
}

fn request(method: &str, params: Option<serde_json::Value>, id: i64) -> JsonRpcRequest {
    JsonRpcRequest::new(method, params, RequestId::new_number(id))
}

#[tokio::test]
async fn initialize_then_list_tools() {
    let server = McpServerBuilder::new()
        .server_info("ecosystem-test", "0.0.0")
        .with_tool_provider(Arc::new(registry()))
        .build();

    let init = server
        .handle_request(&request(
            methods::INITIALIZE,
            Some(json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "client", "version": "0"}
            })),
            1,
        ))
        .await;
    assert!(init.error.is_none());

    let list = server
        .handle_request(&request(methods::TOOLS_LIST, None, 2))
        .await;
    let result = list.result.expect("tools/list should succeed");
    let names: Vec<&str> = result["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"add"));
    assert!(names.contains(&"explode"));
}

#[tokio::test]
async fn tools_call_happy_path_returns_content() {
    let server = McpServerBuilder::new()
        .with_tool_provider(Arc::new(registry()))
        .build();

    let response = server
        .handle_request(&request(
            methods::TOOLS_CALL,
            Some(json!({"name": "add", "arguments": {"a": 2, "b": 3}})),
            1,
        ))
        .await;

    let result = response.result.expect("tools/call should succeed");
    assert_eq!(result["isError"], json!(false));
    assert_eq!(result["content"][0]["text"], json!("5"));
}

#[tokio::test]
async fn tools_call_missing_required_param_is_invalid_params() {
    let server = McpServerBuilder::new()
        .with_tool_provider(Arc::new(registry()))
        .build();

    let response = server
        .handle_request(&request(
            methods::TOOLS_CALL,
            Some(json!({"name": "add", "arguments": {"a": 2}})),
            1,
        ))
        .await;

    let error = response.error.expect("missing param should be rejected");
    assert_eq!(error["code"], json!(-32602));
}

#[tokio::test]
async fn tools_call_unknown_tool_maps_to_method_not_found() {
    let server = McpServerBuilder::new()
        .with_tool_provider(Arc::new(registry()))
        .build();

    let response = server
        .handle_request(&request(
            methods::TOOLS_CALL,
            Some(json!({"name": "missing", "arguments": {}})),
            1,
        ))
        .await;

    let error = response.error.expect("unknown tool should be rejected");
    assert_eq!(error["code"], json!(-32601));
}

#[tokio::test]
async fn tools_call_non_domain_exception_yields_two_part_error_content() {
    let server = McpServerBuilder::new()
        .with_tool_provider(Arc::new(registry()))
        .build();

    let response = server
        .handle_request(&request(
            methods::TOOLS_CALL,
            Some(json!({"name": "explode", "arguments": {}})),
            1,
        ))
        .await;

    let result = response.result.expect("tool exception is a result, not an RPC error");
    assert_eq!(result["isError"], json!(true));
    let content = result["content"].as_array().unwrap();
    assert_eq!(content.len(), 2);
    assert_eq!(content[0]["text"], json!("Error in tool execution: kaboom"));
    assert_eq!(content[1]["text"], json!("Stack trace:\n<unavailable>"));
}
