//! MCP server integration tests
//!
//! These tests verify the MCP protocol implementation and the tool catalog.

use better_playwright_mcp::mcp::types::{
    JsonRpcRequest, JsonRpcResponse, McpToolDefinition, ToolCallResult,
};
use better_playwright_mcp::mcp::{McpServer, ToolRegistry, AVAILABLE_TOOLS, PROTOCOL_VERSION};
use better_playwright_mcp::PlaywrightClient;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::io::BufReader;

const EXPECTED_TOOLS: [&str; 13] = [
    "create_page",
    "get_outline",
    "search_snapshot",
    "click",
    "type_text",
    "navigate",
    "screenshot",
    "close_page",
    "list_pages",
    "hover",
    "scroll_to_bottom",
    "scroll_to_top",
    "press_key",
];

#[test]
fn test_jsonrpc_request_parsing() {
    let json = r#"{
        "jsonrpc": "2.0",
        "method": "tools/list",
        "id": 1
    }"#;

    let request: JsonRpcRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.method, "tools/list");
    assert_eq!(request.id, Some(json!(1)));
    assert!(!request.is_notification());
}

#[test]
fn test_jsonrpc_response_success() {
    let response = JsonRpcResponse::success(Some(json!(1)), json!({"status": "ok"}));
    let json = serde_json::to_string(&response).unwrap();

    assert!(json.contains("\"jsonrpc\":\"2.0\""));
    assert!(json.contains("\"result\""));
    assert!(!json.contains("\"error\""));
}

#[test]
fn test_jsonrpc_response_error() {
    let response = JsonRpcResponse::error(Some(json!(1)), -32600, "Invalid Request");
    let json = serde_json::to_string(&response).unwrap();

    assert!(json.contains("\"error\""));
    assert!(json.contains("-32600"));
    assert!(!json.contains("\"result\""));
}

#[test]
fn test_tool_registry_lists_tools_in_order() {
    let registry = ToolRegistry::default();
    let names: Vec<String> = registry
        .definitions()
        .into_iter()
        .map(|d| d.name)
        .collect();

    assert_eq!(names, EXPECTED_TOOLS);
}

#[test]
fn test_available_tools_constant() {
    assert_eq!(AVAILABLE_TOOLS, EXPECTED_TOOLS);

    let registry = ToolRegistry::default();
    for name in AVAILABLE_TOOLS {
        assert!(registry.contains(name), "{} should be registered", name);
    }
}

#[test]
fn test_tool_definitions_have_schemas() {
    let registry = ToolRegistry::default();

    for def in registry.definitions() {
        assert!(
            !def.description.is_empty(),
            "Tool {} should have a description",
            def.name
        );

        assert_eq!(
            def.input_schema["type"], "object",
            "Tool {} schema should be type object",
            def.name
        );

        assert!(
            def.input_schema["properties"].is_object(),
            "Tool {} should have properties",
            def.name
        );
    }
}

#[test]
fn test_required_arguments() {
    let registry = ToolRegistry::default();
    let required = |name: &str| -> Vec<String> {
        let def = registry
            .definitions()
            .into_iter()
            .find(|d| d.name == name)
            .unwrap();
        def.input_schema["required"]
            .as_array()
            .map(|r| {
                r.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    };

    assert_eq!(required("create_page"), vec!["name", "url"]);
    assert_eq!(required("search_snapshot"), vec!["pageId", "pattern"]);
    assert_eq!(required("click"), vec!["pageId", "ref"]);
    assert_eq!(required("type_text"), vec!["pageId", "ref", "text"]);
    assert_eq!(required("screenshot"), vec!["pageId"]);
    assert_eq!(required("press_key"), vec!["pageId", "key"]);
    assert!(required("list_pages").is_empty());
}

#[test]
fn test_tool_call_result_text() {
    let result = ToolCallResult::text("Hello, world!");
    assert!(!result.is_error);
    assert_eq!(result.content.len(), 1);

    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("Hello, world!"));
    assert!(!json.contains("isError"));
}

#[test]
fn test_tool_call_result_error() {
    let result = ToolCallResult::error("Error: Something went wrong");
    assert!(result.is_error);
    assert_eq!(result.content.len(), 1);

    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("Something went wrong"));
    assert!(json.contains("\"isError\":true"));
}

#[test]
fn test_mcp_tool_definition_serialization() {
    let def = McpToolDefinition {
        name: "test_tool".to_string(),
        description: "A test tool".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "param1": { "type": "string" }
            },
            "required": ["param1"]
        }),
    };

    let json = serde_json::to_string(&def).unwrap();
    assert!(json.contains("\"name\":\"test_tool\""));
    assert!(json.contains("\"inputSchema\""));

    let parsed: McpToolDefinition = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.name, "test_tool");
}

#[tokio::test]
async fn test_server_uses_configured_base_url() {
    let client = PlaywrightClient::with_base_url("http://127.0.0.1:3999/").unwrap();
    let server = McpServer::new(client);
    assert_eq!(server.tools().client().base_url(), "http://127.0.0.1:3999");
}

#[tokio::test]
async fn test_mcp_session_over_stream() {
    let server = McpServer::default();
    let input = tokio_test::io::Builder::new()
        .read(
            br#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"0"}}}"#,
        )
        .read(b"\n")
        .read(b"{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n")
        .read(b"{\"jsonrpc\":\"2.0\",\"id\":\"list\",\"method\":\"tools/list\"}\n")
        .read(b"{\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"tools/call\",\"params\":{\"name\":\"nope\",\"arguments\":{}}}\n")
        .read(b"not json\n")
        .build();
    let mut output = Vec::new();

    server
        .serve(BufReader::new(input), &mut output)
        .await
        .unwrap();
    assert!(server.is_initialized());

    let text = String::from_utf8(output).unwrap();
    let responses: Vec<Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(responses.len(), 4);

    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["protocolVersion"], PROTOCOL_VERSION);
    assert_eq!(
        responses[0]["result"]["serverInfo"]["name"],
        "better-playwright"
    );

    assert_eq!(responses[1]["id"], "list");
    assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 13);

    assert_eq!(responses[2]["id"], 3);
    assert_eq!(responses[2]["result"]["isError"], true);
    assert_eq!(
        responses[2]["result"]["content"][0]["text"],
        "Error: Unknown tool: nope"
    );

    assert!(responses[3].as_object().unwrap().contains_key("id"));
    assert_eq!(responses[3]["id"], Value::Null);
    assert_eq!(responses[3]["error"]["code"], -32700);
}
