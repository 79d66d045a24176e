//! Wire types for the MCP side of the bridge
//!
//! JSON-RPC 2.0 envelopes plus the handful of MCP payloads the bridge sends:
//! the `initialize` answer, tool definitions and tool results.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// MCP protocol revision announced in `initialize`
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// MIME type of every screenshot returned by the bridge
pub const PNG_MIME_TYPE: &str = "image/png";

/// One line read from the MCP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol tag, `"2.0"`
    pub jsonrpc: String,
    /// `initialize`, `tools/call`, ...
    pub method: String,
    /// Method parameters, passed on untouched
    #[serde(default)]
    pub params: Option<Value>,
    /// Absent for notifications; an explicit `null` is kept as `Some(Null)`
    #[serde(
        default,
        deserialize_with = "present_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<Value>,
}

fn present_id<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl JsonRpcRequest {
    /// Build a request with the given id
    pub fn new(id: impl Into<Value>, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
            id: Some(id.into()),
        }
    }

    /// True when the `id` member is missing; such messages get no answer
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Answer written back for every request that carried an id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol tag, `"2.0"`
    pub jsonrpc: String,
    /// Echoed request id; serialized as `null` when it could not be read
    #[serde(default)]
    pub id: Option<Value>,
    /// Set on success, mutually exclusive with `error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Set on protocol-level failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Wrap a method result
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Protocol error with an arbitrary code
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// -32700: the line was not JSON
    pub fn parse_error() -> Self {
        Self::error(None, -32700, "Parse error")
    }

    /// -32600: JSON, but not a request object
    pub fn invalid_request(id: Option<Value>) -> Self {
        Self::error(id, -32600, "Invalid Request")
    }

    /// -32601: the bridge does not implement `method`
    pub fn method_not_found(id: Option<Value>, method: &str) -> Self {
        Self::error(id, -32601, format!("Method not found: {}", method))
    }

    /// -32602: `tools/call` params missing or malformed
    pub fn invalid_params(id: Option<Value>, msg: &str) -> Self {
        Self::error(id, -32602, format!("Invalid params: {}", msg))
    }

    /// -32603: anything else that failed while answering
    pub fn internal_error(id: Option<Value>, msg: &str) -> Self {
        Self::error(id, -32603, format!("Internal error: {}", msg))
    }
}

/// `error` member of a failed response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Standard JSON-RPC code
    pub code: i32,
    /// Short human-readable reason
    pub message: String,
    /// Extra detail; the bridge never sets it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Capabilities announced in `initialize`; only tools are offered
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct McpCapabilities {
    /// Serialized as `{}` since the tool list never changes
    #[serde(default)]
    pub tools: ToolsCapability,
}

/// `tools` entry of [`McpCapabilities`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsCapability {
    /// Omitted unless set
    #[serde(
        default,
        rename = "listChanged",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub list_changed: bool,
}

/// `serverInfo` of the `initialize` answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServerInfo {
    /// `better-playwright`
    pub name: String,
    /// Crate version
    pub version: String,
}

impl Default for McpServerInfo {
    fn default() -> Self {
        Self {
            name: "better-playwright".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Result of the `initialize` handshake
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Protocol revision spoken by the server
    pub protocol_version: String,
    /// Advertised capabilities
    pub capabilities: McpCapabilities,
    /// Server identity
    pub server_info: McpServerInfo,
}

/// One entry of the `tools/list` answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpToolDefinition {
    /// Name used in `tools/call`
    pub name: String,
    /// Shown to the agent
    pub description: String,
    /// JSON schema of the arguments object
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// `params` of a `tools/call` request
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Registered tool to run
    pub name: String,
    /// Arguments object; `null` when omitted
    #[serde(default)]
    pub arguments: Value,
}

/// Outcome of one tool call, errors included
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// Serialized as `isError` only when true
    #[serde(
        rename = "isError",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub is_error: bool,
    /// Always exactly one block for this bridge
    pub content: Vec<ToolContent>,
}

impl ToolCallResult {
    /// Successful text answer
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            is_error: false,
            content: vec![ToolContent::text(text)],
        }
    }

    /// Successful image answer (screenshots)
    pub fn image(data: String, mime_type: impl Into<String>) -> Self {
        Self {
            is_error: false,
            content: vec![ToolContent::image(data, mime_type)],
        }
    }

    /// Failed call; `message` already carries the `Error: ` prefix
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            content: vec![ToolContent::text(message)],
        }
    }

    /// Text of the first text block, if any
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|c| match c {
            ToolContent::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Content block of a [`ToolCallResult`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    /// Plain text
    #[serde(rename = "text")]
    Text {
        /// Body
        text: String,
    },
    /// Inline image
    #[serde(rename = "image")]
    Image {
        /// Base64 payload as received from the server
        data: String,
        /// Always [`PNG_MIME_TYPE`] here
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
}

impl ToolContent {
    /// Text block
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Image block
    pub fn image(data: String, mime_type: impl Into<String>) -> Self {
        Self::Image {
            data,
            mime_type: mime_type.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_jsonrpc_request_deserialize() {
        let json = r#"{"jsonrpc":"2.0","method":"test","id":1}"#;
        let req: JsonRpcRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.method, "test");
        assert_eq!(req.id, Some(json!(1)));
        assert!(!req.is_notification());
    }

    #[test]
    fn test_notification_has_no_id() {
        let json = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        let req: JsonRpcRequest = serde_json::from_str(json).unwrap();
        assert!(req.is_notification());
    }

    #[test]
    fn test_null_id_is_a_request() {
        let json = r#"{"jsonrpc":"2.0","method":"ping","id":null}"#;
        let req: JsonRpcRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.id, Some(Value::Null));
        assert!(!req.is_notification());
    }

    #[test]
    fn test_jsonrpc_response_error() {
        let resp = JsonRpcResponse::error(Some(json!(1)), -32600, "Invalid");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"error\""));
        assert!(json.contains("-32600"));
    }

    #[test]
    fn test_capabilities_serialize_as_empty_tools() {
        let caps = serde_json::to_value(McpCapabilities::default()).unwrap();
        assert_eq!(caps, json!({"tools": {}}));
    }

    #[test]
    fn test_image_content_serialize() {
        let result = ToolCallResult::image("iVBORw0KGgo=".to_string(), PNG_MIME_TYPE);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "content": [{"type": "image", "data": "iVBORw0KGgo=", "mimeType": "image/png"}]
            })
        );
    }

    #[test]
    fn test_error_result_flagged() {
        let result = ToolCallResult::error("Error: HTTP 500: boom");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["isError"], true);
        assert_eq!(result.first_text(), Some("Error: HTTP 500: boom"));
    }
}
