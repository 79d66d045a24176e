//! Model Context Protocol (MCP) server module
//!
//! This module implements the MCP stdio server for AI agent integration,
//! exposing the Playwright server's page operations as MCP tools.

mod server;
mod tools;
/// MCP protocol types
pub mod types;

pub use server::McpServer;
pub use tools::{McpTool, ToolRegistry, AVAILABLE_TOOLS};
pub use types::{
    InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpCapabilities,
    McpServerInfo, McpToolDefinition, ToolCallParams, ToolCallResult, ToolContent,
    PNG_MIME_TYPE, PROTOCOL_VERSION,
};
