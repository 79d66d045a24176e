//! MCP stdio server implementation
//!
//! This module implements the MCP server that communicates over stdio,
//! handling newline-delimited JSON-RPC requests and dispatching tool calls
//! to the [`ToolRegistry`].
//!
//! Only protocol frames are written to stdout; all logging goes through
//! `tracing` so the subscriber must write to stderr.

use crate::client::PlaywrightClient;
use crate::error::{Error, McpError, Result};
use crate::mcp::tools::ToolRegistry;
use crate::mcp::types::{
    InitializeResult, JsonRpcRequest, JsonRpcResponse, McpCapabilities, McpServerInfo,
    ToolCallParams, PROTOCOL_VERSION,
};
use serde_json::{json, Value};
use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, instrument, warn};

/// MCP server state
pub struct McpServer {
    /// Tool registry
    tools: ToolRegistry,
    /// Server info
    info: McpServerInfo,
    /// Whether the client has completed `initialize`
    initialized: AtomicBool,
}

impl McpServer {
    /// Create a new MCP server forwarding to `client`
    pub fn new(client: PlaywrightClient) -> Self {
        Self {
            tools: ToolRegistry::new(client),
            info: McpServerInfo::default(),
            initialized: AtomicBool::new(false),
        }
    }

    /// Create a server whose client reads `BETTER_PLAYWRIGHT_URL`
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(PlaywrightClient::from_env()?))
    }

    /// Server identity reported during `initialize`
    pub fn info(&self) -> &McpServerInfo {
        &self.info
    }

    /// Tool registry backing `tools/list` and `tools/call`
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Whether `initialize` has been received
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Run the MCP server on stdin/stdout until stdin closes
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<()> {
        info!(
            "Starting MCP server: {} v{} -> {}",
            self.info.name,
            self.info.version,
            self.tools.client().base_url()
        );

        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await?;

        info!("MCP server shutting down");
        Ok(())
    }

    /// Serve newline-delimited JSON-RPC from `reader`, answering on `writer`
    ///
    /// Returns when the reader reaches end of input. Requests are handled one
    /// at a time, in arrival order.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    warn!("Skipping non UTF-8 input line: {}", e);
                    continue;
                }
                Err(e) => {
                    error!("Failed to read line: {}", e);
                    return Err(e.into());
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            debug!("Received: {}", line);

            if let Some(resp) = self.handle_line(&line).await {
                let json = serde_json::to_string(&resp).unwrap_or_else(|e| {
                    error!("Failed to serialize response: {}", e);
                    r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"Internal error"}}"#
                        .to_string()
                });

                debug!("Sending: {}", json);

                writer.write_all(json.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        Ok(())
    }

    /// Handle a single line of input
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                return Some(JsonRpcResponse::parse_error());
            }
        };

        let id = value.get("id").cloned();
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                warn!("Invalid JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::invalid_request(id));
            }
        };

        self.handle_request(request).await
    }

    /// Handle a JSON-RPC request
    ///
    /// Returns `None` for notifications.
    #[instrument(skip(self, request), fields(method = %request.method))]
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone();
        let notification = request.is_notification();
        let method = request.method.as_str();

        debug!("Handling method: {}", method);

        let result = match method {
            // Lifecycle methods
            "initialize" => self.handle_initialize(request.params.as_ref()),
            "notifications/initialized" | "initialized" => return None,
            "ping" => Ok(json!({})),

            // Tool methods
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(request.params).await,

            _ if notification => {
                debug!("Ignoring notification: {}", method);
                return None;
            }
            _ => {
                warn!("Unknown method: {}", method);
                return Some(JsonRpcResponse::method_not_found(id, method));
            }
        };

        if notification {
            return None;
        }

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(Error::Mcp(McpError::InvalidParams(msg))) => {
                JsonRpcResponse::invalid_params(id, &msg)
            }
            Err(e) => JsonRpcResponse::internal_error(id, &e.to_string()),
        })
    }

    /// Handle initialize request
    fn handle_initialize(&self, params: Option<&Value>) -> Result<Value> {
        if let Some(version) = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(|v| v.as_str())
        {
            debug!("Client protocol version: {}", version);
        }

        self.initialized.store(true, Ordering::SeqCst);
        info!("Client initialized");

        Ok(serde_json::to_value(InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: McpCapabilities::default(),
            server_info: self.info.clone(),
        })?)
    }

    /// Handle tools/list request
    fn handle_tools_list(&self) -> Result<Value> {
        Ok(json!({
            "tools": self.tools.definitions()
        }))
    }

    /// Handle tools/call request
    async fn handle_tools_call(&self, params: Option<Value>) -> Result<Value> {
        if !self.is_initialized() {
            warn!("tools/call received before initialize");
        }

        let params = params.ok_or_else(|| McpError::InvalidParams("missing params".into()))?;
        let tool_params: ToolCallParams = serde_json::from_value(params)
            .map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let result = self
            .tools
            .execute(&tool_params.name, tool_params.arguments)
            .await;

        Ok(serde_json::to_value(result)?)
    }
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new(PlaywrightClient::default())
    }
}
