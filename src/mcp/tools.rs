//! MCP tool definitions and registry
//!
//! This module defines the available MCP tools and maps each call onto a
//! single request to the Playwright server.

use crate::client::{PlaywrightClient, SearchOptions};
use crate::error::{McpError, Result};
use crate::mcp::types::{McpToolDefinition, ToolCallResult, PNG_MIME_TYPE};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, instrument, warn};

/// A registered MCP tool
pub trait McpTool: Send + Sync {
    /// Tool name
    fn name(&self) -> &str;
    /// Tool description
    fn description(&self) -> &str;
    /// Input schema as JSON
    fn input_schema(&self) -> Value;
    /// Get tool definition
    fn definition(&self) -> McpToolDefinition {
        McpToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Tool registry holding all available tools
pub struct ToolRegistry {
    tools: Vec<Box<dyn McpTool>>,
    client: PlaywrightClient,
}

impl ToolRegistry {
    /// Create a registry with all built-in tools, backed by `client`
    pub fn new(client: PlaywrightClient) -> Self {
        let mut registry = Self {
            tools: Vec::new(),
            client,
        };

        registry.register(Box::new(CreatePageTool));
        registry.register(Box::new(GetOutlineTool));
        registry.register(Box::new(SearchSnapshotTool));
        registry.register(Box::new(ClickTool));
        registry.register(Box::new(TypeTextTool));
        registry.register(Box::new(NavigateTool));
        registry.register(Box::new(ScreenshotTool));
        registry.register(Box::new(ClosePageTool));
        registry.register(Box::new(ListPagesTool));
        registry.register(Box::new(HoverTool));
        registry.register(Box::new(ScrollToBottomTool));
        registry.register(Box::new(ScrollToTopTool));
        registry.register(Box::new(PressKeyTool));

        registry
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Box<dyn McpTool>) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    /// Get all tool definitions, in registration order
    pub fn definitions(&self) -> Vec<McpToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Whether a tool with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name() == name)
    }

    /// Client used for dispatch
    pub fn client(&self) -> &PlaywrightClient {
        &self.client
    }

    /// Execute a tool by name
    ///
    /// Never fails: any error is reported as an `isError` result whose text
    /// is `Error: <message>`.
    #[instrument(skip(self, args))]
    pub async fn execute(&self, name: &str, args: Value) -> ToolCallResult {
        info!("Executing tool: {}", name);

        match self.dispatch(name, args).await {
            Ok(result) => result,
            Err(e) => {
                warn!(tool = name, error = %e, "Tool call failed");
                ToolCallResult::error(format!("Error: {}", e))
            }
        }
    }

    async fn dispatch(&self, name: &str, args: Value) -> Result<ToolCallResult> {
        if !self.contains(name) {
            return Err(McpError::UnknownTool(name.to_string()).into());
        }

        match name {
            "create_page" => self.execute_create_page(parse_args(name, args)?).await,
            "get_outline" => {
                let args: PageArgs = parse_args(name, args)?;
                let outline = self.client.get_outline(&args.page_id).await?;
                Ok(ToolCallResult::text(outline))
            }
            "search_snapshot" => self.execute_search(parse_args(name, args)?).await,
            "click" => {
                let args: RefArgs = parse_args(name, args)?;
                let element = mcp_element(&args.element_ref);
                self.client
                    .click(&args.page_id, &args.element_ref, Some(&element))
                    .await?;
                Ok(ToolCallResult::text(format!("Clicked {}", args.element_ref)))
            }
            "type_text" => {
                let args: TypeArgs = parse_args(name, args)?;
                let element = mcp_element(&args.element_ref);
                self.client
                    .type_text(&args.page_id, &args.element_ref, &args.text, Some(&element))
                    .await?;
                Ok(ToolCallResult::text(format!(
                    "Typed \"{}\" into {}",
                    args.text, args.element_ref
                )))
            }
            "navigate" => {
                let args: NavigateArgs = parse_args(name, args)?;
                self.client.navigate(&args.page_id, &args.url).await?;
                Ok(ToolCallResult::text(format!("Navigated to {}", args.url)))
            }
            "screenshot" => {
                let args: ScreenshotArgs = parse_args(name, args)?;
                let data = self
                    .client
                    .screenshot(&args.page_id, args.full_page.unwrap_or(true))
                    .await?;
                Ok(ToolCallResult::image(data, PNG_MIME_TYPE))
            }
            "close_page" => {
                let args: PageArgs = parse_args(name, args)?;
                self.client.close_page(&args.page_id).await?;
                Ok(ToolCallResult::text(format!("Closed page {}", args.page_id)))
            }
            "list_pages" => {
                let pages = self.client.list_pages().await?;
                if pages.is_empty() {
                    return Ok(ToolCallResult::text("No open pages"));
                }
                Ok(ToolCallResult::text(serde_json::to_string_pretty(
                    pages.as_value(),
                )?))
            }
            "hover" => {
                let args: RefArgs = parse_args(name, args)?;
                let element = mcp_element(&args.element_ref);
                self.client
                    .hover(&args.page_id, &args.element_ref, Some(&element))
                    .await?;
                Ok(ToolCallResult::text(format!("Hovered over {}", args.element_ref)))
            }
            "scroll_to_bottom" => {
                let args: PageArgs = parse_args(name, args)?;
                self.client.scroll_to_bottom(&args.page_id, None).await?;
                Ok(ToolCallResult::text("Scrolled to bottom"))
            }
            "scroll_to_top" => {
                let args: PageArgs = parse_args(name, args)?;
                self.client.scroll_to_top(&args.page_id, None).await?;
                Ok(ToolCallResult::text("Scrolled to top"))
            }
            "press_key" => {
                let args: KeyArgs = parse_args(name, args)?;
                self.client.press_key(&args.page_id, &args.key).await?;
                Ok(ToolCallResult::text(format!("Pressed {}", args.key)))
            }
            _ => Err(McpError::UnknownTool(name.to_string()).into()),
        }
    }

    async fn execute_create_page(&self, args: CreatePageArgs) -> Result<ToolCallResult> {
        let description = args
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(&args.name);

        let page = self
            .client
            .create_page(&args.name, description, &args.url)
            .await?;
        Ok(ToolCallResult::text(format!(
            "Page created. pageId: {}",
            page.page_id
        )))
    }

    async fn execute_search(&self, args: SearchArgs) -> Result<ToolCallResult> {
        let options = SearchOptions {
            ignore_case: args.ignore_case.unwrap_or(false),
            line_limit: args
                .line_limit
                .filter(|l| l.is_finite() && *l > 0.0)
                .map(|l| l as u32),
        };

        let result = self
            .client
            .search_snapshot(&args.page_id, &args.pattern, options)
            .await?;
        Ok(ToolCallResult::text(result.summary()))
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new(PlaywrightClient::default())
    }
}

/// Element description the MCP tools send with ref-based actions
fn mcp_element(element_ref: &str) -> String {
    format!("Element ref={}", element_ref)
}

fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T> {
    let args = if args.is_null() {
        Value::Object(Map::new())
    } else {
        args
    };

    serde_json::from_value(args).map_err(|e| {
        McpError::InvalidArguments {
            tool: tool.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

// ============================================================================
// Tool Arguments
// ============================================================================

#[derive(Debug, Deserialize)]
struct CreatePageArgs {
    name: String,
    #[serde(default)]
    description: Option<String>,
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageArgs {
    page_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchArgs {
    page_id: String,
    pattern: String,
    #[serde(default)]
    ignore_case: Option<bool>,
    #[serde(default)]
    line_limit: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefArgs {
    page_id: String,
    #[serde(rename = "ref")]
    element_ref: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeArgs {
    page_id: String,
    #[serde(rename = "ref")]
    element_ref: String,
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NavigateArgs {
    page_id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScreenshotArgs {
    page_id: String,
    #[serde(default)]
    full_page: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyArgs {
    page_id: String,
    key: String,
}

// ============================================================================
// Tool Definitions
// ============================================================================

fn page_only_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "pageId": { "type": "string", "description": "Page ID" }
        },
        "required": ["pageId"]
    })
}

/// Create a page
struct CreatePageTool;

impl McpTool for CreatePageTool {
    fn name(&self) -> &str {
        "create_page"
    }

    fn description(&self) -> &str {
        "Create a new browser page and navigate to URL. Returns pageId for use with other tools."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Page identifier name" },
                "description": { "type": "string", "description": "Page description" },
                "url": { "type": "string", "description": "URL to navigate to" }
            },
            "required": ["name", "url"]
        })
    }
}

/// Compressed page outline
struct GetOutlineTool;

impl McpTool for GetOutlineTool {
    fn name(&self) -> &str {
        "get_outline"
    }

    fn description(&self) -> &str {
        "Get compressed page structure (max ~200 lines). Saves ~95% tokens vs full snapshot. \
         Use this to understand page structure and find element refs."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pageId": { "type": "string", "description": "Page ID from create_page" }
            },
            "required": ["pageId"]
        })
    }
}

/// Regex search over the snapshot
struct SearchSnapshotTool;

impl McpTool for SearchSnapshotTool {
    fn name(&self) -> &str {
        "search_snapshot"
    }

    fn description(&self) -> &str {
        "Search page content with regex pattern. Returns only matching lines (max 100). \
         Much more efficient than full snapshot for finding specific content."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pageId": { "type": "string", "description": "Page ID" },
                "pattern": { "type": "string", "description": "Regex pattern to search" },
                "ignoreCase": {
                    "type": "boolean",
                    "description": "Case insensitive search",
                    "default": false
                },
                "lineLimit": {
                    "type": "number",
                    "description": "Max lines to return (default 100; zero or negative values use the default)",
                    "default": 100
                }
            },
            "required": ["pageId", "pattern"]
        })
    }
}

/// Click by ref
struct ClickTool;

impl McpTool for ClickTool {
    fn name(&self) -> &str {
        "click"
    }

    fn description(&self) -> &str {
        "Click element by ref ID (e.g., \"e5\", \"e12\"). Get refs from get_outline or search_snapshot."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pageId": { "type": "string", "description": "Page ID" },
                "ref": { "type": "string", "description": "Element ref like e3, e4" }
            },
            "required": ["pageId", "ref"]
        })
    }
}

/// Type into an element
struct TypeTextTool;

impl McpTool for TypeTextTool {
    fn name(&self) -> &str {
        "type_text"
    }

    fn description(&self) -> &str {
        "Type text into element by ref ID"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pageId": { "type": "string", "description": "Page ID" },
                "ref": { "type": "string", "description": "Element ref" },
                "text": { "type": "string", "description": "Text to type" }
            },
            "required": ["pageId", "ref", "text"]
        })
    }
}

/// Navigate an existing page
struct NavigateTool;

impl McpTool for NavigateTool {
    fn name(&self) -> &str {
        "navigate"
    }

    fn description(&self) -> &str {
        "Navigate to URL"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pageId": { "type": "string", "description": "Page ID" },
                "url": { "type": "string", "description": "URL to navigate to" }
            },
            "required": ["pageId", "url"]
        })
    }
}

/// Capture screenshot
struct ScreenshotTool;

impl McpTool for ScreenshotTool {
    fn name(&self) -> &str {
        "screenshot"
    }

    fn description(&self) -> &str {
        "Take screenshot of page"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pageId": { "type": "string", "description": "Page ID" },
                "fullPage": {
                    "type": "boolean",
                    "description": "Capture full page",
                    "default": true
                }
            },
            "required": ["pageId"]
        })
    }
}

struct ClosePageTool;

impl McpTool for ClosePageTool {
    fn name(&self) -> &str {
        "close_page"
    }

    fn description(&self) -> &str {
        "Close browser page"
    }

    fn input_schema(&self) -> Value {
        page_only_schema()
    }
}

struct ListPagesTool;

impl McpTool for ListPagesTool {
    fn name(&self) -> &str {
        "list_pages"
    }

    fn description(&self) -> &str {
        "List all open browser pages"
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }
}

struct HoverTool;

impl McpTool for HoverTool {
    fn name(&self) -> &str {
        "hover"
    }

    fn description(&self) -> &str {
        "Hover over element by ref ID"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pageId": { "type": "string", "description": "Page ID" },
                "ref": { "type": "string", "description": "Element ref" }
            },
            "required": ["pageId", "ref"]
        })
    }
}

struct ScrollToBottomTool;

impl McpTool for ScrollToBottomTool {
    fn name(&self) -> &str {
        "scroll_to_bottom"
    }

    fn description(&self) -> &str {
        "Scroll to bottom of page"
    }

    fn input_schema(&self) -> Value {
        page_only_schema()
    }
}

struct ScrollToTopTool;

impl McpTool for ScrollToTopTool {
    fn name(&self) -> &str {
        "scroll_to_top"
    }

    fn description(&self) -> &str {
        "Scroll to top of page"
    }

    fn input_schema(&self) -> Value {
        page_only_schema()
    }
}

/// Keyboard input
struct PressKeyTool;

impl McpTool for PressKeyTool {
    fn name(&self) -> &str {
        "press_key"
    }

    fn description(&self) -> &str {
        "Press keyboard key (Enter, Tab, Escape, etc.)"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pageId": { "type": "string", "description": "Page ID" },
                "key": { "type": "string", "description": "Key to press" }
            },
            "required": ["pageId", "key"]
        })
    }
}

/// List of all available tools, in advertised order
pub const AVAILABLE_TOOLS: &[&str] = &[
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
