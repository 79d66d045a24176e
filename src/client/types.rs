//! Wire types for the Playwright HTTP server
//!
//! Request bodies borrow from the caller. Response types only name the
//! fields the bridge reads; everything else is kept as opaque JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Line limit applied to snapshot searches when none is given
pub const DEFAULT_LINE_LIMIT: u32 = 100;

/// Options for [`search_snapshot`](crate::client::PlaywrightClient::search_snapshot)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Case-insensitive matching (default: false)
    pub ignore_case: bool,
    /// Maximum number of lines returned (default: 100, zero means default)
    pub line_limit: Option<u32>,
}

impl SearchOptions {
    /// Effective line limit sent to the server
    pub fn effective_line_limit(&self) -> u32 {
        match self.line_limit {
            Some(limit) if limit > 0 => limit,
            _ => DEFAULT_LINE_LIMIT,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreatePageBody<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub url: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct UrlBody<'a> {
    pub url: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RefBody<'a> {
    #[serde(rename = "ref")]
    pub element_ref: &'a str,
    pub element: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct TypeBody<'a> {
    #[serde(rename = "ref")]
    pub element_ref: &'a str,
    pub text: &'a str,
    pub element: &'a str,
}

/// Shared by fill and select
#[derive(Debug, Serialize)]
pub(crate) struct ValueBody<'a> {
    #[serde(rename = "ref")]
    pub element_ref: &'a str,
    pub value: &'a str,
    pub element: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScreenshotBody {
    pub full_page: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct KeyBody<'a> {
    pub key: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct UploadBody<'a> {
    #[serde(rename = "ref")]
    pub element_ref: &'a str,
    pub files: &'a [String],
}

#[derive(Debug, Serialize)]
pub(crate) struct DialogBody<'a> {
    pub accept: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScrollBody<'a> {
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub element_ref: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WaitTimeoutBody {
    pub timeout: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct WaitSelectorBody<'a> {
    pub selector: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<&'a Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchBody<'a> {
    pub pattern: &'a str,
    pub ignore_case: bool,
    pub line_limit: u32,
}

/// Response to page creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPage {
    /// Identifier for all later calls on this page
    pub page_id: String,
    /// Any other fields the server returned
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response to the page listing, kept exactly as the server sent it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageList(pub Value);

impl PageList {
    /// Entries of the `pages` array, if the response has one
    pub fn pages(&self) -> Option<&Vec<Value>> {
        self.0.get("pages").and_then(Value::as_array)
    }

    /// True only when the server reported an empty `pages` array
    pub fn is_empty(&self) -> bool {
        self.pages().is_some_and(Vec::is_empty)
    }

    /// Raw response body
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OutlineResponse {
    pub outline: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScreenshotResponse {
    pub screenshot: String,
}

/// Result of a regex search over the page snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Matching snapshot lines, newline separated
    #[serde(default)]
    pub result: String,
    /// Total number of matches found
    #[serde(default)]
    pub match_count: u64,
    /// Whether `result` was cut at the line limit
    #[serde(default)]
    pub truncated: bool,
}

impl SearchResult {
    /// Human-readable summary: `Found N matches[ (truncated)]:` then the lines
    pub fn summary(&self) -> String {
        let note = if self.truncated { " (truncated)" } else { "" };
        format!("Found {} matches{}:\n{}", self.match_count, note, self.result)
    }
}

/// Default element description sent with ref-based actions
pub fn element_description(element_ref: &str) -> String {
    format!("Element with ref={}", element_ref)
}
