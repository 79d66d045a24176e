//! HTTP client for the Playwright server
//!
//! Every method maps to exactly one request against the server's REST API.
//! There are no retries and no timeouts; a non-success status is returned
//! as [`ApiError::Status`] carrying the status code and raw body text.

use crate::client::types::{
    element_description, CreatePageBody, CreatedPage, DialogBody, KeyBody, OutlineResponse,
    PageList, RefBody, ScreenshotBody, ScreenshotResponse, ScrollBody, SearchBody, SearchOptions,
    SearchResult, TypeBody, UploadBody, UrlBody, ValueBody, WaitSelectorBody, WaitTimeoutBody,
};
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

const NO_BODY: Option<&()> = None;

/// Typed client for the Playwright HTTP server
#[derive(Debug, Clone)]
pub struct PlaywrightClient {
    http: Client,
    config: ClientConfig,
}

impl PlaywrightClient {
    /// Create a client for the given configuration
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Create a client for an explicit base URL
    pub fn with_base_url(base_url: impl AsRef<str>) -> Result<Self> {
        Ok(Self::new(ClientConfig::new(base_url)?))
    }

    /// Create a client from `BETTER_PLAYWRIGHT_URL` or the default URL
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(ClientConfig::from_env()?))
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.config.endpoint(path);
        debug!(method = %method, url = %url, "Sending request");

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(
                method = %method,
                path,
                status = status.as_u16(),
                "Playwright server returned an error"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            }
            .into());
        }

        let value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)
                .map_err(|e| ApiError::InvalidResponse(format!("{} {}: {}", method, path, e)))?
        };

        serde_json::from_value(value)
            .map_err(|e| ApiError::InvalidResponse(format!("{} {}: {}", method, path, e)).into())
    }

    fn page_path(page_id: &str, action: &str) -> String {
        format!("/api/pages/{}/{}", page_id, action)
    }

    // ------------------------------------------------------------------
    // Page management
    // ------------------------------------------------------------------

    /// Open a new page and navigate it to `url`
    #[instrument(skip(self))]
    pub async fn create_page(&self, name: &str, description: &str, url: &str) -> Result<CreatedPage> {
        let body = CreatePageBody {
            name,
            description,
            url,
        };
        self.request(Method::POST, "/api/pages", Some(&body)).await
    }

    /// List all open pages
    pub async fn list_pages(&self) -> Result<PageList> {
        self.request(Method::GET, "/api/pages", NO_BODY).await
    }

    /// Close a page
    #[instrument(skip(self))]
    pub async fn close_page(&self, page_id: &str) -> Result<()> {
        let _: Value = self
            .request(Method::DELETE, &format!("/api/pages/{}", page_id), NO_BODY)
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Navigate a page to `url`
    pub async fn navigate(&self, page_id: &str, url: &str) -> Result<Value> {
        self.request(
            Method::POST,
            &Self::page_path(page_id, "navigate"),
            Some(&UrlBody { url }),
        )
        .await
    }

    /// Go back in the page's history
    pub async fn navigate_back(&self, page_id: &str) -> Result<Value> {
        self.request(Method::POST, &Self::page_path(page_id, "back"), NO_BODY)
            .await
    }

    /// Go forward in the page's history
    pub async fn navigate_forward(&self, page_id: &str) -> Result<Value> {
        self.request(Method::POST, &Self::page_path(page_id, "forward"), NO_BODY)
            .await
    }

    // ------------------------------------------------------------------
    // Ref-based actions
    // ------------------------------------------------------------------

    /// Click the element identified by `element_ref`
    ///
    /// `element` is a human-readable description forwarded to the server;
    /// it defaults to `Element with ref=<ref>`.
    pub async fn click(
        &self,
        page_id: &str,
        element_ref: &str,
        element: Option<&str>,
    ) -> Result<Value> {
        self.ref_action(page_id, "click", element_ref, element).await
    }

    /// Hover over the element identified by `element_ref`
    pub async fn hover(
        &self,
        page_id: &str,
        element_ref: &str,
        element: Option<&str>,
    ) -> Result<Value> {
        self.ref_action(page_id, "hover", element_ref, element).await
    }

    async fn ref_action(
        &self,
        page_id: &str,
        action: &str,
        element_ref: &str,
        element: Option<&str>,
    ) -> Result<Value> {
        let default_element = element_description(element_ref);
        let body = RefBody {
            element_ref,
            element: element.unwrap_or(&default_element),
        };
        self.request(Method::POST, &Self::page_path(page_id, action), Some(&body))
            .await
    }

    /// Type `text` into the element identified by `element_ref`
    pub async fn type_text(
        &self,
        page_id: &str,
        element_ref: &str,
        text: &str,
        element: Option<&str>,
    ) -> Result<Value> {
        let default_element = element_description(element_ref);
        let body = TypeBody {
            element_ref,
            text,
            element: element.unwrap_or(&default_element),
        };
        self.request(Method::POST, &Self::page_path(page_id, "type"), Some(&body))
            .await
    }

    /// Replace the value of an input element
    pub async fn fill(
        &self,
        page_id: &str,
        element_ref: &str,
        value: &str,
        element: Option<&str>,
    ) -> Result<Value> {
        self.value_action(page_id, "fill", element_ref, value, element)
            .await
    }

    /// Choose an option of a `<select>` element
    pub async fn select(
        &self,
        page_id: &str,
        element_ref: &str,
        value: &str,
        element: Option<&str>,
    ) -> Result<Value> {
        self.value_action(page_id, "select", element_ref, value, element)
            .await
    }

    async fn value_action(
        &self,
        page_id: &str,
        action: &str,
        element_ref: &str,
        value: &str,
        element: Option<&str>,
    ) -> Result<Value> {
        let default_element = element_description(element_ref);
        let body = ValueBody {
            element_ref,
            value,
            element: element.unwrap_or(&default_element),
        };
        self.request(Method::POST, &Self::page_path(page_id, action), Some(&body))
            .await
    }

    /// Press a keyboard key (Enter, Tab, Escape, ...)
    pub async fn press_key(&self, page_id: &str, key: &str) -> Result<Value> {
        self.request(
            Method::POST,
            &Self::page_path(page_id, "press"),
            Some(&KeyBody { key }),
        )
        .await
    }

    /// Attach local files to a file input
    pub async fn upload_files(
        &self,
        page_id: &str,
        element_ref: &str,
        files: &[String],
    ) -> Result<Value> {
        let body = UploadBody { element_ref, files };
        self.request(Method::POST, &Self::page_path(page_id, "upload"), Some(&body))
            .await
    }

    /// Accept or dismiss the pending dialog, optionally with prompt text
    pub async fn handle_dialog(
        &self,
        page_id: &str,
        accept: bool,
        text: Option<&str>,
    ) -> Result<Value> {
        let body = DialogBody { accept, text };
        self.request(Method::POST, &Self::page_path(page_id, "dialog"), Some(&body))
            .await
    }

    // ------------------------------------------------------------------
    // Scrolling and waiting
    // ------------------------------------------------------------------

    /// Scroll the page, or the element `element_ref`, to the bottom
    pub async fn scroll_to_bottom(&self, page_id: &str, element_ref: Option<&str>) -> Result<Value> {
        self.request(
            Method::POST,
            &Self::page_path(page_id, "scroll-bottom"),
            Some(&ScrollBody { element_ref }),
        )
        .await
    }

    /// Scroll the page, or the element `element_ref`, to the top
    pub async fn scroll_to_top(&self, page_id: &str, element_ref: Option<&str>) -> Result<Value> {
        self.request(
            Method::POST,
            &Self::page_path(page_id, "scroll-top"),
            Some(&ScrollBody { element_ref }),
        )
        .await
    }

    /// Wait on the server side for `timeout_ms` milliseconds
    pub async fn wait_for_timeout(&self, page_id: &str, timeout_ms: u64) -> Result<Value> {
        self.request(
            Method::POST,
            &Self::page_path(page_id, "wait-timeout"),
            Some(&WaitTimeoutBody {
                timeout: timeout_ms,
            }),
        )
        .await
    }

    /// Wait until `selector` matches; `options` are passed through untouched
    pub async fn wait_for_selector(
        &self,
        page_id: &str,
        selector: &str,
        options: Option<&Value>,
    ) -> Result<Value> {
        let body = WaitSelectorBody { selector, options };
        self.request(
            Method::POST,
            &Self::page_path(page_id, "wait-selector"),
            Some(&body),
        )
        .await
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Screenshot as a base64-encoded PNG
    #[instrument(skip(self))]
    pub async fn screenshot(&self, page_id: &str, full_page: bool) -> Result<String> {
        let response: ScreenshotResponse = self
            .request(
                Method::POST,
                &Self::page_path(page_id, "screenshot"),
                Some(&ScreenshotBody { full_page }),
            )
            .await?;
        Ok(response.screenshot)
    }

    /// Screenshot decoded to raw PNG bytes
    pub async fn screenshot_png(&self, page_id: &str, full_page: bool) -> Result<Vec<u8>> {
        let encoded = self.screenshot(page_id, full_page).await?;
        BASE64.decode(encoded.trim()).map_err(|e| {
            ApiError::InvalidResponse(format!("screenshot is not valid base64: {}", e)).into()
        })
    }

    /// Compressed structural outline of the page
    pub async fn get_outline(&self, page_id: &str) -> Result<String> {
        let response: OutlineResponse = self
            .request(Method::POST, &Self::page_path(page_id, "outline"), NO_BODY)
            .await?;
        Ok(response.outline)
    }

    /// Regex search over the page snapshot
    #[instrument(skip(self))]
    pub async fn search_snapshot(
        &self,
        page_id: &str,
        pattern: &str,
        options: SearchOptions,
    ) -> Result<SearchResult> {
        let body = SearchBody {
            pattern,
            ignore_case: options.ignore_case,
            line_limit: options.effective_line_limit(),
        };
        self.request(Method::POST, &Self::page_path(page_id, "search"), Some(&body))
            .await
    }
}

impl Default for PlaywrightClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_path() {
        assert_eq!(
            PlaywrightClient::page_path("p-1", "scroll-bottom"),
            "/api/pages/p-1/scroll-bottom"
        );
    }

    #[test]
    fn test_default_client_base_url() {
        let client = PlaywrightClient::default();
        assert_eq!(client.base_url(), "http://localhost:3102");
    }

    #[test]
    fn test_with_base_url_trims_slash() {
        let client = PlaywrightClient::with_base_url("http://127.0.0.1:9000/").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9000");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Port 9 (discard) is not expected to have an HTTP listener.
        let client = PlaywrightClient::with_base_url("http://127.0.0.1:9").unwrap();
        let err = client.list_pages().await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Api(ApiError::Transport(_))
        ));
        assert_eq!(err.status(), None);
    }
}
