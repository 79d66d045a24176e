//! Playwright server client module
//!
//! This module provides the typed HTTP client for the external Playwright
//! server, with one method per remote operation.

mod playwright;
pub mod types;

pub use playwright::PlaywrightClient;
pub use types::{CreatedPage, PageList, SearchOptions, SearchResult, DEFAULT_LINE_LIMIT};
