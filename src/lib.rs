//! Better Playwright MCP - token-efficient browser automation for AI agents
//!
//! This crate bridges the Model Context Protocol (MCP) to a separately
//! running Playwright HTTP server. Each MCP tool call becomes exactly one
//! HTTP request; the server owns the browser, the page outline and the
//! snapshot search.
//!
//! # Features
//!
//! - **MCP Server**: stdio JSON-RPC server exposing 13 page tools
//! - **HTTP Client**: typed [`PlaywrightClient`] for direct callers
//! - **Launcher**: starts and stops the Playwright server process
//!
//! # Architecture
//!
//! ```text
//! AI Agent ──stdio──▶ McpServer ──▶ ToolRegistry ──HTTP──▶ Playwright server
//!                                        │                   (pages, refs,
//!                                        ▼                    outline, search)
//!                                 PlaywrightClient
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use better_playwright_mcp::client::{PlaywrightClient, SearchOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PlaywrightClient::from_env()?;
//!
//!     let page = client.create_page("docs", "Rust docs", "https://doc.rust-lang.org").await?;
//!     println!("{}", client.get_outline(&page.page_id).await?);
//!
//!     let hits = client
//!         .search_snapshot(&page.page_id, "link .*Book", SearchOptions::default())
//!         .await?;
//!     println!("{}", hits.summary());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod launcher;
pub mod mcp;

// Re-exports for convenience
pub use client::PlaywrightClient;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use launcher::{LaunchConfig, ServerLauncher};
pub use mcp::{McpServer, McpTool};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
