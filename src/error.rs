//! Error types for the Playwright MCP bridge
//!
//! This module provides the error hierarchy used across the HTTP client,
//! the MCP dispatcher and the server launcher, built with `thiserror`.

use thiserror::Error;

/// The main error type for bridge operations
#[derive(Error, Debug)]
pub enum Error {
    /// Errors talking to the Playwright HTTP server
    #[error(transparent)]
    Api(#[from] ApiError),

    /// MCP protocol and tool dispatch errors
    #[error(transparent)]
    Mcp(#[from] McpError),

    /// Server process launch errors
    #[error("Launch error: {0}")]
    Launch(#[from] LaunchError),

    /// Invalid configuration (bad base URL, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors returned by the Playwright HTTP server or the transport to it
#[derive(Error, Debug)]
pub enum ApiError {
    /// Server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body text
        body: String,
    },

    /// Request never produced a response (connection refused, etc.)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Success response whose body could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// MCP protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    /// Tool name not in the registry
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Tool arguments did not match the tool's schema
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments {
        /// Tool name
        tool: String,
        /// Deserialization failure
        message: String,
    },

    /// Invalid JSON-RPC params
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}

/// Errors from launching or stopping the Playwright server process
#[derive(Error, Debug)]
pub enum LaunchError {
    /// Process could not be spawned
    #[error("Failed to spawn `{program}`: {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Operation requires a running server
    #[error("Server is not running")]
    NotRunning,

    /// Installing OS signal handlers failed
    #[error("Failed to install signal handler: {0}")]
    SignalSetup(String),

    /// Stopping the process failed
    #[error("Failed to stop server: {0}")]
    Stop(String),
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error from a string
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// HTTP status of the failed remote call, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(ApiError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Api(ApiError::Transport(err))
    }
}
