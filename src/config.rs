//! Client configuration
//!
//! Resolves where the Playwright HTTP server lives. The base URL comes from
//! `BETTER_PLAYWRIGHT_URL` when set, otherwise [`DEFAULT_BASE_URL`].

use crate::error::{Error, Result};
use tracing::debug;
use url::Url;

/// Environment variable overriding the server base URL
pub const BASE_URL_ENV_VAR: &str = "BETTER_PLAYWRIGHT_URL";

/// Base URL used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:3102";

/// Configuration for [`PlaywrightClient`](crate::client::PlaywrightClient)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
}

impl ClientConfig {
    /// Create a config for the given base URL
    ///
    /// The URL must parse as an absolute URL. A trailing slash is dropped so
    /// request paths can be appended directly.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let raw = base_url.as_ref().trim();
        Url::parse(raw).map_err(|e| Error::config(format!("invalid base URL {raw:?}: {e}")))?;

        Ok(Self {
            base_url: raw.trim_end_matches('/').to_string(),
        })
    }

    /// Read the base URL from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the base URL through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(BASE_URL_ENV_VAR).filter(|v| !v.trim().is_empty()) {
            Some(url) => {
                debug!("Using {} = {}", BASE_URL_ENV_VAR, url);
                Self::new(url)
            }
            None => Self::new(DEFAULT_BASE_URL),
        }
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for a server path such as `/api/pages`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url() {
        let config = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.base_url(), "http://localhost:3102");
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_env_override() {
        let config = ClientConfig::from_lookup(|key| {
            (key == BASE_URL_ENV_VAR).then(|| "http://10.0.0.5:4000/".to_string())
        })
        .unwrap();
        assert_eq!(config.base_url(), "http://10.0.0.5:4000");
    }

    #[test]
    fn test_empty_env_value_is_ignored() {
        let config = ClientConfig::from_lookup(|_| Some("  ".to_string())).unwrap();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_invalid_url_rejected() {
        let err = ClientConfig::new("not a url").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_endpoint_concatenates_path() {
        let config = ClientConfig::new("http://host:1/prefix/").unwrap();
        assert_eq!(
            config.endpoint("/api/pages/p1/outline"),
            "http://host:1/prefix/api/pages/p1/outline"
        );
    }
}
