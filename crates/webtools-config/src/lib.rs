//! Configuration for the web tools MCP server
//!
//! Settings come from an optional TOML file, overridden by command-line flags.
//! Every field has a default, so an empty or missing file is valid.
//!
//! ```toml
//! proxy = "http://localhost:8080"
//!
//! [lynx]
//! binary = "lynx"
//! timeout_secs = 30
//!
//! [search]
//! width = 200
//!
//! [fetch]
//! width = 120
//! retry_without_proxy = true
//! ```

mod components;
mod error;

pub use components::certificates::expand_home;
pub use components::fetch::{DEFAULT_FETCH_WIDTH, JAVASCRIPT_REQUIRED_MARKER};
pub use components::lynx::{DEFAULT_LYNX_BINARY, DEFAULT_TIMEOUT_SECS};
pub use components::search::{DEFAULT_SEARCH_ENDPOINT, DEFAULT_SEARCH_WIDTH};
pub use components::{CertificatesConfig, FetchConfig, LynxConfig, SearchConfig};
pub use error::{ConfigError, Result};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level configuration, built once at startup and shared read-only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebToolsConfig {
    /// HTTP proxy handed to lynx as `http_proxy` / `https_proxy`
    pub proxy: Option<String>,
    pub lynx: LynxConfig,
    pub search: SearchConfig,
    pub fetch: FetchConfig,
    pub certificates: CertificatesConfig,
}

impl WebToolsConfig {
    /// Load configuration from `path`, or from the default location.
    ///
    /// An explicit path must exist. A missing file at the default location
    /// yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::from_file(path)
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Read and validate a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&contents)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// `<config_dir>/webtools/config.toml`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("webtools").join("config.toml"))
    }

    /// Replace the proxy when `proxy` is set; keeps the file value otherwise
    #[must_use]
    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        if proxy.is_some() {
            self.proxy = proxy;
        }
        self
    }

    /// Replace the lynx executable when `binary` is set
    #[must_use]
    pub fn with_lynx_binary(mut self, binary: Option<String>) -> Self {
        if let Some(binary) = binary {
            self.lynx.binary = binary;
        }
        self
    }

    /// Configured proxy URL, treating an empty string as unset
    #[must_use]
    pub fn proxy_url(&self) -> Option<&str> {
        self.proxy.as_deref().filter(|proxy| !proxy.is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(proxy) = self.proxy_url() {
            validate_proxy(proxy)?;
        }
        if self.lynx.binary.trim().is_empty() {
            return Err(ConfigError::Invalid("lynx.binary must not be empty".to_string()));
        }
        if self.lynx.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "lynx.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.search.width == 0 || self.fetch.width == 0 {
            return Err(ConfigError::Invalid(
                "search.width and fetch.width must be greater than 0".to_string(),
            ));
        }
        if self.search.endpoint.is_empty() {
            return Err(ConfigError::Invalid("search.endpoint must not be empty".to_string()));
        }
        Ok(())
    }
}

fn validate_proxy(proxy: &str) -> Result<()> {
    let parsed = url::Url::parse(proxy).map_err(|e| ConfigError::InvalidProxy {
        url: proxy.to_string(),
        reason: e.to_string(),
    })?;
    // "localhost:8080" parses with "localhost" as the scheme and no host
    if parsed.host().is_none() {
        return Err(ConfigError::InvalidProxy {
            url: proxy.to_string(),
            reason: "missing host".to_string(),
        });
    }
    Ok(())
}
