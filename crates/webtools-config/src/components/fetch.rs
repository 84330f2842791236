//! Page fetch configuration

use serde::{Deserialize, Serialize};

/// Column width for rendered pages
pub const DEFAULT_FETCH_WIDTH: u16 = 120;

/// Interstitial text served by bot-protection pages
pub const JAVASCRIPT_REQUIRED_MARKER: &str = "Enable JavaScript and cookies to continue";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub width: u16,
    /// Retry once without the proxy when a proxied fetch looks failed
    pub retry_without_proxy: bool,
    /// Output containing any of these phrases counts as a failed fetch
    pub block_markers: Vec<String>,
}

impl FetchConfig {
    /// Whether `output` contains one of the configured block markers
    #[must_use]
    pub fn is_blocked(&self, output: &str) -> bool {
        self.block_markers
            .iter()
            .any(|marker| !marker.is_empty() && output.contains(marker.as_str()))
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_FETCH_WIDTH,
            retry_without_proxy: true,
            block_markers: vec![JAVASCRIPT_REQUIRED_MARKER.to_string()],
        }
    }
}
