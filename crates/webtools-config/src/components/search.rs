//! Web search configuration

use serde::{Deserialize, Serialize};

/// DuckDuckGo lite endpoint; the query is appended as `?q=`
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://lite.duckduckgo.com/lite/";

/// Column width for rendered search results
pub const DEFAULT_SEARCH_WIDTH: u16 = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub width: u16,
    /// Report a non-zero lynx exit as an error instead of returning its output.
    /// Off by default: search output is returned whatever the exit code.
    pub check_exit_status: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            width: DEFAULT_SEARCH_WIDTH,
            check_exit_status: false,
        }
    }
}
