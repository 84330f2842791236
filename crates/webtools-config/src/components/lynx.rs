//! Lynx executable configuration
//!
//! Which binary to run and how long a single invocation may take.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default executable name, resolved through `PATH`
pub const DEFAULT_LYNX_BINARY: &str = "lynx";

/// Default per-invocation timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LynxConfig {
    /// Executable name or path
    pub binary: String,
    /// Seconds before a running lynx process is killed
    pub timeout_secs: u64,
}

impl LynxConfig {
    /// Timeout as a [`Duration`]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LynxConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_LYNX_BINARY.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}
