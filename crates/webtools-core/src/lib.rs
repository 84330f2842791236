//! Lynx-backed web tools
//!
//! Two operations share one environment builder:
//! - `search` - render a DuckDuckGo lite results page
//! - `fetch` - render an arbitrary URL, retrying once without the proxy when a
//!   proxied fetch comes back failed
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use webtools_config::WebToolsConfig;
//! use webtools_core::WebTools;
//!
//! let tools = WebTools::new(Arc::new(WebToolsConfig::default()));
//! let page = tools.fetch("https://example.com").await?;
//! ```

mod environment;
mod error;
mod fetch;
mod runner;
mod search;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use environment::*;
pub use error::{Result, RunError, WebToolError};
pub use fetch::FetchHandler;
pub use runner::*;
pub use search::{search_url, SearchHandler};

use std::sync::Arc;
use webtools_config::WebToolsConfig;

/// Search and fetch handlers built from one configuration
#[derive(Clone)]
pub struct WebTools {
    search: SearchHandler,
    fetch: FetchHandler,
}

impl WebTools {
    /// Tools backed by the configured lynx binary
    #[must_use]
    pub fn new(config: Arc<WebToolsConfig>) -> Self {
        let runner = Arc::new(LynxRunner::from_config(&config.lynx));
        Self::with_runner(config, runner)
    }

    pub fn with_runner(config: Arc<WebToolsConfig>, runner: Arc<dyn CommandRunner>) -> Self {
        let environment = EnvironmentBuilder::from_config(&config);
        Self::with_parts(config, runner, environment)
    }

    pub fn with_parts(
        config: Arc<WebToolsConfig>,
        runner: Arc<dyn CommandRunner>,
        environment: EnvironmentBuilder,
    ) -> Self {
        Self {
            search: SearchHandler::new(config.clone(), runner.clone(), environment.clone()),
            fetch: FetchHandler::new(config, runner, environment),
        }
    }

    pub async fn search(&self, query: &str) -> Result<String> {
        self.search.search(query).await
    }

    pub async fn fetch(&self, url: &str) -> Result<String> {
        self.fetch.fetch(url).await
    }
}
