//! `websearch`: render a DuckDuckGo lite results page with lynx

use crate::environment::EnvironmentBuilder;
use crate::error::{display_name, Result, WebToolError};
use crate::runner::{CommandRunner, LynxInvocation};
use std::sync::Arc;
use tracing::{debug, warn};
use webtools_config::WebToolsConfig;

/// Search URL for `query`, with spaces replaced by `+`.
///
/// No other characters are escaped.
#[must_use]
pub fn search_url(endpoint: &str, query: &str) -> String {
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{endpoint}{separator}q={}", query.replace(' ', "+"))
}

#[derive(Clone)]
pub struct SearchHandler {
    config: Arc<WebToolsConfig>,
    runner: Arc<dyn CommandRunner>,
    environment: EnvironmentBuilder,
}

impl SearchHandler {
    pub fn new(
        config: Arc<WebToolsConfig>,
        runner: Arc<dyn CommandRunner>,
        environment: EnvironmentBuilder,
    ) -> Self {
        Self {
            config,
            runner,
            environment,
        }
    }

    /// Run a search and return the rendered results page.
    ///
    /// The exit status is ignored unless `search.check_exit_status` is set.
    pub async fn search(&self, query: &str) -> Result<String> {
        let url = search_url(&self.config.search.endpoint, query);
        let invocation = LynxInvocation::new(self.config.search.width, url);
        let env = self.environment.prepare().await?;

        debug!("Searching: {}", invocation.url);
        let output = self
            .runner
            .run(&invocation, &env)
            .await
            .map_err(|e| {
                warn!("Search for '{}' failed: {}", query, e);
                WebToolError::from_run(e, "Search request")
            })?;

        if self.config.search.check_exit_status && !output.success() {
            return Err(WebToolError::CommandFailed {
                program: display_name(&self.config.lynx.binary),
                code: output.exit_code.unwrap_or(-1),
            });
        }

        Ok(output.text())
    }
}
