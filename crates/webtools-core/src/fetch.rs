//! `fetch`: render a web page as plain text with lynx
//!
//! Proxied fetches that come back failed (non-zero exit, empty output, or a
//! bot-protection interstitial) are retried once with the plain ambient
//! environment, bypassing the proxy and its certificate bundle.

use crate::environment::{EnvironmentBuilder, ProcessEnvironment};
use crate::error::{Result, WebToolError};
use crate::runner::{CommandOutput, CommandRunner, LynxInvocation};
use std::sync::Arc;
use tracing::{debug, warn};
use webtools_config::WebToolsConfig;

#[derive(Clone)]
pub struct FetchHandler {
    config: Arc<WebToolsConfig>,
    runner: Arc<dyn CommandRunner>,
    environment: EnvironmentBuilder,
}

impl FetchHandler {
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

    /// Fetch `url` and return the rendered text.
    ///
    /// When the first attempt looks failed and a proxy is configured, the
    /// result of a single retry without the proxy is returned as-is.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let invocation = LynxInvocation::new(self.config.fetch.width, url);

        let first = {
            let env = self.environment.prepare().await?;
            self.attempt(&invocation, &env).await?
        };
        let text = first.text();

        if !self.looks_failed(&first, &text) {
            return Ok(text);
        }
        let Some(proxy) = self.environment.proxy() else {
            debug!("Fetch of {} looks failed, no proxy to bypass", url);
            return Ok(text);
        };
        if !self.config.fetch.retry_without_proxy {
            return Ok(text);
        }

        warn!(
            "Fetch of {} through proxy {} failed (exit {:?}, {} chars), retrying without proxy",
            url,
            proxy,
            first.exit_code,
            text.len()
        );
        let retry = self.attempt(&invocation, &self.environment.ambient()).await?;
        Ok(retry.text())
    }

    /// Non-zero exit, empty output, or a block marker in the output
    #[must_use]
    pub fn looks_failed(&self, output: &CommandOutput, text: &str) -> bool {
        !output.success() || text.is_empty() || self.config.fetch.is_blocked(text)
    }

    async fn attempt(
        &self,
        invocation: &LynxInvocation,
        env: &ProcessEnvironment,
    ) -> Result<CommandOutput> {
        debug!("Fetching: {}", invocation.url);
        self.runner.run(invocation, env).await.map_err(|e| {
            warn!("Fetch of {} failed: {}", invocation.url, e);
            WebToolError::from_run(e, &format!("Request to {}", invocation.url))
        })
    }
}
