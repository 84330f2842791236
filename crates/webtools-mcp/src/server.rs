//! rmcp server exposing `websearch` and `fetch`
//!
//! Tool failures the caller should see (timeouts, missing lynx, failed exit
//! status) come back as error-flagged text results. Local I/O failures are
//! reported as MCP internal errors.

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo, Tool},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error};
use webtools_config::WebToolsConfig;
use webtools_core::{WebToolError, WebTools};

/// Parameters for `websearch`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WebSearchParams {
    /// Search terms
    pub query: String,
}

/// Parameters for `fetch`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct FetchParams {
    /// URL of the page to fetch
    pub url: String,
}

#[derive(Clone)]
pub struct WebToolsServer {
    web: WebTools,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl WebToolsServer {
    pub fn new(web: WebTools) -> Self {
        Self {
            web,
            tool_router: Self::tool_router(),
        }
    }

    /// Server backed by the real lynx binary
    pub fn from_config(config: Arc<WebToolsConfig>) -> Self {
        Self::new(WebTools::new(config))
    }

    /// Tool definitions as advertised to clients
    pub fn available_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    #[tool(description = "Search the web using DuckDuckGo via lynx and return results as text")]
    pub async fn websearch(
        &self,
        Parameters(params): Parameters<WebSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        debug!("websearch: {}", params.query);
        render(self.web.search(&params.query).await)
    }

    #[tool(description = "Fetch and convert a webpage to plain text using lynx")]
    pub async fn fetch(
        &self,
        Parameters(params): Parameters<FetchParams>,
    ) -> Result<CallToolResult, McpError> {
        debug!("fetch: {}", params.url);
        render(self.web.fetch(&params.url).await)
    }
}

fn render(result: Result<String, WebToolError>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
        Err(e) if e.is_user_facing() => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        Err(e) => {
            error!("Tool call failed: {}", e);
            Err(McpError::internal_error(e.to_string(), None))
        }
    }
}

#[tool_handler]
impl ServerHandler for WebToolsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Web tools backed by lynx. Use websearch to find pages and fetch to read \
                a page as plain text."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}
