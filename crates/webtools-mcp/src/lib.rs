//! Web Tools MCP server
//!
//! Exposes two tools over stdio:
//! - `websearch` - search DuckDuckGo lite and return the results as text
//! - `fetch` - render a web page as plain text
//!
//! Both shell out to `lynx -dump`. With `--proxy`, lynx runs behind the given
//! HTTP proxy and trusts the mitmproxy CA when one is installed.

pub mod cli;
pub mod logging;
pub mod server;

pub use cli::Cli;
pub use server::{FetchParams, WebSearchParams, WebToolsServer};
