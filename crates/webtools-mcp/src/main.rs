use anyhow::Result;
use rmcp::{transport::stdio, ServiceExt};
use std::sync::Arc;
use tracing::{error, info};
use webtools_mcp::{logging, Cli, WebToolsServer};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_known(std::env::args_os());
    logging::init_tracing(cli.verbose, cli.log_file.as_deref())?;

    let config = cli.load_config()?;

    info!("Starting Web Tools MCP server");
    info!("  lynx: {}", config.lynx.binary);
    match config.proxy_url() {
        Some(proxy) => info!("  proxy: {}", proxy),
        None => info!("  proxy: none"),
    }

    let server = WebToolsServer::from_config(Arc::new(config));

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {:?}", e);
    })?;

    service.waiting().await?;
    info!("Web Tools MCP server terminated");
    Ok(())
}
