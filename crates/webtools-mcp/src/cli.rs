//! Command-line arguments
//!
//! Unknown flags are skipped wherever they appear, along with any bare
//! values, so the server can be launched by MCP hosts that pass extra
//! arguments.

use anyhow::{Context, Result};
use clap::{Command, CommandFactory, Parser};
use std::ffi::OsString;
use std::path::PathBuf;
use webtools_config::WebToolsConfig;

#[derive(Parser, Debug, Default)]
#[command(name = "webtools-mcp")]
#[command(about = "Web Tools MCP server: lynx-backed websearch and fetch", long_about = None)]
#[command(ignore_errors = true)]
pub struct Cli {
    /// HTTP proxy URL (e.g., http://localhost:8080)
    #[arg(long, env = "WEBTOOLS_PROXY")]
    pub proxy: Option<String>,

    /// Config file (default: ~/.config/webtools/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// lynx executable to run
    #[arg(long)]
    pub lynx: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse `args` after dropping every flag this server does not define
    pub fn parse_known<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::parse_from(known_args(args))
    }

    /// Load the config file and apply command-line overrides
    pub fn load_config(&self) -> Result<WebToolsConfig> {
        let config = WebToolsConfig::load(self.config.as_deref())
            .context("Failed to load configuration")?
            .with_proxy(self.proxy.clone())
            .with_lynx_binary(self.lynx.clone());
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

/// Keep the program name, known flags and their values
fn known_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut command = Cli::command();
    command.build();

    let mut args = args.into_iter().map(Into::into);
    let mut kept: Vec<OsString> = args.next().into_iter().collect();

    while let Some(arg) = args.next() {
        let token = arg.to_string_lossy().into_owned();
        if token == "--" {
            break;
        }

        let takes_value = if let Some(long) = token.strip_prefix("--") {
            long_flag(&command, long)
        } else if let Some(shorts) = token.strip_prefix('-').filter(|s| !s.is_empty()) {
            short_flags(&command, shorts)
        } else {
            None
        };

        match takes_value {
            Some(true) => {
                kept.push(arg);
                kept.extend(args.next());
            }
            Some(false) => kept.push(arg),
            None => {}
        }
    }
    kept
}

/// `Some(needs next token)` for a known `--name` or `--name=value`
fn long_flag(command: &Command, flag: &str) -> Option<bool> {
    let (name, inline_value) = match flag.split_once('=') {
        Some((name, _)) => (name, true),
        None => (flag, false),
    };
    let arg = command.get_arguments().find(|a| a.get_long() == Some(name))?;
    Some(!inline_value && arg.get_action().takes_values())
}

/// `Some(needs next token)` when every character of `-abc` is a known short
fn short_flags(command: &Command, cluster: &str) -> Option<bool> {
    let mut chars = cluster.chars();
    while let Some(c) = chars.next() {
        let arg = command.get_arguments().find(|a| a.get_short() == Some(c))?;
        if arg.get_action().takes_values() {
            return Some(chars.as_str().is_empty());
        }
    }
    Some(false)
}
