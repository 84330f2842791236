//! Run lynx in dump mode

use crate::environment::ProcessEnvironment;
use crate::error::RunError;
use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;
use webtools_config::LynxConfig;

/// A single `lynx -dump` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LynxInvocation {
    pub width: u16,
    pub url: String,
}

impl LynxInvocation {
    pub fn new(width: u16, url: impl Into<String>) -> Self {
        Self {
            width,
            url: url.into(),
        }
    }

    /// Dump mode, no trailing link list, fixed width
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        vec![
            "-dump".to_string(),
            "-nolist".to_string(),
            format!("-width={}", self.width),
            self.url.clone(),
        ]
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn exited(exit_code: i32, stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stdout decoded as lossy UTF-8 with surrounding whitespace trimmed
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).trim().to_string()
    }
}

/// Runs lynx invocations; implemented by [`LynxRunner`] and by test doubles
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        invocation: &LynxInvocation,
        env: &ProcessEnvironment,
    ) -> Result<CommandOutput, RunError>;
}

/// Spawns the real lynx binary with a bounded run time
#[derive(Debug, Clone)]
pub struct LynxRunner {
    binary: String,
    timeout: Duration,
}

impl LynxRunner {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    #[must_use]
    pub fn from_config(config: &LynxConfig) -> Self {
        Self::new(config.binary.clone(), config.timeout())
    }
}

#[async_trait]
impl CommandRunner for LynxRunner {
    async fn run(
        &self,
        invocation: &LynxInvocation,
        env: &ProcessEnvironment,
    ) -> Result<CommandOutput, RunError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(invocation.args())
            .env_clear()
            .envs(env.vars())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(
            "Running {} {}",
            self.binary,
            invocation.args().join(" ")
        );

        let output = match timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == io::ErrorKind::NotFound => {
                return Err(RunError::NotFound {
                    program: self.binary.clone(),
                });
            }
            Ok(Err(e)) => return Err(RunError::Io(e)),
            // dropping the output future kills the child
            Err(_) => {
                return Err(RunError::Timeout {
                    program: self.binary.clone(),
                    timeout: self.timeout,
                });
            }
        };

        let output = CommandOutput {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        };
        if !output.stderr.is_empty() {
            debug!("lynx stderr: {}", String::from_utf8_lossy(&output.stderr).trim());
        }
        debug!(
            "lynx exited with {:?}, {} bytes of output",
            output.exit_code,
            output.stdout.len()
        );
        Ok(output)
    }
}
