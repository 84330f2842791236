//! Error types for webtools-core

use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the `websearch` and `fetch` tools.
///
/// Everything except [`WebToolError::Io`] is meant to be shown to the caller
/// as text; `Io` covers local failures (certificate bundle, spawn) and is
/// reported as an internal error instead.
#[derive(Error, Debug)]
pub enum WebToolError {
    #[error("Error: {target} timed out")]
    Timeout { target: String },

    #[error("Error: {program} is not installed. Install it with: brew install {program}")]
    MissingExecutable { program: String },

    #[error("Error: {program} command failed with exit code {code}")]
    CommandFailed { program: String, code: i32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WebToolError {
    /// Convert a runner failure, naming `target` in timeout messages
    pub fn from_run(error: RunError, target: &str) -> Self {
        match error {
            RunError::Timeout { .. } => Self::Timeout {
                target: target.to_string(),
            },
            RunError::NotFound { program } => Self::MissingExecutable {
                program: display_name(&program),
            },
            RunError::Io(e) => Self::Io(e),
        }
    }

    /// Whether the error should be rendered to the caller as tool output
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

/// Failures from running the external command
#[derive(Error, Debug)]
pub enum RunError {
    #[error("{program} timed out after {}s", .timeout.as_secs())]
    Timeout { program: String, timeout: Duration },

    #[error("{program} not found")]
    NotFound { program: String },

    #[error("Failed to run command: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WebToolError>;

/// File name of a configured binary, so `/opt/bin/lynx` reads as `lynx`
pub(crate) fn display_name(program: &str) -> String {
    Path::new(program)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_target() {
        let err = WebToolError::from_run(
            RunError::Timeout {
                program: "lynx".to_string(),
                timeout: Duration::from_secs(30),
            },
            "Request to https://example.com",
        );
        assert_eq!(err.to_string(), "Error: Request to https://example.com timed out");
        assert!(err.is_user_facing());
    }

    #[test]
    fn test_missing_executable_uses_file_name() {
        let err = WebToolError::from_run(
            RunError::NotFound {
                program: "/opt/homebrew/bin/lynx".to_string(),
            },
            "Search request",
        );
        assert_eq!(
            err.to_string(),
            "Error: lynx is not installed. Install it with: brew install lynx"
        );
    }

    #[test]
    fn test_command_failed_message() {
        let err = WebToolError::CommandFailed {
            program: "lynx".to_string(),
            code: 4,
        };
        assert_eq!(err.to_string(), "Error: lynx command failed with exit code 4");
    }

    #[test]
    fn test_io_is_not_user_facing() {
        let err = WebToolError::from_run(
            RunError::Io(std::io::Error::from(std::io::ErrorKind::PermissionDenied)),
            "Search request",
        );
        assert!(!err.is_user_facing());
    }
}
