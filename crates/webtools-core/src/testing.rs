//! Scripted [`CommandRunner`] for tests
//!
//! Responses are handed out in order; every call records its invocation, a
//! copy of its environment, and the certificate bundle contents as they were
//! while the call was running.

use crate::environment::{ProcessEnvironment, SSL_CERT_FILE};
use crate::error::RunError;
use crate::runner::{CommandOutput, CommandRunner, LynxInvocation};
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::ffi::{OsStr, OsString};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// What the scripted runner does for one call
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Output(CommandOutput),
    Timeout,
    NotFound,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub invocation: LynxInvocation,
    pub env: BTreeMap<OsString, OsString>,
    pub cert_bundle: Option<Vec<u8>>,
}

impl RecordedCall {
    #[must_use]
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env.get(OsStr::new(key)).and_then(|value| value.to_str())
    }
}

#[derive(Debug, Default)]
pub struct ScriptedRunner {
    responses: Mutex<VecDeque<ScriptedResponse>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedRunner {
    pub fn new(responses: impl IntoIterator<Item = ScriptedResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(
        &self,
        invocation: &LynxInvocation,
        env: &ProcessEnvironment,
    ) -> Result<CommandOutput, RunError> {
        let cert_bundle = env
            .get(SSL_CERT_FILE)
            .and_then(|path| std::fs::read(path).ok());
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                invocation: invocation.clone(),
                env: env.to_map(),
                cert_bundle,
            });

        let response = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match response {
            Some(ScriptedResponse::Output(output)) => Ok(output),
            Some(ScriptedResponse::Timeout) => Err(RunError::Timeout {
                program: "lynx".to_string(),
                timeout: Duration::from_secs(30),
            }),
            Some(ScriptedResponse::NotFound) => Err(RunError::NotFound {
                program: "lynx".to_string(),
            }),
            None => Err(RunError::Io(std::io::Error::other(
                "no scripted response left",
            ))),
        }
    }
}
