// ABOUTME: Asynchronous command channel to the managed cluster's control plane.
// ABOUTME: Defines the channel trait, request/result types, and the dispatcher/poller.

mod arm;
mod error;
mod runner;

pub use arm::{ArmChannel, DEFAULT_API_VERSION, DEFAULT_ENDPOINT};
pub use error::CommandError;
pub use runner::{CommandRunner, PendingCommand, PollPolicy};

use async_trait::async_trait;
use std::time::Duration;

use crate::types::OperationId;

/// A command to run on the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    command: String,
    context: Option<String>,
    output_file: Option<String>,
}

impl CommandRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            context: None,
            output_file: None,
        }
    }

    /// Attach a base64-encoded archive unpacked next to the command.
    pub fn with_context(mut self, encoded: impl Into<String>) -> Self {
        self.context = Some(encoded.into());
        self
    }

    /// Persist the captured logs to the named file before the result is evaluated.
    pub fn capture_to(mut self, file_name: impl Into<String>) -> Self {
        self.output_file = Some(file_name.into());
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn output_file(&self) -> Option<&str> {
        self.output_file.as_deref()
    }
}

/// Terminal state of a remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    Succeeded,
    Failed,
}

/// What the control plane reports for a finished operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub state: TerminalState,
    pub logs: String,
    pub exit_code: Option<i32>,
    pub reason: Option<String>,
}

impl CommandResult {
    pub fn succeeded(logs: impl Into<String>, exit_code: i32) -> Self {
        Self {
            state: TerminalState::Succeeded,
            logs: logs.into(),
            exit_code: Some(exit_code),
            reason: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            state: TerminalState::Failed,
            logs: String::new(),
            exit_code: None,
            reason: Some(reason.into()),
        }
    }
}

/// Outcome of submitting a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The command is running; poll the operation for its result.
    Accepted {
        operation: OperationId,
        retry_after: Option<Duration>,
    },
    /// The control plane answered synchronously.
    Finished(CommandResult),
}

/// Progress of an accepted operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    Running { retry_after: Option<Duration> },
    Terminal(CommandResult),
}

/// Output of a command that ran to completion with exit code 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub logs: String,
    pub exit_code: i32,
}

/// Transport to the remote command-execution endpoint.
#[async_trait]
pub trait CommandChannel: Send + Sync {
    /// Submit a command with an optional base64 context payload.
    async fn submit(
        &self,
        command: &str,
        context: Option<&str>,
    ) -> Result<Submission, CommandError>;

    /// Query the state of an accepted operation.
    async fn status(&self, operation: &OperationId) -> Result<OperationStatus, CommandError>;
}
