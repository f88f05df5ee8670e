// ABOUTME: Command dispatcher and operation poller built on a CommandChannel.
// ABOUTME: Waits with backoff or the remote's Retry-After hint, honouring cancellation.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::error::CommandError;
use super::{
    CommandChannel, CommandOutput, CommandRequest, CommandResult, OperationStatus, Submission,
    TerminalState,
};
use crate::sink::OutputSink;
use crate::types::OperationId;

/// Shortest wait a `Retry-After` hint can ask for.
const MIN_HINTED_DELAY: Duration = Duration::from_secs(1);

/// Delay between status polls when the remote gives no hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// First delay.
    pub interval: Duration,
    /// Upper bound for the doubling backoff.
    pub max_interval: Duration,
}

impl PollPolicy {
    fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_interval)
    }

    /// A zero or tiny hint would poll back-to-back.
    fn hinted_delay(&self, hint: Duration) -> Duration {
        hint.max(self.interval.min(MIN_HINTED_DELAY))
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_interval: Duration::from_secs(30),
        }
    }
}

/// A submitted command that has not been waited on yet.
///
/// `wait` consumes it, so each operation is polled to a terminal state once.
#[derive(Debug)]
#[must_use = "a submitted command must be waited on"]
pub struct PendingCommand {
    request: CommandRequest,
    state: Pending,
}

#[derive(Debug)]
enum Pending {
    Accepted {
        operation: OperationId,
        retry_after: Option<Duration>,
    },
    Finished(CommandResult),
}

/// Submits commands and waits for their results.
pub struct CommandRunner {
    channel: Arc<dyn CommandChannel>,
    sink: OutputSink,
    poll: PollPolicy,
}

impl std::fmt::Debug for CommandRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRunner")
            .field("channel", &"<dyn CommandChannel>")
            .field("sink", &self.sink)
            .field("poll", &self.poll)
            .finish()
    }
}

impl CommandRunner {
    pub fn new(channel: Arc<dyn CommandChannel>) -> Self {
        Self {
            channel,
            sink: OutputSink::default(),
            poll: PollPolicy::default(),
        }
    }

    pub fn with_sink(mut self, sink: OutputSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn sink(&self) -> &OutputSink {
        &self.sink
    }

    /// Submit a command. Fails if the control plane rejects it or cannot be reached.
    pub async fn submit(&self, request: CommandRequest) -> Result<PendingCommand, CommandError> {
        tracing::info!(command = %request.command(), "submitting command");

        let state = match self
            .channel
            .submit(request.command(), request.context())
            .await?
        {
            Submission::Accepted {
                operation,
                retry_after,
            } => {
                tracing::debug!(operation = %operation, "command accepted");
                Pending::Accepted {
                    operation,
                    retry_after,
                }
            }
            Submission::Finished(result) => Pending::Finished(result),
        };

        Ok(PendingCommand { request, state })
    }

    /// Wait until the command is terminal and evaluate its result.
    ///
    /// Captured logs are written to the requested output file before the exit
    /// code is looked at, so they survive a failing command.
    pub async fn wait(
        &self,
        pending: PendingCommand,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, CommandError> {
        let PendingCommand { request, state } = pending;

        let result = match state {
            Pending::Finished(result) => result,
            Pending::Accepted {
                operation,
                retry_after,
            } => self.poll_until_done(&operation, retry_after, cancel).await?,
        };

        tracing::debug!(
            command = %request.command(),
            exit_code = ?result.exit_code,
            logs = %result.logs,
            "command output"
        );

        if let Some(file) = request.output_file() {
            self.sink
                .write(file, &result.logs)
                .await
                .map_err(|source| CommandError::OutputFile {
                    path: self.sink.path_for(file),
                    source,
                })?;
        }

        evaluate(result)
    }

    /// Submit a command and wait for it.
    pub async fn run(
        &self,
        request: CommandRequest,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, CommandError> {
        if cancel.is_cancelled() {
            return Err(CommandError::Cancelled);
        }
        let pending = self.submit(request).await?;
        self.wait(pending, cancel).await
    }

    async fn poll_until_done(
        &self,
        operation: &OperationId,
        mut hint: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<CommandResult, CommandError> {
        let mut backoff = self.poll.interval;

        loop {
            let delay = match hint.take() {
                Some(hint) => self.poll.hinted_delay(hint),
                None => {
                    let delay = backoff;
                    backoff = self.poll.next_delay(backoff);
                    delay
                }
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(CommandError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }

            let status = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(CommandError::Cancelled),
                status = self.channel.status(operation) => status?,
            };

            match status {
                OperationStatus::Terminal(result) => return Ok(result),
                OperationStatus::Running { retry_after } => {
                    tracing::trace!(operation = %operation, "operation still running");
                    hint = retry_after;
                }
            }
        }
    }
}

fn evaluate(result: CommandResult) -> Result<CommandOutput, CommandError> {
    match (result.state, result.exit_code) {
        (_, Some(code)) if code != 0 => Err(CommandError::CommandFailed { exit_code: code }),
        (TerminalState::Succeeded, code) => Ok(CommandOutput {
            logs: result.logs,
            exit_code: code.unwrap_or(0),
        }),
        (TerminalState::Failed, _) => Err(CommandError::TransportFailure {
            reason: result.reason,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_requires_zero_exit() {
        let output = evaluate(CommandResult::succeeded("ok", 0)).unwrap();
        assert_eq!(output.logs, "ok");
        assert_eq!(output.exit_code, 0);
    }

    #[test]
    fn nonzero_exit_is_command_failure() {
        let err = evaluate(CommandResult::succeeded("boom", 3)).unwrap_err();
        assert_eq!(err.exit_code(), Some(3));
    }

    #[test]
    fn failed_state_with_exit_code_reports_the_code() {
        let mut result = CommandResult::failed("pod crashed");
        result.exit_code = Some(1);
        assert!(matches!(
            evaluate(result),
            Err(CommandError::CommandFailed { exit_code: 1 })
        ));
    }

    #[test]
    fn failed_state_without_exit_code_is_transport_failure() {
        let err = evaluate(CommandResult::failed("node lost")).unwrap_err();
        assert!(matches!(
            &err,
            CommandError::TransportFailure { reason: Some(r) } if r == "node lost"
        ));
        assert!(err.to_string().contains("node lost"));
    }

    #[test]
    fn succeeded_without_exit_code_counts_as_zero() {
        let mut result = CommandResult::succeeded("", 0);
        result.exit_code = None;
        assert_eq!(evaluate(result).unwrap().exit_code, 0);
    }

    #[test]
    fn backoff_doubles_up_to_cap() {
        let policy = PollPolicy {
            interval: Duration::from_secs(5),
            max_interval: Duration::from_secs(12),
        };
        assert_eq!(policy.next_delay(Duration::from_secs(5)), Duration::from_secs(10));
        assert_eq!(policy.next_delay(Duration::from_secs(10)), Duration::from_secs(12));
    }
}
