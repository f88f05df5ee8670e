// ABOUTME: Error types for deploy and clean orchestration.
// ABOUTME: Each variant names the failing step and wraps its cause via snafu contexts.

use snafu::Snafu;
use std::fmt;

use crate::archive::ArchiveError;
use crate::channel::CommandError;
use crate::object::ObjectRef;
use crate::stability::{CheckError, StabilityError};

/// Orchestration steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Packaging,
    Submitting,
    AwaitingCompletion,
    CheckingStability,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Packaging => "packaging",
            Step::Submitting => "submitting",
            Step::AwaitingCompletion => "awaiting completion",
            Step::CheckingStability => "checking stability",
        };
        f.write_str(name)
    }
}

/// Failure of a deploy or clean call.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DeployError {
    #[snafu(display("packaging manifests: {source}"))]
    Packaging { source: ArchiveError },

    #[snafu(display("submitting kubectl {verb}: {source}"))]
    Submitting {
        verb: &'static str,
        source: CommandError,
    },

    #[snafu(display("running kubectl {verb}: {source}"))]
    AwaitingCompletion {
        verb: &'static str,
        source: CommandError,
    },

    #[snafu(display("waiting for resources to be stable: {source}"))]
    CheckingStability { source: StabilityError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    /// An object could not be serialized into the archive.
    Serialization,
    /// The control plane could not be reached.
    Connection,
    /// The control plane rejected the command.
    Dispatch,
    /// The command ran and exited non-zero.
    CommandFailure,
    /// The operation failed without reporting an exit code.
    TransportFailure,
    /// The caller cancelled while waiting.
    Cancelled,
    /// The credential was expired or rejected.
    Credential,
    /// Captured output could not be persisted.
    OutputFile,
    /// A check task panicked or was lost.
    Aborted,
}

impl DeployErrorKind {
    fn of_command(err: &CommandError) -> Self {
        match err {
            CommandError::Connection(_) => DeployErrorKind::Connection,
            CommandError::Dispatch(_) => DeployErrorKind::Dispatch,
            CommandError::CommandFailed { .. } => DeployErrorKind::CommandFailure,
            CommandError::TransportFailure { .. } => DeployErrorKind::TransportFailure,
            CommandError::Cancelled => DeployErrorKind::Cancelled,
            CommandError::Credential(_) => DeployErrorKind::Credential,
            CommandError::OutputFile { .. } => DeployErrorKind::OutputFile,
        }
    }
}

impl DeployError {
    /// The step that failed.
    pub fn step(&self) -> Step {
        match self {
            DeployError::Packaging { .. } => Step::Packaging,
            DeployError::Submitting { .. } => Step::Submitting,
            DeployError::AwaitingCompletion { .. } => Step::AwaitingCompletion,
            DeployError::CheckingStability { .. } => Step::CheckingStability,
        }
    }

    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::Packaging { .. } => DeployErrorKind::Serialization,
            DeployError::Submitting { source, .. }
            | DeployError::AwaitingCompletion { source, .. } => {
                DeployErrorKind::of_command(source)
            }
            DeployError::CheckingStability { source } => match source.first.command_error() {
                Some(err) => DeployErrorKind::of_command(err),
                None => DeployErrorKind::Aborted,
            },
        }
    }

    /// The first object whose stability check failed.
    pub fn failed_object(&self) -> Option<&ObjectRef> {
        self.check_error().and_then(CheckError::object)
    }

    /// Details of the first failed stability check.
    pub fn check_error(&self) -> Option<&CheckError> {
        match self {
            DeployError::CheckingStability { source } => Some(&source.first),
            _ => None,
        }
    }

    /// Number of stability failures reported after the first one.
    pub fn additional_failures(&self) -> usize {
        match self {
            DeployError::CheckingStability { source } => source.additional_failures,
            _ => 0,
        }
    }

    /// Exit code of the failing remote command, if one ran.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            DeployError::Packaging { .. } => None,
            DeployError::Submitting { source, .. }
            | DeployError::AwaitingCompletion { source, .. } => source.exit_code(),
            DeployError::CheckingStability { source } => {
                source.first.command_error().and_then(CommandError::exit_code)
            }
        }
    }
}
