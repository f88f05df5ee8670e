// ABOUTME: Error taxonomy for dispatching and polling remote commands.
// ABOUTME: Separates transport, rejection, remote failure and cancellation.

use std::path::PathBuf;

use crate::credential::CredentialError;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("control plane unreachable: {0}")]
    Connection(String),

    #[error("command rejected: {0}")]
    Dispatch(String),

    #[error("command failed with exit code {exit_code}")]
    CommandFailed { exit_code: i32 },

    #[error("operation failed without an exit code ({})", .reason.as_deref().unwrap_or("no reason reported"))]
    TransportFailure { reason: Option<String> },

    #[error("cancelled while waiting for the operation")]
    Cancelled,

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("failed to write output file {}: {source}", .path.display())]
    OutputFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CommandError {
    /// Whether the local wait was cancelled (the remote command may still run).
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CommandError::Cancelled)
    }

    /// Exit code reported by the remote command, if it ran and failed.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CommandError::CommandFailed { exit_code } => Some(*exit_code),
            _ => None,
        }
    }
}
