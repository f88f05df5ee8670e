// ABOUTME: Error types for per-object stability checks and their aggregate.
// ABOUTME: Failures carry the object's kind, name and namespace.

use std::fmt;

use crate::channel::CommandError;
use crate::object::ObjectRef;

/// Which command of a stability check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStep {
    RolloutStatus,
    Readiness,
    JobLogs,
    JobCompletion,
}

impl fmt::Display for CheckStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckStep::RolloutStatus => "rollout status",
            CheckStep::Readiness => "readiness wait",
            CheckStep::JobLogs => "job log follow",
            CheckStep::JobCompletion => "job completion wait",
        };
        f.write_str(name)
    }
}

/// Failure of a single object's stability check.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("{step} failed for {object}: {source}")]
    Command {
        object: ObjectRef,
        step: CheckStep,
        source: CommandError,
    },

    #[error("stability check for {object} panicked: {message}")]
    Panicked { object: ObjectRef, message: String },

    #[error("stability check task was lost: {reason}")]
    Lost { reason: String },
}

impl CheckError {
    /// The object whose check failed, when known.
    pub fn object(&self) -> Option<&ObjectRef> {
        match self {
            CheckError::Command { object, .. } | CheckError::Panicked { object, .. } => {
                Some(object)
            }
            CheckError::Lost { .. } => None,
        }
    }

    pub fn step(&self) -> Option<CheckStep> {
        match self {
            CheckError::Command { step, .. } => Some(*step),
            _ => None,
        }
    }

    pub fn command_error(&self) -> Option<&CommandError> {
        match self {
            CheckError::Command { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// First failing check of a fan-out, plus how many others also failed.
#[derive(Debug)]
pub struct StabilityError {
    pub first: CheckError,
    pub additional_failures: usize,
}

impl fmt::Display for StabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        if self.additional_failures > 0 {
            write!(
                f,
                " ({} more object(s) also failed)",
                self.additional_failures
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for StabilityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.first)
    }
}
