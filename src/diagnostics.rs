// ABOUTME: Diagnostics accumulator for non-fatal warnings during a deploy.
// ABOUTME: Collects failures that were superseded by an earlier error so they are not lost silently.

/// Collects non-fatal warnings.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// A check failure reported after the first one.
    pub fn discarded_failure(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::DiscardedFailure,
            message: format!("additional stability failure: {}", message.into()),
        }
    }
}

/// Categories of warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A sibling check failed after the first failure was already recorded.
    DiscardedFailure,
}
