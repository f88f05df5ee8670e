// ABOUTME: Stability verification strategies keyed by resource kind.
// ABOUTME: Classifies kinds, checks single objects, and fans checks out concurrently.

mod check;
mod coordinator;
mod error;

pub use check::{
    Checker, JobBounds, job_complete_command, job_logs_command, readiness_wait_command,
    rollout_status_command,
};
pub use coordinator::{StabilityReport, wait_stable};
pub use error::{CheckError, CheckStep, StabilityError};

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// Kinds understood by `kubectl rollout status`.
pub const WORKLOAD_KINDS: [&str; 3] = ["Deployment", "StatefulSet", "DaemonSet"];

/// How an object is verified to have reached its desired state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Wait for the controller to report a complete rollout.
    RolloutStatus,
    /// Wait for the Ready condition.
    ReadinessWait,
    /// Follow the job's logs, then wait for the Complete condition.
    JobCompletion,
    /// Nothing to wait for.
    NoCheck,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::RolloutStatus => "rollout-status",
            Strategy::ReadinessWait => "readiness-wait",
            Strategy::JobCompletion => "job-completion",
            Strategy::NoCheck => "no-check",
        };
        f.write_str(name)
    }
}

/// Built-in strategy for a kind. Unknown kinds are not checked.
pub fn classify(kind: &str) -> Strategy {
    match kind {
        "Deployment" | "StatefulSet" | "DaemonSet" => Strategy::RolloutStatus,
        "Pod" => Strategy::ReadinessWait,
        "Job" => Strategy::JobCompletion,
        _ => Strategy::NoCheck,
    }
}

/// Registered kind → strategy table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyTable {
    entries: HashMap<String, Strategy>,
}

impl StrategyTable {
    /// A table with no registered kinds; everything classifies as `NoCheck`.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register (or replace) the strategy for a kind, returning the previous one.
    pub fn register(&mut self, kind: impl Into<String>, strategy: Strategy) -> Option<Strategy> {
        self.entries.insert(kind.into(), strategy)
    }

    pub fn with(mut self, kind: impl Into<String>, strategy: Strategy) -> Self {
        self.register(kind, strategy);
        self
    }

    pub fn classify(&self, kind: &str) -> Strategy {
        self.entries.get(kind).copied().unwrap_or(Strategy::NoCheck)
    }
}

impl Default for StrategyTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for kind in WORKLOAD_KINDS {
            table.register(kind, Strategy::RolloutStatus);
        }
        table.register("Pod", Strategy::ReadinessWait);
        table.register("Job", Strategy::JobCompletion);
        table
    }
}
