// ABOUTME: Per-object stability checks issued as kubectl commands.
// ABOUTME: Jobs follow their logs into a file before waiting for completion.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::error::{CheckError, CheckStep};
use super::{Strategy, StrategyTable};
use crate::channel::{CommandError, CommandRequest, CommandRunner};
use crate::object::ObjectRef;
use crate::sink::job_log_name;

/// Bounds passed to kubectl for the two job steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobBounds {
    /// How long log-follow waits for the job's pod to start.
    pub pod_running_timeout: Duration,
    /// How long to wait for the Complete condition.
    pub complete_timeout: Duration,
}

impl Default for JobBounds {
    fn default() -> Self {
        Self {
            pod_running_timeout: Duration::from_secs(20),
            complete_timeout: Duration::from_secs(10),
        }
    }
}

/// Rounded up to whole milliseconds; kubectl reads `0s` as "do not wait".
fn kubectl_duration(d: Duration) -> String {
    let millis = d.as_nanos().div_ceil(1_000_000);
    if millis % 1000 == 0 {
        format!("{}s", millis / 1000)
    } else {
        format!("{millis}ms")
    }
}

pub fn rollout_status_command(object: &ObjectRef) -> String {
    format!(
        "kubectl rollout status {}/{} -n {}",
        object.kind(),
        object.name(),
        object.namespace()
    )
}

pub fn readiness_wait_command(object: &ObjectRef) -> String {
    format!(
        "kubectl wait --for=condition=Ready {}/{} -n {}",
        object.kind().to_ascii_lowercase(),
        object.name(),
        object.namespace()
    )
}

pub fn job_logs_command(object: &ObjectRef, bounds: &JobBounds) -> String {
    format!(
        "kubectl logs --pod-running-timeout={} --follow job/{} -n {}",
        kubectl_duration(bounds.pod_running_timeout),
        object.name(),
        object.namespace()
    )
}

pub fn job_complete_command(object: &ObjectRef, bounds: &JobBounds) -> String {
    format!(
        "kubectl wait --for=condition=complete --timeout={} job/{} -n {}",
        kubectl_duration(bounds.complete_timeout),
        object.name(),
        object.namespace()
    )
}

/// Classifies objects and runs the matching check through a runner.
#[derive(Debug)]
pub struct Checker {
    runner: Arc<CommandRunner>,
    table: StrategyTable,
    bounds: JobBounds,
}

impl Checker {
    pub fn new(runner: Arc<CommandRunner>, table: StrategyTable, bounds: JobBounds) -> Self {
        Self {
            runner,
            table,
            bounds,
        }
    }

    pub fn strategy_for(&self, kind: &str) -> Strategy {
        self.table.classify(kind)
    }

    /// Wait until the object is stable, returning the strategy that was applied.
    pub async fn check(
        &self,
        object: &ObjectRef,
        cancel: &CancellationToken,
    ) -> Result<Strategy, CheckError> {
        let strategy = self.strategy_for(object.kind());
        tracing::info!(%strategy, "checking stability of {}/{}", object.kind(), object.name());

        match strategy {
            Strategy::RolloutStatus => {
                self.step(
                    object,
                    CheckStep::RolloutStatus,
                    CommandRequest::new(rollout_status_command(object)),
                    cancel,
                )
                .await?;
            }
            Strategy::ReadinessWait => {
                self.step(
                    object,
                    CheckStep::Readiness,
                    CommandRequest::new(readiness_wait_command(object)),
                    cancel,
                )
                .await?;
            }
            Strategy::JobCompletion => {
                // Logs are captured first so they exist even if completion fails.
                self.step(
                    object,
                    CheckStep::JobLogs,
                    CommandRequest::new(job_logs_command(object, &self.bounds))
                        .capture_to(job_log_name(object)),
                    cancel,
                )
                .await?;
                self.step(
                    object,
                    CheckStep::JobCompletion,
                    CommandRequest::new(job_complete_command(object, &self.bounds)),
                    cancel,
                )
                .await?;
            }
            Strategy::NoCheck => {
                tracing::debug!("no stability check for kind {}", object.kind());
            }
        }

        Ok(strategy)
    }

    async fn step(
        &self,
        object: &ObjectRef,
        step: CheckStep,
        request: CommandRequest,
        cancel: &CancellationToken,
    ) -> Result<(), CheckError> {
        tracing::debug!(%step, "running check step");
        self.runner
            .run(request, cancel)
            .await
            .map(|_| ())
            .map_err(|source: CommandError| CheckError::Command {
                object: object.clone(),
                step,
                source,
            })
    }
}
