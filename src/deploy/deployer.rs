// ABOUTME: Entry point driving deploy and clean through the rollout states.
// ABOUTME: Owns the cluster handle, runner and stability settings for one cluster.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::channel::CommandRunner;
use crate::object::Resource;
use crate::stability::{Checker, JobBounds, StabilityReport, StrategyTable};
use crate::types::{ClusterHandle, CorrelationId};

use super::Rollout;
use super::error::DeployError;

/// Applies and deletes manifests on one managed cluster.
#[derive(Debug)]
pub struct Deployer {
    cluster: ClusterHandle,
    runner: Arc<CommandRunner>,
    table: StrategyTable,
    bounds: JobBounds,
    cancel: CancellationToken,
}

impl Deployer {
    pub fn new(cluster: ClusterHandle, runner: CommandRunner) -> Self {
        Self {
            cluster,
            runner: Arc::new(runner),
            table: StrategyTable::default(),
            bounds: JobBounds::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the kind → strategy table used during stability checks.
    pub fn with_strategies(mut self, table: StrategyTable) -> Self {
        self.table = table;
        self
    }

    pub fn with_job_bounds(mut self, bounds: JobBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Use a caller-owned token so every wait can be aborted from outside.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cluster(&self) -> &ClusterHandle {
        &self.cluster
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Apply `objects` and wait until each of them is stable.
    pub async fn deploy<R: Resource>(&self, objects: &[R]) -> Result<StabilityReport, DeployError> {
        let correlation = CorrelationId::generate();
        let span = self.span("deploy", &correlation);
        self.run_deploy(correlation, objects).instrument(span).await
    }

    /// Delete `objects`. No stability checks are run.
    pub async fn clean<R: Resource>(&self, objects: &[R]) -> Result<(), DeployError> {
        let correlation = CorrelationId::generate();
        let span = self.span("clean", &correlation);
        self.run_clean(correlation, objects).instrument(span).await
    }

    async fn run_deploy<R: Resource>(
        &self,
        correlation: CorrelationId,
        objects: &[R],
    ) -> Result<StabilityReport, DeployError> {
        tracing::info!(objects = objects.len(), "deploy started");

        let rollout = Rollout::package(correlation, objects)?;
        tracing::info!("applying manifests");
        let submitted = rollout.apply(&self.runner, &self.cancel).await?;
        let applied = submitted.await_completion(&self.runner, &self.cancel).await?;

        tracing::info!("waiting for resources to be stable");
        let checker = Arc::new(Checker::new(
            Arc::clone(&self.runner),
            self.table.clone(),
            self.bounds,
        ));
        let report = applied.settle(checker, &self.cancel).await?.finish();

        tracing::info!(
            checked = report.checked,
            skipped = report.skipped,
            "deploy finished"
        );
        Ok(report)
    }

    async fn run_clean<R: Resource>(
        &self,
        correlation: CorrelationId,
        objects: &[R],
    ) -> Result<(), DeployError> {
        tracing::info!(objects = objects.len(), "clean started");

        let rollout = Rollout::package(correlation, objects)?;
        tracing::info!("deleting manifests");
        let submitted = rollout.delete(&self.runner, &self.cancel).await?;
        submitted.await_completion(&self.runner, &self.cancel).await?;

        tracing::info!("clean finished");
        Ok(())
    }

    fn span(&self, operation: &'static str, correlation: &CorrelationId) -> tracing::Span {
        tracing::info_span!(
            "rollout",
            operation,
            cluster = %self.cluster.name(),
            resource_group = %self.cluster.resource_group(),
            correlation_id = %correlation
        )
    }
}
