// ABOUTME: State transition methods for deploy and clean orchestration.
// ABOUTME: Each method consumes self and returns the next state on success.

use snafu::ResultExt;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::archive::ManifestArchive;
use crate::channel::{CommandError, CommandRequest, CommandRunner};
use crate::object::Resource;
use crate::stability::{Checker, StabilityReport, wait_stable};
use crate::types::CorrelationId;

use super::Rollout;
use super::error::{
    AwaitingCompletionSnafu, CheckingStabilitySnafu, DeployError, PackagingSnafu, SubmittingSnafu,
};
use super::state::{Applied, Apply, Delete, Packaged, Settled, Submitted, Verb};

// =============================================================================
// Packaging
// =============================================================================

impl Rollout<Packaged> {
    /// Serialize every object into the manifest archive and encode it.
    ///
    /// Fails as a whole if any object cannot be serialized.
    pub fn package<R: Resource>(
        correlation: CorrelationId,
        objects: &[R],
    ) -> Result<Self, DeployError> {
        let archive = ManifestArchive::build(objects).context(PackagingSnafu)?;
        let payload = archive.encode().context(PackagingSnafu)?;

        tracing::debug!(
            entries = archive.len(),
            encoded_bytes = payload.len(),
            "manifests packaged"
        );

        Ok(Rollout {
            correlation,
            objects: objects.iter().map(Resource::object_ref).collect(),
            state: Packaged { archive, payload },
        })
    }

    /// The archive that will be shipped with the command.
    pub fn archive(&self) -> &ManifestArchive {
        &self.state.archive
    }

    /// Base64 form of the archive.
    pub fn payload(&self) -> &str {
        &self.state.payload
    }

    /// Submit `kubectl apply` with the archive as context.
    pub async fn apply(
        self,
        runner: &CommandRunner,
        cancel: &CancellationToken,
    ) -> Result<Rollout<Submitted<Apply>>, DeployError> {
        self.submit::<Apply>(runner, cancel).await
    }

    /// Submit `kubectl delete` with the archive as context.
    pub async fn delete(
        self,
        runner: &CommandRunner,
        cancel: &CancellationToken,
    ) -> Result<Rollout<Submitted<Delete>>, DeployError> {
        self.submit::<Delete>(runner, cancel).await
    }

    /// Nothing is sent once `cancel` has fired.
    async fn submit<V: Verb>(
        self,
        runner: &CommandRunner,
        cancel: &CancellationToken,
    ) -> Result<Rollout<Submitted<V>>, DeployError> {
        if cancel.is_cancelled() {
            tracing::warn!(verb = V::NAME, "cancelled before submitting");
            return Err(CommandError::Cancelled).context(SubmittingSnafu { verb: V::NAME });
        }

        let request = CommandRequest::new(V::COMMAND).with_context(self.state.payload.as_str());
        let pending = runner
            .submit(request)
            .await
            .context(SubmittingSnafu { verb: V::NAME })?;

        Ok(self.transition(Submitted {
            pending,
            _verb: PhantomData,
        }))
    }
}

// =============================================================================
// Completion
// =============================================================================

impl<V: Verb> Rollout<Submitted<V>> {
    /// Poll the submitted command until it is terminal.
    ///
    /// A non-zero exit or a failed operation is an error; cancellation stops
    /// the local wait only.
    pub async fn await_completion(
        self,
        runner: &CommandRunner,
        cancel: &CancellationToken,
    ) -> Result<Rollout<V::Completed>, DeployError> {
        let Rollout {
            correlation,
            objects,
            state,
        } = self;

        let output = runner
            .wait(state.pending, cancel)
            .await
            .context(AwaitingCompletionSnafu { verb: V::NAME })?;

        tracing::info!(verb = V::NAME, exit_code = output.exit_code, "command completed");

        Ok(Rollout {
            correlation,
            objects,
            state: V::Completed::default(),
        })
    }
}

// =============================================================================
// Stability
// =============================================================================

impl Rollout<Applied> {
    /// Wait for every applied object to become stable.
    pub async fn settle(
        self,
        checker: Arc<Checker>,
        cancel: &CancellationToken,
    ) -> Result<Rollout<Settled>, DeployError> {
        let report = wait_stable(checker, self.objects.clone(), cancel.clone())
            .await
            .context(CheckingStabilitySnafu)?;

        Ok(self.transition(Settled { report }))
    }
}

impl Rollout<Settled> {
    /// Stability summary of the finished rollout.
    pub fn finish(self) -> StabilityReport {
        self.state.report
    }
}
