// ABOUTME: Rollout state types for the type state pattern.
// ABOUTME: States carry their own data; verb markers select apply or delete.

use std::marker::PhantomData;

use crate::archive::ManifestArchive;
use crate::channel::PendingCommand;
use crate::stability::StabilityReport;

/// Manifests serialized and encoded, nothing sent yet.
/// Available actions: `apply()`, `delete()`
#[derive(Debug)]
pub struct Packaged {
    pub(crate) archive: ManifestArchive,
    pub(crate) payload: String,
}

/// Command submitted to the cluster, result not yet known.
/// Available actions: `await_completion()`
#[derive(Debug)]
pub struct Submitted<V> {
    pub(crate) pending: PendingCommand,
    pub(crate) _verb: PhantomData<V>,
}

/// Apply finished successfully.
/// Available actions: `settle()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Applied;

/// Delete finished successfully. Terminal: deletion has no stability phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deleted;

/// Every object verified stable.
/// Available actions: `finish()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Settled {
    pub(crate) report: StabilityReport,
}

mod sealed {
    pub trait Sealed {}
}

/// Marker for `kubectl apply`.
#[derive(Debug)]
pub enum Apply {}

/// Marker for `kubectl delete`.
#[derive(Debug)]
pub enum Delete {}

impl sealed::Sealed for Apply {}
impl sealed::Sealed for Delete {}

/// What is done with the archive on the cluster and which state follows.
pub trait Verb: sealed::Sealed {
    /// Short name used in logs and errors.
    const NAME: &'static str;
    /// Command run next to the unpacked archive.
    const COMMAND: &'static str;
    /// State reached once the command completes.
    type Completed: Default;
}

impl Verb for Apply {
    const NAME: &'static str = "apply";
    const COMMAND: &'static str = "kubectl apply -f manifests/";
    type Completed = Applied;
}

impl Verb for Delete {
    const NAME: &'static str = "delete";
    const COMMAND: &'static str = "kubectl delete -f manifests/";
    type Completed = Deleted;
}
