// ABOUTME: Generic rollout struct parameterized by state marker.
// ABOUTME: Carries the correlation id and object identities through every state.

use crate::object::ObjectRef;
use crate::types::CorrelationId;

/// A deploy or clean in progress, parameterized by its current state.
///
/// The state type parameter `S` carries state-specific data (the archive, the
/// pending command, the stability report), so methods only exist on the
/// states where they make sense.
#[derive(Debug)]
pub struct Rollout<S> {
    pub(crate) correlation: CorrelationId,
    pub(crate) objects: Vec<ObjectRef>,
    pub(crate) state: S,
}

impl<S> Rollout<S> {
    /// Correlation id attached to every log line of this call.
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation
    }

    /// Identities of the packaged objects, in input order.
    pub fn objects(&self) -> &[ObjectRef] {
        &self.objects
    }

    pub(crate) fn transition<T>(self, state: T) -> Rollout<T> {
        Rollout {
            correlation: self.correlation,
            objects: self.objects,
            state,
        }
    }
}
