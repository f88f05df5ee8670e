// ABOUTME: Concurrent fan-out of stability checks, one task per object.
// ABOUTME: Joins every task and reports the first failure plus a count of the rest.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::error::{CheckError, StabilityError};
use super::{Checker, Strategy};
use crate::diagnostics::{Diagnostics, Warning};
use crate::object::ObjectRef;

/// Summary of a successful fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StabilityReport {
    /// Objects whose stability was verified by a command.
    pub checked: usize,
    /// Objects whose kind needs no check.
    pub skipped: usize,
}

/// Check every object concurrently.
///
/// A failing task does not cancel its siblings; all tasks are joined before
/// returning. The first failure (in completion order) is returned; the rest
/// are logged and counted.
pub async fn wait_stable(
    checker: Arc<Checker>,
    objects: Vec<ObjectRef>,
    cancel: CancellationToken,
) -> Result<StabilityReport, StabilityError> {
    let mut tasks = JoinSet::new();

    for object in objects {
        let checker = Arc::clone(&checker);
        let cancel = cancel.clone();
        let span = tracing::info_span!(
            "stability",
            kind = %object.kind(),
            name = %object.name(),
            namespace = %object.namespace()
        );

        tasks.spawn(
            async move {
                AssertUnwindSafe(checker.check(&object, &cancel))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| {
                        Err(CheckError::Panicked {
                            object: object.clone(),
                            message: panic_message(panic.as_ref()),
                        })
                    })
            }
            .instrument(span),
        );
    }

    let mut report = StabilityReport::default();
    let mut first: Option<CheckError> = None;
    let mut diagnostics = Diagnostics::default();

    while let Some(joined) = tasks.join_next().await {
        let outcome = joined.unwrap_or_else(|e| {
            Err(CheckError::Lost {
                reason: e.to_string(),
            })
        });

        match outcome {
            Ok(Strategy::NoCheck) => report.skipped += 1,
            Ok(_) => report.checked += 1,
            Err(err) if first.is_none() => {
                tracing::error!(error = %err, "stability check failed");
                first = Some(err);
            }
            Err(err) => diagnostics.warn(Warning::discarded_failure(err.to_string())),
        }
    }

    match first {
        Some(first) => Err(StabilityError {
            first,
            additional_failures: diagnostics.warnings().len(),
        }),
        None => Ok(report),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
