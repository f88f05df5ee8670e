// ABOUTME: Deploy and clean orchestration using the type state pattern.
// ABOUTME: Exports state markers, the Rollout struct and the Deployer entry point.

mod deployer;
mod error;
mod rollout;
mod state;
mod transitions;

pub use deployer::Deployer;
pub use error::{DeployError, DeployErrorKind, Step};
pub use rollout::Rollout;
pub use state::{Applied, Apply, Delete, Deleted, Packaged, Settled, Submitted, Verb};
