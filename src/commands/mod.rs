// ABOUTME: Command module aggregator for the settle CLI.
// ABOUTME: Re-exports deploy, clean, and classify command handlers.

mod classify;
mod clean;
mod connection;
mod deploy;
mod manifests;

pub use classify::classify;
pub use clean::clean;
pub use deploy::deploy;
