// ABOUTME: Builds a Deployer for the configured cluster.
// ABOUTME: Resolves the credential and wires channel, runner and stability settings.

use settle::channel::{ArmChannel, CommandRunner};
use settle::config::Config;
use settle::credential::CredentialProvider;
use settle::deploy::Deployer;
use settle::error::Result;
use settle::output::Output;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub async fn connect(config: &Config, cancel: CancellationToken, output: &Output) -> Result<Deployer> {
    let source = config.credential_source();
    output.progress(&format!(
        "  → Reading credential from ${}...",
        source.var()
    ));
    let credential = source.credential().await?;

    let channel = ArmChannel::new(&config.endpoint, config.cluster.clone(), credential)
        .api_version(&config.api_version);
    let runner = CommandRunner::new(Arc::new(channel))
        .with_sink(config.sink())
        .with_poll_policy(config.poll_policy());

    Ok(Deployer::new(config.cluster.clone(), runner)
        .with_strategies(config.strategy_table())
        .with_job_bounds(config.job_bounds())
        .with_cancellation(cancel))
}
