// ABOUTME: Deploy command implementation.
// ABOUTME: Applies manifests and waits for every object to be stable.

use super::connection::connect;
use super::manifests;
use settle::config::Config;
use settle::error::Result;
use settle::output::Output;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

pub async fn deploy(
    config: Config,
    files: &[PathBuf],
    cancel: CancellationToken,
    output: &mut Output,
) -> Result<()> {
    output.start_timer();
    let objects = manifests::load(files)?;

    output.progress(&format!(
        "Deploying {} object(s) to {} ({})",
        objects.len(),
        config.cluster.name(),
        config.cluster.resource_group()
    ));

    let deployer = connect(&config, cancel, output).await?;

    output.progress("  → Applying manifests and waiting for stability...");
    let report = deployer.deploy(&objects).await?;

    output.deployed(report);
    Ok(())
}
