// ABOUTME: Clean command implementation.
// ABOUTME: Deletes the objects described by the manifests without stability checks.

use super::connection::connect;
use super::manifests;
use settle::config::Config;
use settle::error::Result;
use settle::output::Output;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

pub async fn clean(
    config: Config,
    files: &[PathBuf],
    cancel: CancellationToken,
    output: &mut Output,
) -> Result<()> {
    output.start_timer();
    let objects = manifests::load(files)?;

    output.progress(&format!(
        "Deleting {} object(s) from {} ({})",
        objects.len(),
        config.cluster.name(),
        config.cluster.resource_group()
    ));

    let deployer = connect(&config, cancel, output).await?;
    deployer.clean(&objects).await?;

    output.success("Clean complete!");
    Ok(())
}
