// ABOUTME: Entry point for the settle CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use settle::config::{self, Config};
use settle::error::{Error, Result};
use settle::output::{Output, OutputMode};
use std::env;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbose flag when set
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    if let Err(e) = run(cli, &mut output).await {
        match &e {
            Error::Deploy(err) => output.deploy_error(err),
            other => output.error(&other.to_string()),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &mut Output) -> Result<()> {
    let cwd = env::current_dir()?;

    match cli.command {
        Commands::Init { cluster, force } => {
            let path = config::init_config(&cwd, cluster.as_deref(), force)?;
            output.success(&format!("Created {}", path.display()));
            Ok(())
        }
        Commands::Deploy { files } => {
            let config = load_config(cli.config.as_deref(), &cwd)?;
            commands::deploy(config, &files, cancel_on_interrupt(), output).await
        }
        Commands::Clean { files } => {
            let config = load_config(cli.config.as_deref(), &cwd)?;
            commands::clean(config, &files, cancel_on_interrupt(), output).await
        }
        Commands::Classify { kinds } => {
            let config = match load_config(cli.config.as_deref(), &cwd) {
                Ok(config) => Some(config),
                Err(Error::ConfigNotFound(_)) if cli.config.is_none() => None,
                Err(e) => return Err(e),
            };
            commands::classify(config.as_ref(), &kinds, output);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>, cwd: &Path) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::discover(cwd),
    }
}

/// Token cancelled on Ctrl-C. Commands already running remotely are left alone.
fn cancel_on_interrupt() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, abandoning in-flight waits");
            token.cancel();
        }
    });
    cancel
}
