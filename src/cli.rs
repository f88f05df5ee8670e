// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "settle")]
#[command(about = "Apply Kubernetes manifests to a managed cluster and wait until they are stable")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to the configuration file (default: discover settle.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new settle.yml configuration file
    Init {
        /// Managed cluster resource id
        #[arg(long)]
        cluster: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Apply manifests and wait for every object to be stable
    Deploy {
        /// Manifest files (YAML or JSON, multi-document allowed)
        #[arg(short = 'f', long = "filename", required = true)]
        files: Vec<PathBuf>,
    },

    /// Delete the objects described by the manifests
    Clean {
        /// Manifest files (YAML or JSON, multi-document allowed)
        #[arg(short = 'f', long = "filename", required = true)]
        files: Vec<PathBuf>,
    },

    /// Show which stability check each kind gets
    Classify {
        /// Resource kinds, e.g. Deployment
        #[arg(required = true)]
        kinds: Vec<String>,
    },
}
