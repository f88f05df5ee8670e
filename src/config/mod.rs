// ABOUTME: Configuration types and parsing for settle.yml.
// ABOUTME: Handles YAML parsing, defaults, validation and file discovery.

mod deserialize;
mod init;
mod job;
mod poll;
mod stability;

pub use init::init_config;
pub use job::JobConfig;
pub use poll::PollConfig;
pub use stability::StabilityConfig;

use deserialize::{deserialize_cluster, deserialize_endpoint};

use crate::channel::{DEFAULT_API_VERSION, DEFAULT_ENDPOINT, PollPolicy};
use crate::credential::{DEFAULT_CREDENTIAL_ENV, EnvCredential};
use crate::error::{Error, Result};
use crate::sink::OutputSink;
use crate::stability::{JobBounds, StrategyTable};
use crate::types::ClusterHandle;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "settle.yml";
pub const CONFIG_FILENAME_ALT: &str = "settle.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".settle/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_cluster")]
    pub cluster: ClusterHandle,

    #[serde(default = "default_endpoint", deserialize_with = "deserialize_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_credential_env")]
    pub credential_env: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub job: JobConfig,

    #[serde(default)]
    pub stability: StabilityConfig,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_credential_env() -> String {
    DEFAULT_CREDENTIAL_ENV.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;

        // A relative output directory is relative to the config file.
        if config.output_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.output_dir = parent.join(&config.output_dir);
            }
        }

        tracing::debug!(path = %path.display(), cluster = %config.cluster.name(), "loaded config");
        Ok(config)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    pub fn validate(&self) -> Result<()> {
        self.poll.validate().map_err(Error::InvalidConfig)?;
        self.job.validate().map_err(Error::InvalidConfig)?;
        if self.api_version.trim().is_empty() {
            return Err(Error::InvalidConfig("api_version must not be empty".to_string()));
        }
        if self.credential_env.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "credential_env must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn template() -> Self {
        Config {
            cluster: ClusterHandle::new(
                "00000000-0000-0000-0000-000000000000",
                "my-resource-group",
                "my-cluster",
            ),
            endpoint: default_endpoint(),
            api_version: default_api_version(),
            credential_env: default_credential_env(),
            output_dir: default_output_dir(),
            poll: PollConfig::default(),
            job: JobConfig::default(),
            stability: StabilityConfig::default(),
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poll.policy()
    }

    pub fn job_bounds(&self) -> JobBounds {
        self.job.bounds()
    }

    pub fn strategy_table(&self) -> StrategyTable {
        self.stability.table()
    }

    pub fn sink(&self) -> OutputSink {
        OutputSink::new(&self.output_dir)
    }

    pub fn credential_source(&self) -> EnvCredential {
        EnvCredential::new(&self.credential_env)
    }
}
