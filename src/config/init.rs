// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates settle.yml template files.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::ClusterHandle;

use super::{CONFIG_FILENAME, Config};

/// Write a starter `settle.yml` into `dir`, returning its path.
pub fn init_config(dir: &Path, cluster: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::template();

    if let Some(id) = cluster {
        config.cluster = ClusterHandle::parse(id).map_err(|e| Error::InvalidConfig(e.to_string()))?;
    }

    let yaml = generate_template_yaml(&config);
    std::fs::write(&config_path, yaml)?;

    Ok(config_path)
}

fn generate_template_yaml(config: &Config) -> String {
    format!(
        r#"cluster: {}
# endpoint: {}
# credential_env: {}
output_dir: {}
poll:
  interval: {}
  max_interval: {}
job:
  pod_running_timeout: {}
  complete_timeout: {}
# Extra kinds to wait on (rollout-status, readiness-wait, job-completion, no-check)
# stability:
#   kinds:
#     Certificate: readiness-wait
"#,
        config.cluster,
        config.endpoint,
        config.credential_env,
        config.output_dir.display(),
        seconds(config.poll.interval),
        seconds(config.poll.max_interval),
        seconds(config.job.pod_running_timeout),
        seconds(config.job.complete_timeout),
    )
}

fn seconds(d: std::time::Duration) -> String {
    format!("{}s", d.as_secs())
}
