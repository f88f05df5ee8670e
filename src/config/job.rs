// ABOUTME: Job stability check configuration.
// ABOUTME: Bounds for following job logs and waiting for completion.

use serde::Deserialize;
use std::time::Duration;

use crate::stability::JobBounds;

#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    #[serde(default = "default_pod_running_timeout", with = "humantime_serde")]
    pub pod_running_timeout: Duration,

    #[serde(default = "default_complete_timeout", with = "humantime_serde")]
    pub complete_timeout: Duration,
}

fn default_pod_running_timeout() -> Duration {
    JobBounds::default().pod_running_timeout
}

fn default_complete_timeout() -> Duration {
    JobBounds::default().complete_timeout
}

impl Default for JobConfig {
    fn default() -> Self {
        JobConfig {
            pod_running_timeout: default_pod_running_timeout(),
            complete_timeout: default_complete_timeout(),
        }
    }
}

impl JobConfig {
    pub fn bounds(&self) -> JobBounds {
        JobBounds {
            pod_running_timeout: self.pod_running_timeout,
            complete_timeout: self.complete_timeout,
        }
    }

    pub(super) fn validate(&self) -> Result<(), String> {
        if self.pod_running_timeout.is_zero() || self.complete_timeout.is_zero() {
            return Err("job timeouts must be greater than zero".to_string());
        }
        Ok(())
    }
}
