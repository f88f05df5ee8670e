// ABOUTME: Status polling configuration.
// ABOUTME: Defines the first poll delay and the backoff ceiling.

use serde::Deserialize;
use std::time::Duration;

use crate::channel::PollPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,

    #[serde(default = "default_max_interval", with = "humantime_serde")]
    pub max_interval: Duration,
}

fn default_interval() -> Duration {
    PollPolicy::default().interval
}

fn default_max_interval() -> Duration {
    PollPolicy::default().max_interval
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            interval: default_interval(),
            max_interval: default_max_interval(),
        }
    }
}

impl PollConfig {
    pub fn policy(&self) -> PollPolicy {
        PollPolicy {
            interval: self.interval,
            max_interval: self.max_interval,
        }
    }

    pub(super) fn validate(&self) -> Result<(), String> {
        if self.interval.is_zero() {
            return Err("poll.interval must be greater than zero".to_string());
        }
        if self.max_interval < self.interval {
            return Err("poll.max_interval must not be shorter than poll.interval".to_string());
        }
        Ok(())
    }
}
