//! Configuration for the order producer
use crate::producer_loop::ProducerLoopConfig;
use serde::Deserialize;
use std::time::Duration;

/// Loop timing, loaded from `PRODUCER_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ProducerConfig {
    /// Pause after a successful publish
    #[serde(default = "default_publish_interval_secs")]
    pub publish_interval_secs: u64,

    /// Pause after a failed publish
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// How long librdkafka may keep retrying one record
    #[serde(default = "default_delivery_timeout_secs")]
    pub delivery_timeout_secs: u64,
}

fn default_publish_interval_secs() -> u64 {
    5
}

fn default_retry_delay_secs() -> u64 {
    10
}

fn default_delivery_timeout_secs() -> u64 {
    30
}

impl ProducerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("PRODUCER_").from_env()
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_secs)
    }

    pub fn loop_config(&self) -> ProducerLoopConfig {
        ProducerLoopConfig {
            publish_interval: Duration::from_secs(self.publish_interval_secs),
            retry_delay: Duration::from_secs(self.retry_delay_secs),
        }
    }
}
