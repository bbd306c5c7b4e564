//! Configuration for the order consumer
use crate::consumer_loop::ConsumerLoopConfig;
use crate::processor::StageDelays;
use serde::Deserialize;
use std::time::Duration;

/// Loop and stage timing, loaded from `CONSUMER_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ConsumerConfig {
    /// Pause after a consume error
    #[serde(default = "default_error_backoff_secs")]
    pub error_backoff_secs: u64,

    #[serde(default = "default_validation_delay_ms")]
    pub validation_delay_ms: u64,

    /// Per line item
    #[serde(default = "default_item_delay_ms")]
    pub item_delay_ms: u64,

    #[serde(default = "default_persist_delay_ms")]
    pub persist_delay_ms: u64,
}

fn default_error_backoff_secs() -> u64 {
    5
}

fn default_validation_delay_ms() -> u64 {
    100
}

fn default_item_delay_ms() -> u64 {
    50
}

fn default_persist_delay_ms() -> u64 {
    200
}

impl ConsumerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("CONSUMER_").from_env()
    }

    pub fn loop_config(&self) -> ConsumerLoopConfig {
        ConsumerLoopConfig {
            error_backoff: Duration::from_secs(self.error_backoff_secs),
        }
    }

    pub fn stage_delays(&self) -> StageDelays {
        StageDelays {
            validation: Duration::from_millis(self.validation_delay_ms),
            per_item: Duration::from_millis(self.item_delay_ms),
            persistence: Duration::from_millis(self.persist_delay_ms),
        }
    }
}
