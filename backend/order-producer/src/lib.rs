//! Order Producer - publishes synthetic order events
//!
//! One loop per process: generate an order, publish it keyed by customer id,
//! wait, repeat until shutdown.

pub mod config;
pub mod kafka;
pub mod producer_loop;

pub use config::ProducerConfig;
pub use kafka::{DeliveryReport, KafkaOrderPublisher, OrderPublisher, ProducerError};
pub use producer_loop::{ProducerLoop, ProducerLoopConfig, ProducerStats};
