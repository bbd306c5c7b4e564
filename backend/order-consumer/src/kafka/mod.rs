//! Kafka integration for the order consumer

pub mod source;

pub use source::{ConsumerError, InboundMessage, KafkaOrderSource, OrderSource};
