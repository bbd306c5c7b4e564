//! Kafka integration for the order producer

pub mod producer;

pub use producer::{DeliveryReport, KafkaOrderPublisher, OrderPublisher, ProducerError};
