//! Order Kafka Producer
//!
//! Publishes order events to the orders topic, keyed by customer id so that
//! every order of one customer lands on the same partition.

use async_trait::async_trait;
use order_events::{KafkaLogContext, KafkaSettings, OrderEvent};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use std::time::Duration;
use tracing::{debug, info};

/// Where the broker stored a published record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

/// Publishing seam of the producer loop.
///
/// Implementations own their broker connection; the loop owns the publisher.
#[async_trait]
pub trait OrderPublisher: Send + Sync {
    /// Publish one order and wait for the broker acknowledgment.
    async fn publish(&self, order: &OrderEvent) -> Result<DeliveryReport, ProducerError>;

    /// Block until queued records are delivered or `timeout` elapses.
    fn flush(&self, timeout: Duration) -> Result<(), ProducerError>;
}

/// rdkafka backed publisher
pub struct KafkaOrderPublisher {
    producer: FutureProducer<KafkaLogContext>,
    topic: String,
    delivery_timeout: Duration,
}

impl KafkaOrderPublisher {
    /// Create an idempotent producer that waits for all in-sync replicas.
    pub fn new(settings: &KafkaSettings, delivery_timeout: Duration) -> Result<Self, ProducerError> {
        let producer: FutureProducer<KafkaLogContext> = settings
            .client_config()
            .set("acks", "all")
            .set("enable.idempotence", "true")
            .set("retry.backoff.ms", "1000")
            .set("message.timeout.ms", delivery_timeout.as_millis().to_string())
            .create_with_context(KafkaLogContext::new("order-producer"))
            .map_err(|e| ProducerError::Kafka(e.to_string()))?;

        info!(
            brokers = %settings.bootstrap_servers,
            topic = %settings.topic,
            security_protocol = %settings.security_protocol,
            "Order producer initialized"
        );

        Ok(Self {
            producer,
            topic: settings.topic.clone(),
            delivery_timeout,
        })
    }
}

#[async_trait]
impl OrderPublisher for KafkaOrderPublisher {
    async fn publish(&self, order: &OrderEvent) -> Result<DeliveryReport, ProducerError> {
        let payload = order.to_json()?;

        let record = FutureRecord::to(&self.topic)
            .key(&order.customer_id)
            .payload(&payload);

        match self.producer.send(record, self.delivery_timeout).await {
            Ok((partition, offset)) => Ok(DeliveryReport {
                topic: self.topic.clone(),
                partition,
                offset,
            }),
            Err((err, _)) => Err(ProducerError::Kafka(err.to_string())),
        }
    }

    fn flush(&self, timeout: Duration) -> Result<(), ProducerError> {
        debug!(in_flight = self.producer.in_flight_count(), "Flushing order producer");
        self.producer
            .flush(timeout)
            .map_err(|e| ProducerError::Kafka(e.to_string()))
    }
}

/// Producer error types
#[derive(Debug, thiserror::Error)]
pub enum ProducerError {
    #[error("Kafka error: {0}")]
    Kafka(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
