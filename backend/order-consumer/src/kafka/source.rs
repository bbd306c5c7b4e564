//! Order Kafka Consumer
//!
//! Subscribes to the orders topic under a consumer group with auto-commit
//! disabled. Offsets only move when the consumer loop hands back a
//! [`Processed`] token.

use crate::commit::Processed;
use async_trait::async_trait;
use order_events::{KafkaLogContext, KafkaSettings};
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::{Offset, TopicPartitionList};
use tracing::info;

/// A consumed record, detached from the client's buffers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<String>,
    pub payload: Option<Vec<u8>>,
}

/// Consumption seam of the consumer loop.
#[async_trait]
pub trait OrderSource: Send {
    /// Wait for the next record of the subscription.
    async fn next_message(&mut self) -> Result<InboundMessage, ConsumerError>;

    /// Commit the position right after a processed record.
    async fn commit(&mut self, processed: Processed) -> Result<(), ConsumerError>;

    /// Leave the subscription. Called once when the loop exits.
    fn close(&mut self);
}

/// rdkafka backed source
pub struct KafkaOrderSource {
    consumer: StreamConsumer<KafkaLogContext>,
    topic: String,
}

impl KafkaOrderSource {
    /// Create a consumer and subscribe it to `settings.topic`.
    pub fn new(settings: &KafkaSettings) -> Result<Self, ConsumerError> {
        let consumer: StreamConsumer<KafkaLogContext> = settings
            .client_config()
            .set("group.id", &settings.group_id)
            .set("enable.auto.commit", "false") // Manual commit after processing
            .set("auto.offset.reset", settings.auto_offset_reset.as_str())
            .set("session.timeout.ms", settings.session_timeout_ms.to_string())
            .set("enable.partition.eof", "false")
            .create_with_context(KafkaLogContext::new("order-consumer"))
            .map_err(|e| ConsumerError::Kafka(e.to_string()))?;

        consumer
            .subscribe(&[settings.topic.as_str()])
            .map_err(|e| ConsumerError::Kafka(e.to_string()))?;

        info!(
            brokers = %settings.bootstrap_servers,
            topic = %settings.topic,
            group_id = %settings.group_id,
            auto_offset_reset = settings.auto_offset_reset.as_str(),
            "Order consumer initialized"
        );

        Ok(Self {
            consumer,
            topic: settings.topic.clone(),
        })
    }
}

#[async_trait]
impl OrderSource for KafkaOrderSource {
    async fn next_message(&mut self) -> Result<InboundMessage, ConsumerError> {
        let message = self
            .consumer
            .recv()
            .await
            .map_err(|e| ConsumerError::Kafka(e.to_string()))?;

        Ok(InboundMessage {
            topic: message.topic().to_string(),
            partition: message.partition(),
            offset: message.offset(),
            key: message
                .key()
                .map(|key| String::from_utf8_lossy(key).into_owned()),
            payload: message.payload().map(<[u8]>::to_vec),
        })
    }

    async fn commit(&mut self, processed: Processed) -> Result<(), ConsumerError> {
        let mut offsets = TopicPartitionList::new();
        offsets
            .add_partition_offset(
                processed.topic(),
                processed.partition(),
                Offset::Offset(processed.next_offset()),
            )
            .map_err(|e| ConsumerError::Commit(e.to_string()))?;

        self.consumer
            .commit(&offsets, CommitMode::Sync)
            .map_err(|e| ConsumerError::Commit(e.to_string()))
    }

    fn close(&mut self) {
        // Dropping the client closes it and leaves the group
        self.consumer.unsubscribe();
        info!(topic = %self.topic, "Order consumer unsubscribed");
    }
}

/// Consumer error types
#[derive(Debug, thiserror::Error)]
pub enum ConsumerError {
    #[error("Kafka error: {0}")]
    Kafka(String),

    #[error("Commit error: {0}")]
    Commit(String),
}
