//! rdkafka client context for the order services
//!
//! librdkafka reports broker-level problems (lost connections, auth failures)
//! out of band. Without a context they only reach stderr.

use rdkafka::client::ClientContext;
use rdkafka::consumer::ConsumerContext;
use rdkafka::error::{KafkaError, KafkaResult};
use rdkafka::TopicPartitionList;
use tracing::{debug, error, warn};

/// Logs client errors and commit results through `tracing`
#[derive(Debug, Clone, Copy)]
pub struct KafkaLogContext {
    client: &'static str,
}

impl KafkaLogContext {
    pub fn new(client: &'static str) -> Self {
        Self { client }
    }
}

impl ClientContext for KafkaLogContext {
    fn error(&self, error: KafkaError, reason: &str) {
        error!(client = self.client, error = %error, reason, "Kafka client error");
    }
}

impl ConsumerContext for KafkaLogContext {
    fn commit_callback(&self, result: KafkaResult<()>, offsets: &TopicPartitionList) {
        match result {
            Ok(()) => debug!(client = self.client, partitions = offsets.count(), "Offsets committed"),
            Err(e) => warn!(client = self.client, error = %e, "Offset commit failed"),
        }
    }
}
