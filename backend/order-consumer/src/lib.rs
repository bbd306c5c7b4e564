//! Order Consumer - reads order events and commits after processing
//!
//! Per message: Received → Deserialized → Processed → Committed. A message
//! that fails to deserialize or process is skipped without a commit, so it is
//! delivered again after a restart. The commit for a message is only issued
//! once its processing has completed (at-least-once delivery).

pub mod commit;
pub mod config;
pub mod consumer_loop;
pub mod kafka;
pub mod processor;

pub use commit::{CommitFloor, Processed};
pub use config::ConsumerConfig;
pub use consumer_loop::{ConsumerLoop, ConsumerLoopConfig, ConsumerStats, MessageOutcome};
pub use kafka::{ConsumerError, InboundMessage, KafkaOrderSource, OrderSource};
pub use processor::{OrderProcessor, ProcessingError, SimulatedProcessor, StageDelays};
