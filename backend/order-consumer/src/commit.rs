//! Commit bookkeeping
//!
//! [`Processed`] is the only thing [`OrderSource::commit`] accepts, and only
//! the consumer loop can create one, after the processor returned `Ok` for
//! that exact record. Committing a record that was not processed does not
//! type check.
//!
//! [`OrderSource::commit`]: crate::kafka::OrderSource::commit

use crate::kafka::InboundMessage;
use std::collections::HashMap;

/// Proof that a record went through every processing stage
#[derive(Debug, PartialEq, Eq)]
pub struct Processed {
    topic: String,
    partition: i32,
    offset: i64,
}

impl Processed {
    pub(crate) fn new(message: &InboundMessage) -> Self {
        Self {
            topic: message.topic.clone(),
            partition: message.partition,
            offset: message.offset,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn partition(&self) -> i32 {
        self.partition
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Kafka commits the position of the next record to read
    pub fn next_offset(&self) -> i64 {
        self.offset + 1
    }
}

/// Lowest skipped offset per partition for the current run.
///
/// Kafka commits are cumulative: committing offset N of a partition also
/// acknowledges everything before N. Once a record is skipped, later commits
/// on its partition would silently acknowledge it, so they are withheld.
#[derive(Debug, Default)]
pub struct CommitFloor {
    floors: HashMap<(String, i32), i64>,
}

impl CommitFloor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_skip(&mut self, message: &InboundMessage) {
        self.floors
            .entry((message.topic.clone(), message.partition))
            .and_modify(|floor| *floor = (*floor).min(message.offset))
            .or_insert(message.offset);
    }

    /// Whether committing `processed` leaves every skipped record uncommitted
    pub fn allows(&self, processed: &Processed) -> bool {
        self.floor(processed.topic(), processed.partition())
            .map_or(true, |floor| processed.next_offset() <= floor)
    }

    pub fn floor(&self, topic: &str, partition: i32) -> Option<i64> {
        self.floors.get(&(topic.to_string(), partition)).copied()
    }
}
