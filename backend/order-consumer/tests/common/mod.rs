//! In-memory stand-in for a Kafka topic.
//!
//! Records are appended to partitions chosen by key hash, every consumer group
//! has its own committed offsets, and a new [`MemorySource`] for a group
//! resumes from the committed position, like a consumer restart does.

#![allow(dead_code)]

use async_trait::async_trait;
use order_consumer::{ConsumerError, InboundMessage, OrderSource, Processed};
use order_events::OrderEvent;
use order_producer::{DeliveryReport, OrderPublisher, ProducerError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TOPIC: &str = "orders";

#[derive(Default)]
struct TopicState {
    partitions: Vec<Vec<(Option<String>, Vec<u8>)>>,
    committed: HashMap<(String, i32), i64>,
    commit_log: Vec<(String, i32, i64)>,
    closed_sources: usize,
}

#[derive(Clone)]
pub struct MemoryTopic {
    state: Arc<Mutex<TopicState>>,
}

impl MemoryTopic {
    pub fn new(partitions: usize) -> Self {
        let state = TopicState {
            partitions: vec![Vec::new(); partitions],
            ..TopicState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Stable key to partition mapping
    pub fn partition_for(&self, key: &str) -> i32 {
        let partitions = self.state.lock().unwrap().partitions.len() as u32;
        let hash = key
            .bytes()
            .fold(2166136261u32, |hash, byte| (hash ^ byte as u32).wrapping_mul(16777619));
        (hash % partitions) as i32
    }

    pub fn append(&self, key: Option<&str>, payload: impl Into<Vec<u8>>) -> (i32, i64) {
        let partition = key.map_or(0, |k| self.partition_for(k));
        let mut state = self.state.lock().unwrap();
        let log = &mut state.partitions[partition as usize];
        log.push((key.map(str::to_string), payload.into()));
        (partition, log.len() as i64 - 1)
    }

    pub fn committed(&self, group: &str, partition: i32) -> Option<i64> {
        self.state
            .lock()
            .unwrap()
            .committed
            .get(&(group.to_string(), partition))
            .copied()
    }

    pub fn commit_log(&self) -> Vec<(String, i32, i64)> {
        self.state.lock().unwrap().commit_log.clone()
    }

    pub fn closed_sources(&self) -> usize {
        self.state.lock().unwrap().closed_sources
    }

    /// A consumer joining `group`, starting at the group's committed offsets
    pub fn source(&self, group: &str) -> MemorySource {
        MemorySource {
            topic: self.clone(),
            group: group.to_string(),
            positions: HashMap::new(),
            pending_errors: 0,
            fail_commits: false,
        }
    }

    pub fn publisher(&self) -> MemoryPublisher {
        MemoryPublisher {
            topic: self.clone(),
            flushes: Arc::new(Mutex::new(0)),
        }
    }

    fn fetch(&self, group: &str, positions: &mut HashMap<i32, i64>) -> Option<InboundMessage> {
        let state = self.state.lock().unwrap();
        for (partition, log) in state.partitions.iter().enumerate() {
            let partition = partition as i32;
            let position = *positions.entry(partition).or_insert_with(|| {
                state
                    .committed
                    .get(&(group.to_string(), partition))
                    .copied()
                    .unwrap_or(0)
            });
            if let Some((key, payload)) = log.get(position as usize) {
                positions.insert(partition, position + 1);
                return Some(InboundMessage {
                    topic: TOPIC.to_string(),
                    partition,
                    offset: position,
                    key: key.clone(),
                    payload: Some(payload.clone()),
                });
            }
        }
        None
    }
}

pub struct MemorySource {
    topic: MemoryTopic,
    group: String,
    positions: HashMap<i32, i64>,
    pending_errors: usize,
    fail_commits: bool,
}

impl MemorySource {
    /// Fail the next `count` polls with a transport error
    pub fn with_consume_errors(mut self, count: usize) -> Self {
        self.pending_errors = count;
        self
    }

    /// Never acknowledge a commit, as if the process died before the broker answered
    pub fn with_failing_commits(mut self) -> Self {
        self.fail_commits = true;
        self
    }
}

#[async_trait]
impl OrderSource for MemorySource {
    async fn next_message(&mut self) -> Result<InboundMessage, ConsumerError> {
        if self.pending_errors > 0 {
            self.pending_errors -= 1;
            return Err(ConsumerError::Kafka("broker transport failure".to_string()));
        }

        loop {
            if let Some(message) = self.topic.fetch(&self.group, &mut self.positions) {
                return Ok(message);
            }
            // Long poll
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    async fn commit(&mut self, processed: Processed) -> Result<(), ConsumerError> {
        if self.fail_commits {
            return Err(ConsumerError::Commit("coordinator unavailable".to_string()));
        }

        let mut state = self.topic.state.lock().unwrap();
        state.committed.insert(
            (self.group.clone(), processed.partition()),
            processed.next_offset(),
        );
        state.commit_log.push((
            self.group.clone(),
            processed.partition(),
            processed.next_offset(),
        ));
        Ok(())
    }

    fn close(&mut self) {
        self.topic.state.lock().unwrap().closed_sources += 1;
    }
}

pub struct MemoryPublisher {
    topic: MemoryTopic,
    pub flushes: Arc<Mutex<usize>>,
}

#[async_trait]
impl OrderPublisher for MemoryPublisher {
    async fn publish(&self, order: &OrderEvent) -> Result<DeliveryReport, ProducerError> {
        let payload = order.to_json()?;
        let (partition, offset) = self.topic.append(Some(&order.customer_id), payload);
        Ok(DeliveryReport {
            topic: TOPIC.to_string(),
            partition,
            offset,
        })
    }

    fn flush(&self, _timeout: Duration) -> Result<(), ProducerError> {
        *self.flushes.lock().unwrap() += 1;
        Ok(())
    }
}
