//! The consumer run loop
//!
//! One record at a time: decode, process, then commit. The commit for a record
//! is issued only after [`OrderProcessor::process`] returned `Ok` for it;
//! moving it earlier would turn at-least-once into at-most-once.
//!
//! Broker errors never end the loop. The loop logs them, pauses
//! `error_backoff` and polls again. Only shutdown ends it.

use crate::commit::{CommitFloor, Processed};
use crate::kafka::{InboundMessage, OrderSource};
use crate::processor::OrderProcessor;
use order_events::shutdown::{shutdown_requested, sleep_or_shutdown, until_shutdown};
use order_events::OrderEvent;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerLoopConfig {
    /// Pause after a consume error before polling again
    pub error_backoff: Duration,
}

impl Default for ConsumerLoopConfig {
    fn default() -> Self {
        Self {
            error_backoff: Duration::from_secs(5),
        }
    }
}

/// What happened to one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Processed and its offset committed
    Committed { partition: i32, offset: i64 },
    /// Payload missing or not an order; left uncommitted
    SkippedMalformed,
    /// Processor returned an error; left uncommitted
    SkippedFailed,
    /// Processed, but an earlier skipped record on the partition blocks the commit
    CommitWithheld,
    /// Processed, but the broker rejected the commit
    CommitFailed,
    /// Shutdown arrived mid-processing; left uncommitted
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    pub committed: u64,
    pub skipped: u64,
    pub commit_withheld: u64,
    pub commit_failed: u64,
    pub consume_errors: u64,
}

impl ConsumerStats {
    fn record(&mut self, outcome: &MessageOutcome) {
        match outcome {
            MessageOutcome::Committed { .. } => self.committed += 1,
            MessageOutcome::SkippedMalformed | MessageOutcome::SkippedFailed => self.skipped += 1,
            MessageOutcome::CommitWithheld => self.commit_withheld += 1,
            MessageOutcome::CommitFailed => self.commit_failed += 1,
            MessageOutcome::Cancelled => {}
        }
    }
}

/// Owns the source for its whole lifetime and closes it on exit.
pub struct ConsumerLoop<S, P> {
    source: S,
    processor: P,
    config: ConsumerLoopConfig,
    floor: CommitFloor,
    stats: ConsumerStats,
}

impl<S, P> ConsumerLoop<S, P>
where
    S: OrderSource,
    P: OrderProcessor,
{
    pub fn new(source: S, processor: P, config: ConsumerLoopConfig) -> Self {
        Self {
            source,
            processor,
            config,
            floor: CommitFloor::new(),
            stats: ConsumerStats::default(),
        }
    }

    /// Run until shutdown, then close the source.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> ConsumerStats {
        info!(
            error_backoff_ms = self.config.error_backoff.as_millis() as u64,
            "Order consumer loop started"
        );

        while !shutdown_requested(&shutdown) {
            let message = match until_shutdown(self.source.next_message(), &mut shutdown).await {
                None => break,
                Some(Ok(message)) => message,
                Some(Err(e)) => {
                    self.stats.consume_errors += 1;
                    error!(error = %e, "Failed to consume message");
                    if !sleep_or_shutdown(self.config.error_backoff, &mut shutdown).await {
                        break;
                    }
                    continue;
                }
            };

            let outcome = self.handle_message(message, &mut shutdown).await;
            self.stats.record(&outcome);
            if outcome == MessageOutcome::Cancelled {
                break;
            }
        }

        self.source.close();

        info!(
            committed = self.stats.committed,
            skipped = self.stats.skipped,
            commit_withheld = self.stats.commit_withheld,
            commit_failed = self.stats.commit_failed,
            consume_errors = self.stats.consume_errors,
            "Order consumer loop stopped"
        );

        self.stats
    }

    /// Take one record through decode, process and commit.
    pub async fn handle_message(
        &mut self,
        message: InboundMessage,
        shutdown: &mut watch::Receiver<bool>,
    ) -> MessageOutcome {
        let order = match decode(&message) {
            Ok(order) => order,
            Err(reason) => {
                error!(
                    topic = %message.topic,
                    partition = message.partition,
                    offset = message.offset,
                    error = %reason,
                    "Failed to deserialize order event, skipping without commit"
                );
                self.floor.record_skip(&message);
                return MessageOutcome::SkippedMalformed;
            }
        };

        info!(
            order_id = %order.order_id,
            customer_id = %order.customer_id,
            amount = %order.amount,
            items = order.item_count(),
            partition = message.partition,
            offset = message.offset,
            "Processing order"
        );

        match until_shutdown(self.processor.process(&order), shutdown).await {
            None => {
                info!(
                    order_id = %order.order_id,
                    offset = message.offset,
                    "Shutdown during processing, offset left uncommitted"
                );
                return MessageOutcome::Cancelled;
            }
            Some(Err(e)) => {
                error!(
                    order_id = %order.order_id,
                    topic = %message.topic,
                    partition = message.partition,
                    offset = message.offset,
                    error = %e,
                    "Failed to process order, skipping without commit"
                );
                self.floor.record_skip(&message);
                return MessageOutcome::SkippedFailed;
            }
            Some(Ok(())) => {}
        }

        let processed = Processed::new(&message);
        info!(order_id = %order.order_id, "Order processed");

        if !self.floor.allows(&processed) {
            warn!(
                topic = %message.topic,
                partition = message.partition,
                offset = message.offset,
                "Commit withheld: an earlier record on this partition was skipped"
            );
            return MessageOutcome::CommitWithheld;
        }

        match self.source.commit(processed).await {
            Ok(()) => MessageOutcome::Committed {
                partition: message.partition,
                offset: message.offset,
            },
            Err(e) => {
                error!(
                    order_id = %order.order_id,
                    partition = message.partition,
                    offset = message.offset,
                    error = %e,
                    "Failed to commit offset"
                );
                MessageOutcome::CommitFailed
            }
        }
    }
}

fn decode(message: &InboundMessage) -> Result<OrderEvent, String> {
    match &message.payload {
        Some(payload) => OrderEvent::from_json(payload).map_err(|e| e.to_string()),
        None => Err("empty payload".to_string()),
    }
}
