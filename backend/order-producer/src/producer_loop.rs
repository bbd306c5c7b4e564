//! The producer run loop
//!
//! Publish failures never stop the loop: the error is logged, the loop waits
//! `retry_delay` and carries on with a fresh order. Only shutdown ends it.

use crate::kafka::{DeliveryReport, OrderPublisher, ProducerError};
use chrono::Utc;
use order_events::generate_order;
use order_events::shutdown::{shutdown_requested, sleep_or_shutdown, until_shutdown};
use rand::Rng;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Budget for delivering queued records on shutdown
pub const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducerLoopConfig {
    pub publish_interval: Duration,
    pub retry_delay: Duration,
}

impl Default for ProducerLoopConfig {
    fn default() -> Self {
        Self {
            publish_interval: Duration::from_secs(5),
            retry_delay: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerStats {
    pub published: u64,
    pub failed: u64,
}

/// Owns the publisher for its whole lifetime and flushes it on exit.
pub struct ProducerLoop<P, R> {
    publisher: P,
    config: ProducerLoopConfig,
    rng: R,
    stats: ProducerStats,
}

impl<P, R> ProducerLoop<P, R>
where
    P: OrderPublisher,
    R: Rng + Send,
{
    pub fn new(publisher: P, config: ProducerLoopConfig, rng: R) -> Self {
        Self {
            publisher,
            config,
            rng,
            stats: ProducerStats::default(),
        }
    }

    /// Generate and publish one order.
    pub async fn publish_once(&mut self) -> Result<DeliveryReport, ProducerError> {
        let order = generate_order(&mut self.rng, Utc::now());
        let report = self.publisher.publish(&order).await?;

        info!(
            topic = %report.topic,
            partition = report.partition,
            offset = report.offset,
            order_id = %order.order_id,
            customer_id = %order.customer_id,
            "Order event published"
        );

        Ok(report)
    }

    /// Run until shutdown, then flush the publisher.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> ProducerStats {
        info!(
            publish_interval_ms = self.config.publish_interval.as_millis() as u64,
            retry_delay_ms = self.config.retry_delay.as_millis() as u64,
            "Order producer loop started"
        );

        while !shutdown_requested(&shutdown) {
            let outcome = match until_shutdown(self.publish_once(), &mut shutdown).await {
                Some(outcome) => outcome,
                None => break,
            };

            let delay = match outcome {
                Ok(_) => {
                    self.stats.published += 1;
                    self.config.publish_interval
                }
                Err(e) => {
                    self.stats.failed += 1;
                    error!(error = %e, "Failed to publish order event");
                    self.config.retry_delay
                }
            };

            if !sleep_or_shutdown(delay, &mut shutdown).await {
                break;
            }
        }

        if let Err(e) = self.publisher.flush(FLUSH_TIMEOUT) {
            warn!(error = %e, "Failed to flush order producer");
        }

        info!(
            published = self.stats.published,
            failed = self.stats.failed,
            "Order producer loop stopped"
        );

        self.stats
    }
}
