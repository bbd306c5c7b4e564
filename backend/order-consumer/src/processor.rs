//! Order processing stages
//!
//! `SimulatedProcessor` stands in for real validation and persistence with
//! fixed delays: one for validation, one per line item, one for persistence.

use async_trait::async_trait;
use order_events::OrderEvent;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait OrderProcessor: Send + Sync {
    /// Run every stage for `order`. `Ok` means the side effects are done.
    async fn process(&self, order: &OrderEvent) -> Result<(), ProcessingError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageDelays {
    pub validation: Duration,
    pub per_item: Duration,
    pub persistence: Duration,
}

impl Default for StageDelays {
    fn default() -> Self {
        Self {
            validation: Duration::from_millis(100),
            per_item: Duration::from_millis(50),
            persistence: Duration::from_millis(200),
        }
    }
}

impl StageDelays {
    /// Time spent on an order with `items` line items
    pub fn total_for(&self, items: usize) -> Duration {
        self.validation + self.per_item * items as u32 + self.persistence
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimulatedProcessor {
    delays: StageDelays,
}

impl SimulatedProcessor {
    pub fn new(delays: StageDelays) -> Self {
        Self { delays }
    }
}

#[async_trait]
impl OrderProcessor for SimulatedProcessor {
    async fn process(&self, order: &OrderEvent) -> Result<(), ProcessingError> {
        // Validation
        tokio::time::sleep(self.delays.validation).await;

        for item in &order.items {
            debug!(
                order_id = %order.order_id,
                product_name = %item.product_name,
                quantity = item.quantity,
                "Processing item"
            );
            tokio::time::sleep(self.delays.per_item).await;
        }

        // Persistence
        tokio::time::sleep(self.delays.persistence).await;

        Ok(())
    }
}

/// Processing error types
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Processing failed: {0}")]
    Failed(String),
}
