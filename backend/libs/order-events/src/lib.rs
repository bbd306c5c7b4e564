//! Order event contract shared by the order producer and consumer.
//!
//! The JSON form of [`OrderEvent`] is the only thing that crosses the broker.
//! There is no schema registry, so adding or removing a field here is a
//! breaking change for whichever side is deployed second.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// rdkafka client context that routes librdkafka callbacks to tracing
pub mod context;
// Synthetic order generation
pub mod generator;
// Kafka connection settings
pub mod settings;
// Cooperative shutdown helpers
pub mod shutdown;
// Tracing bootstrap for the service binaries
pub mod telemetry;

pub use context::KafkaLogContext;
pub use generator::{generate_order, CUSTOMER_IDS, PRODUCT_NAMES};
pub use settings::{KafkaSettings, OffsetReset, SecurityProtocol, SettingsError};

/// Kafka topic names
pub mod topics {
    /// Order events, keyed by customer id
    pub const ORDERS: &str = "orders";
}

/// Status label stamped on every generated order
pub const STATUS_CREATED: &str = "Created";

/// An order placed by a customer.
///
/// Keys are PascalCase on the wire; camelCase keys are accepted on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderEvent {
    #[serde(alias = "orderId")]
    pub order_id: Uuid,
    #[serde(alias = "customerId")]
    pub customer_id: String,
    #[serde(alias = "amount", with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    #[serde(alias = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "status")]
    pub status: String,
    #[serde(alias = "items", default)]
    pub items: Vec<OrderItem>,
}

/// A single line of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderItem {
    #[serde(alias = "productId")]
    pub product_id: String,
    #[serde(alias = "productName")]
    pub product_name: String,
    #[serde(alias = "quantity")]
    pub quantity: u32,
    #[serde(alias = "price", with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
}

impl OrderEvent {
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Encode to the JSON payload published on [`topics::ORDERS`]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode a payload consumed from [`topics::ORDERS`]
    pub fn from_json(payload: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(payload)
    }

    /// Check the invariants every generated order satisfies.
    pub fn validate(&self) -> Result<(), OrderValidationError> {
        if self.customer_id.trim().is_empty() {
            return Err(OrderValidationError::MissingCustomer);
        }
        if self.items.is_empty() {
            return Err(OrderValidationError::NoItems);
        }
        if let Some(item) = self.items.iter().find(|item| item.quantity == 0) {
            return Err(OrderValidationError::ZeroQuantity(item.product_id.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderValidationError {
    #[error("order has no customer id")]
    MissingCustomer,

    #[error("order has no items")]
    NoItems,

    #[error("item {0} has zero quantity")]
    ZeroQuantity(String),
}
