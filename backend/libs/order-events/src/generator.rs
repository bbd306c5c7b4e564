//! Synthetic order generation
//!
//! Everything random comes from the caller's `rng`, so a seeded rng yields the
//! same order every time.

use crate::{OrderEvent, OrderItem, STATUS_CREATED};
use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;

/// Customers orders are attributed to; doubles as the set of partition keys
pub const CUSTOMER_IDS: [&str; 4] = ["CUST001", "CUST002", "CUST003", "CUST004"];

pub const PRODUCT_NAMES: [&str; 5] = ["Notebook", "Mouse", "Keyboard", "Monitor", "Headset"];

pub const MIN_ITEMS: usize = 1;
pub const MAX_ITEMS: usize = 3;
pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 4;

/// Build a random order stamped with `now`.
pub fn generate_order<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> OrderEvent {
    let order_id = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();
    let customer_id = CUSTOMER_IDS[rng.gen_range(0..CUSTOMER_IDS.len())];

    OrderEvent {
        order_id,
        customer_id: customer_id.to_string(),
        amount: Decimal::from(rng.gen_range(100..1000_i64)),
        created_at: now,
        status: STATUS_CREATED.to_string(),
        items: generate_items(rng),
    }
}

fn generate_items<R: Rng + ?Sized>(rng: &mut R) -> Vec<OrderItem> {
    let count = rng.gen_range(MIN_ITEMS..=MAX_ITEMS);

    (0..count)
        .map(|_| OrderItem {
            product_id: format!("PROD{}", rng.gen_range(100..999)),
            product_name: PRODUCT_NAMES[rng.gen_range(0..PRODUCT_NAMES.len())].to_string(),
            quantity: rng.gen_range(MIN_QUANTITY..=MAX_QUANTITY),
            price: Decimal::from(rng.gen_range(50..500_i64)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use uuid::Uuid;

    #[test]
    fn test_generated_orders_respect_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc::now();

        for _ in 0..500 {
            let order = generate_order(&mut rng, now);

            assert!((MIN_ITEMS..=MAX_ITEMS).contains(&order.items.len()));
            assert!(CUSTOMER_IDS.contains(&order.customer_id.as_str()));
            assert!(order.amount >= Decimal::from(100) && order.amount < Decimal::from(1000));
            assert_eq!(order.status, STATUS_CREATED);
            assert_eq!(order.created_at, now);
            assert!(order.validate().is_ok());

            for item in &order.items {
                assert!((MIN_QUANTITY..=MAX_QUANTITY).contains(&item.quantity));
                assert!(PRODUCT_NAMES.contains(&item.product_name.as_str()));
                assert!(item.product_id.starts_with("PROD"));
                assert!(item.price >= Decimal::from(50) && item.price < Decimal::from(500));
            }
        }
    }

    #[test]
    fn test_same_seed_same_order() {
        let now = Utc::now();
        let a = generate_order(&mut StdRng::seed_from_u64(42), now);
        let b = generate_order(&mut StdRng::seed_from_u64(42), now);
        assert_eq!(a, b);
    }

    #[test]
    fn test_order_ids_are_unique_v4() {
        let mut rng = StdRng::seed_from_u64(1);
        let now = Utc::now();

        let ids: HashSet<Uuid> = (0..1000)
            .map(|_| generate_order(&mut rng, now).order_id)
            .collect();

        assert_eq!(ids.len(), 1000);
        assert!(ids.iter().all(|id| id.get_version_num() == 4));
    }

    #[test]
    fn test_every_item_count_is_reachable() {
        let mut rng = StdRng::seed_from_u64(3);
        let now = Utc::now();

        let counts: HashSet<usize> = (0..200)
            .map(|_| generate_order(&mut rng, now).item_count())
            .collect();

        assert_eq!(counts, HashSet::from([1, 2, 3]));
    }
}
