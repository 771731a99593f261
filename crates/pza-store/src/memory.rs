//! Deterministic in-memory store.
//!
//! Design decisions (kept intentionally simple/deterministic):
//! - ids are assigned monotonically from 1, per entity kind;
//! - a single `RwLock` over the whole state gives the atomic read/write
//!   boundary for free — a reader can never observe an order shell without
//!   its line items, or a half-applied status write;
//! - no randomness; timestamps come from `Utc::now()` at the call site.
//!
//! Used by tests and dev runs; the contract matches `PgStore` exactly.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use pza_schemas::{LineItem, NewPizza, OrderRecord, OrderStatus, PizzaRecord};
use tokio::sync::RwLock;

use crate::{normalize_toppings, validate_items, OrderStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    next_pizza_id: i64,
    next_order_id: i64,
    pizzas: BTreeMap<i64, PizzaRecord>,
    orders: BTreeMap<i64, OrderRecord>,
}

/// In-memory [`OrderStore`] implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted orders. Test observability only.
    pub async fn order_count(&self) -> usize {
        self.inner.read().await.orders.len()
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_pizza(&self, new: NewPizza) -> Result<PizzaRecord, StoreError> {
        let mut inner = self.inner.write().await;
        inner.next_pizza_id += 1;
        let record = PizzaRecord {
            id: inner.next_pizza_id,
            base_id: new.base_id,
            cheese_id: new.cheese_id,
            topping_ids: normalize_toppings(new.topping_ids),
        };
        inner.pizzas.insert(record.id, record.clone());
        Ok(record)
    }

    async fn fetch_pizza(&self, id: i64) -> Result<PizzaRecord, StoreError> {
        self.inner
            .read()
            .await
            .pizzas
            .get(&id)
            .cloned()
            .ok_or(StoreError::PizzaNotFound(id))
    }

    async fn create_order(&self, items: &[LineItem]) -> Result<OrderRecord, StoreError> {
        validate_items(items)?;

        let mut inner = self.inner.write().await;

        // Validate every reference before mutating anything so a mid-list
        // failure leaves zero persisted rows.
        for item in items {
            if !inner.pizzas.contains_key(&item.pizza_id) {
                return Err(StoreError::PizzaNotFound(item.pizza_id));
            }
        }

        inner.next_order_id += 1;
        let now = Utc::now();
        let record = OrderRecord {
            id: inner.next_order_id,
            created_at: now,
            status: OrderStatus::Placed,
            status_changed_at: now,
            items: items.to_vec(),
        };
        inner.orders.insert(record.id, record.clone());
        Ok(record)
    }

    async fn fetch_order(&self, id: i64) -> Result<OrderRecord, StoreError> {
        self.inner
            .read()
            .await
            .orders
            .get(&id)
            .cloned()
            .ok_or(StoreError::OrderNotFound(id))
    }

    async fn update_status(&self, id: i64, status: OrderStatus) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let order = inner
            .orders
            .get_mut(&id)
            .ok_or(StoreError::OrderNotFound(id))?;
        order.status = status;
        order.status_changed_at = Utc::now();
        Ok(())
    }

    async fn list_in_flight(&self) -> Result<Vec<OrderRecord>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .orders
            .values()
            .filter(|o| !o.status.is_terminal())
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
