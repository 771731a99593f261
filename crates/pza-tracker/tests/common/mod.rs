//! Shared test doubles for tracker scenario tests.
#![allow(dead_code)] // not every scenario uses every helper

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use pza_schemas::{LineItem, NewPizza, OrderRecord, OrderStatus, PizzaRecord};
use pza_store::{MemoryStore, OrderStore, StoreError};

/// Store wrapper that injects failures into `update_status`:
/// a countdown of transient failures, and a "vanished" switch that makes the
/// backing order unreachable as if it had been deleted out-of-band.
pub struct FaultStore {
    inner: MemoryStore,
    transient_failures: AtomicU32,
    vanished: AtomicBool,
    pub update_attempts: AtomicU32,
}

impl FaultStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            transient_failures: AtomicU32::new(0),
            vanished: AtomicBool::new(false),
            update_attempts: AtomicU32::new(0),
        }
    }

    /// Make the next `n` status writes fail with a transient error.
    pub fn fail_next_updates(&self, n: u32) {
        self.transient_failures.store(n, Ordering::SeqCst);
    }

    /// Simulate out-of-band deletion: every further status write reports
    /// the order as missing.
    pub fn vanish(&self) {
        self.vanished.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl OrderStore for FaultStore {
    async fn insert_pizza(&self, new: NewPizza) -> Result<PizzaRecord, StoreError> {
        self.inner.insert_pizza(new).await
    }

    async fn fetch_pizza(&self, id: i64) -> Result<PizzaRecord, StoreError> {
        self.inner.fetch_pizza(id).await
    }

    async fn create_order(&self, items: &[LineItem]) -> Result<OrderRecord, StoreError> {
        self.inner.create_order(items).await
    }

    async fn fetch_order(&self, id: i64) -> Result<OrderRecord, StoreError> {
        self.inner.fetch_order(id).await
    }

    async fn update_status(&self, id: i64, status: OrderStatus) -> Result<(), StoreError> {
        self.update_attempts.fetch_add(1, Ordering::SeqCst);

        if self.vanished.load(Ordering::SeqCst) {
            return Err(StoreError::OrderNotFound(id));
        }

        let remaining = self.transient_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.transient_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Unavailable("injected fault".to_string()));
        }

        self.inner.update_status(id, status).await
    }

    async fn list_in_flight(&self) -> Result<Vec<OrderRecord>, StoreError> {
        self.inner.list_in_flight().await
    }
}

/// Seed one pizza and one single-item order; returns the order id.
pub async fn seed_order(store: &dyn OrderStore) -> i64 {
    let pizza = store
        .insert_pizza(NewPizza {
            base_id: 1,
            cheese_id: 1,
            topping_ids: vec![1, 2],
        })
        .await
        .expect("insert_pizza");
    let order = store
        .create_order(&[LineItem {
            pizza_id: pizza.id,
            quantity: 1,
        }])
        .await
        .expect("create_order");
    order.id
}
