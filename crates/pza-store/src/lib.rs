//! Order repository — durable storage of composed pizzas, orders and their
//! line items, and the single source of truth for order status.
//!
//! The [`OrderStore`] trait is the seam between the domain and the backing
//! store. Two implementations ship:
//!
//! - [`MemoryStore`] — deterministic in-memory store for tests and dev runs;
//! - [`PgStore`] — PostgreSQL-backed store with embedded migrations.
//!
//! Both guarantee the same contract: order creation is all-or-nothing, status
//! writes are atomic and acknowledged only once durable, and a reader never
//! observes a partially-written order.

use async_trait::async_trait;
use pza_schemas::{LineItem, NewPizza, OrderRecord, OrderStatus, PizzaRecord};

pub mod memory;
pub mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Errors surfaced by every [`OrderStore`] implementation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("Pizza {0} not found")]
    PizzaNotFound(i64),

    #[error("Order {0} not found")]
    OrderNotFound(i64),

    #[error("quantity for pizza {pizza_id} must be at least 1 (got {quantity})")]
    InvalidQuantity { pizza_id: i64, quantity: i64 },

    #[error("pizza {0} appears in more than one line item")]
    DuplicatePizza(i64),

    #[error("an order must contain at least one line item")]
    EmptyOrder,

    /// Transient backend failure (connection dropped, pool exhausted, …).
    /// Callers with a pending write MUST retry; dropping the write would
    /// permanently desynchronize persisted state from the caller's view.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// `true` for failures that are expected to clear on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

// ---------------------------------------------------------------------------
// OrderStore
// ---------------------------------------------------------------------------

/// Storage contract for pizzas and orders.
///
/// Object-safe (`Arc<dyn OrderStore>`) so the daemon and the tracker can be
/// wired against either backend without knowing the concrete type.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a composed pizza. Topping ids are deduplicated and stored in
    /// ascending order; catalog validation is the caller's responsibility.
    async fn insert_pizza(&self, new: NewPizza) -> Result<PizzaRecord, StoreError>;

    async fn fetch_pizza(&self, id: i64) -> Result<PizzaRecord, StoreError>;

    /// Create an order shell plus all its line items in one logical
    /// operation. A failure on any item (unknown pizza, bad quantity,
    /// duplicate) persists **nothing**. On success the order starts in
    /// `Placed` with `created_at = status_changed_at = now`.
    async fn create_order(&self, items: &[LineItem]) -> Result<OrderRecord, StoreError>;

    async fn fetch_order(&self, id: i64) -> Result<OrderRecord, StoreError>;

    /// Atomically set the order's status and stamp `status_changed_at`.
    /// Returns only after the write is durable. Status ordering is enforced
    /// by the tracker (the only caller), not re-validated here.
    async fn update_status(&self, id: i64, status: OrderStatus) -> Result<(), StoreError>;

    /// All orders whose status is not terminal — the boot-time resumption scan.
    async fn list_in_flight(&self) -> Result<Vec<OrderRecord>, StoreError>;
}

// ---------------------------------------------------------------------------
// Shared validation
// ---------------------------------------------------------------------------

/// Line-item precondition checks shared by all backends: at least one item,
/// every quantity ≥ 1, at most one line item per pizza id.
pub(crate) fn validate_items(items: &[LineItem]) -> Result<(), StoreError> {
    if items.is_empty() {
        return Err(StoreError::EmptyOrder);
    }
    let mut seen = std::collections::BTreeSet::new();
    for item in items {
        if item.quantity < 1 {
            return Err(StoreError::InvalidQuantity {
                pizza_id: item.pizza_id,
                quantity: item.quantity,
            });
        }
        if !seen.insert(item.pizza_id) {
            return Err(StoreError::DuplicatePizza(item.pizza_id));
        }
    }
    Ok(())
}

/// Canonical topping set: ascending, unique.
pub(crate) fn normalize_toppings(mut ids: Vec<i64>) -> Vec<i64> {
    ids.sort_unstable();
    ids.dedup();
    ids
}
