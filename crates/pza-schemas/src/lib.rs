//! Shared domain types for the pizzeria order service.
//!
//! Everything here is plain data: serde-friendly records passed between the
//! store, the pricing calculator, the lifecycle tracker and the HTTP layer.
//! No business logic beyond the status ordering itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod money;

pub use money::{format_cents, CENTS_PER_UNIT};

// ---------------------------------------------------------------------------
// OrderStatus
// ---------------------------------------------------------------------------

/// Fulfillment lifecycle of an order.
///
/// The sequence is fixed and totally ordered; an order's status only ever
/// moves forward through it, one step at a time, until `Delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Placed,
    Accepted,
    Preparing,
    Dispatched,
    /// Terminal.
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "Placed",
            OrderStatus::Accepted => "Accepted",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Dispatched => "Dispatched",
            OrderStatus::Delivered => "Delivered",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Placed" => Some(OrderStatus::Placed),
            "Accepted" => Some(OrderStatus::Accepted),
            "Preparing" => Some(OrderStatus::Preparing),
            "Dispatched" => Some(OrderStatus::Dispatched),
            "Delivered" => Some(OrderStatus::Delivered),
            _ => None,
        }
    }

    /// The status that follows this one, or `None` at the terminal state.
    pub fn next(&self) -> Option<Self> {
        match self {
            OrderStatus::Placed => Some(OrderStatus::Accepted),
            OrderStatus::Accepted => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Dispatched),
            OrderStatus::Dispatched => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }

    /// Returns `true` if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Pizza / Order records
// ---------------------------------------------------------------------------

/// Composition request for a new pizza (catalog references only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPizza {
    pub base_id: i64,
    pub cheese_id: i64,
    /// Unique per pizza; order is not significant.
    pub topping_ids: Vec<i64>,
}

/// A composed pizza as persisted by the store. Price is always derived from
/// the catalog at read time, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PizzaRecord {
    pub id: i64,
    pub base_id: i64,
    pub cheese_id: i64,
    pub topping_ids: Vec<i64>,
}

/// One order ↔ pizza link with its quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub pizza_id: i64,
    pub quantity: i64,
}

/// A persisted order. `status_changed_at` records entry into the current
/// status so a restarted tracker can recompute the remaining dwell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub status_changed_at: DateTime<Utc>,
    pub items: Vec<LineItem>,
}

// ---------------------------------------------------------------------------
// ProgressEvent
// ---------------------------------------------------------------------------

/// Broadcast on every tracker transition, after the new status is durably
/// persisted. The store remains the authoritative source; this feed is a
/// best-effort live view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub order_id: i64,
    pub status: OrderStatus,
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
