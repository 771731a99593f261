//! Request and response types for all pza-daemon HTTP endpoints.
//!
//! These types are `Serialize + Deserialize` so they can be JSON-encoded
//! by Axum and decoded by tests. No business logic lives here; prices are
//! pre-rendered 2-dp strings by the handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// /health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// Error envelope
// ---------------------------------------------------------------------------

/// Body of every non-2xx response: `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---------------------------------------------------------------------------
// /bases /cheeses /toppings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItemResponse {
    pub id: i64,
    pub name: String,
    /// Fixed 2-dp decimal string, e.g. "5.00".
    pub price: String,
}

// ---------------------------------------------------------------------------
// POST /pizzas
// ---------------------------------------------------------------------------

/// All fields optional so the handler can answer missing fields with the
/// canonical 400 instead of a deserialization rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePizzaRequest {
    pub base_id: Option<i64>,
    pub cheese_id: Option<i64>,
    pub topping_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PizzaResponse {
    pub id: i64,
    pub base: String,
    pub cheese: String,
    pub toppings: Vec<String>,
    pub price: String,
}

// ---------------------------------------------------------------------------
// POST /orders  GET /orders/{id}
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub pizza_ids: Option<Vec<i64>>,
    pub quantities: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedResponse {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPizzaResponse {
    pub id: i64,
    pub name: String,
    pub price: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub status: String,
    pub pizzas: Vec<OrderPizzaResponse>,
    /// Parallel to `pizzas`.
    pub quantities: Vec<i64>,
    pub price: String,
}
