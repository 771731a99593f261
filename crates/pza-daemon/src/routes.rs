//! Axum router and all HTTP handlers for pza-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers.  All handlers are `pub(crate)` so the scenario tests in
//! `tests/` can compose the router directly.

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use pza_catalog::CatalogItem;
use pza_pricing::{order_price_cents, pizza_price_cents};
use pza_schemas::{format_cents, LineItem, NewPizza, ProgressEvent};
use pza_store::StoreError;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{error, info};

use crate::{
    api_types::{
        CatalogItemResponse, CreateOrderRequest, CreatePizzaRequest, ErrorResponse,
        HealthResponse, OrderCreatedResponse, OrderPizzaResponse, OrderResponse, PizzaResponse,
    },
    state::AppState,
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/bases", get(list_bases))
        .route("/cheeses", get(list_cheeses))
        .route("/toppings", get(list_toppings))
        .route("/pizzas", post(create_pizza))
        .route("/orders", post(create_order))
        .route("/orders/:id", get(get_order))
        .route("/orders/stream", get(stream))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Handler-level error: status code + `{"error": "..."}` envelope.
pub(crate) enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    fn missing_data() -> Self {
        ApiError::BadRequest("Missing or invalid data".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(e) => (StatusCode::BAD_REQUEST, e),
            ApiError::NotFound(e) => (StatusCode::NOT_FOUND, e),
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, e)
            }
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::PizzaNotFound(id) => ApiError::NotFound(format!("Pizza {id} not found")),
            StoreError::OrderNotFound(_) => ApiError::NotFound("Order not found".to_string()),
            StoreError::InvalidQuantity { .. } => {
                ApiError::BadRequest("Quantity must be at least 1".to_string())
            }
            StoreError::DuplicatePizza(_) => {
                ApiError::BadRequest("Duplicate pizza ID".to_string())
            }
            StoreError::EmptyOrder => ApiError::missing_data(),
            StoreError::Unavailable(e) => ApiError::Internal(format!("storage unavailable: {e}")),
        }
    }
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service,
            version: st.build.version,
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /bases  /cheeses  /toppings
// ---------------------------------------------------------------------------

fn catalog_listing<'a>(items: impl Iterator<Item = &'a CatalogItem>) -> Json<Vec<CatalogItemResponse>> {
    Json(
        items
            .map(|i| CatalogItemResponse {
                id: i.id,
                name: i.name.clone(),
                price: format_cents(i.price_cents),
            })
            .collect(),
    )
}

pub(crate) async fn list_bases(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    catalog_listing(st.catalog.bases())
}

pub(crate) async fn list_cheeses(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    catalog_listing(st.catalog.cheeses())
}

pub(crate) async fn list_toppings(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    catalog_listing(st.catalog.toppings())
}

// ---------------------------------------------------------------------------
// POST /pizzas
// ---------------------------------------------------------------------------

pub(crate) async fn create_pizza(
    State(st): State<Arc<AppState>>,
    body: Option<Json<CreatePizzaRequest>>,
) -> Result<Response, ApiError> {
    let Some(Json(req)) = body else {
        return Err(ApiError::missing_data());
    };
    let (Some(base_id), Some(cheese_id), Some(topping_ids)) =
        (req.base_id, req.cheese_id, req.topping_ids)
    else {
        return Err(ApiError::missing_data());
    };

    // Every reference must resolve against the catalog before anything is
    // persisted.
    let unresolved = || ApiError::NotFound("Invalid base, cheese or topping ID".to_string());
    let base = st.catalog.base(base_id).ok_or_else(unresolved)?;
    let cheese = st.catalog.cheese(cheese_id).ok_or_else(unresolved)?;
    let toppings = topping_ids
        .iter()
        .map(|&id| st.catalog.topping(id).ok_or_else(unresolved))
        .collect::<Result<Vec<_>, _>>()?;

    let record = st
        .store
        .insert_pizza(NewPizza {
            base_id,
            cheese_id,
            topping_ids,
        })
        .await?;

    let price = pizza_price_cents(&st.catalog, &record)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!(pizza_id = record.id, "pizza composed");
    Ok((
        StatusCode::CREATED,
        Json(PizzaResponse {
            id: record.id,
            base: base.name.clone(),
            cheese: cheese.name.clone(),
            toppings: toppings.iter().map(|t| t.name.clone()).collect(),
            price: format_cents(price),
        }),
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// POST /orders
// ---------------------------------------------------------------------------

pub(crate) async fn create_order(
    State(st): State<Arc<AppState>>,
    body: Option<Json<CreateOrderRequest>>,
) -> Result<Response, ApiError> {
    let Some(Json(req)) = body else {
        return Err(ApiError::missing_data());
    };
    let (Some(pizza_ids), Some(quantities)) = (req.pizza_ids, req.quantities) else {
        return Err(ApiError::missing_data());
    };

    if pizza_ids.len() != quantities.len() {
        return Err(ApiError::BadRequest(
            "Mismatched pizza IDs and quantities".to_string(),
        ));
    }

    let items: Vec<LineItem> = pizza_ids
        .iter()
        .zip(quantities.iter())
        .map(|(&pizza_id, &quantity)| LineItem { pizza_id, quantity })
        .collect();

    // All-or-nothing: an unresolved pizza id mid-list persists no rows.
    let order = st.store.create_order(&items).await?;

    // The lifecycle runs detached from this request. A failure to start is
    // logged, never surfaced: the order exists and the boot-time resumption
    // scan will pick it up.
    if let Err(e) = st.tracker.start(order.id).await {
        error!(order_id = order.id, error = %e, "failed to start order tracker");
    }

    info!(order_id = order.id, items = items.len(), "order placed");
    Ok((StatusCode::CREATED, Json(OrderCreatedResponse { id: order.id })).into_response())
}

// ---------------------------------------------------------------------------
// GET /orders/{id}
// ---------------------------------------------------------------------------

pub(crate) async fn get_order(
    State(st): State<Arc<AppState>>,
    Path(order_id): Path<i64>,
) -> Result<Response, ApiError> {
    let order = st.store.fetch_order(order_id).await?;

    let mut pizzas = Vec::with_capacity(order.items.len());
    let mut quantities = Vec::with_capacity(order.items.len());
    let mut lines = Vec::with_capacity(order.items.len());

    for item in &order.items {
        let record = st.store.fetch_pizza(item.pizza_id).await?;
        let price = pizza_price_cents(&st.catalog, &record)
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        pizzas.push(OrderPizzaResponse {
            id: record.id,
            name: pizza_display_name(&st, &record)?,
            price: format_cents(price),
        });
        quantities.push(item.quantity);
        lines.push((record, item.quantity));
    }

    let total = order_price_cents(&st.catalog, &lines)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        Json(OrderResponse {
            id: order.id,
            created_at: order.created_at,
            status: order.status.as_str().to_string(),
            pizzas,
            quantities,
            price: format_cents(total),
        }),
    )
        .into_response())
}

/// Pizzas have no stored name; display them by their composition.
fn pizza_display_name(
    st: &AppState,
    record: &pza_schemas::PizzaRecord,
) -> Result<String, ApiError> {
    let base = st
        .catalog
        .base(record.base_id)
        .ok_or_else(|| ApiError::Internal("pizza references unknown base".to_string()))?;
    let cheese = st
        .catalog
        .cheese(record.cheese_id)
        .ok_or_else(|| ApiError::Internal("pizza references unknown cheese".to_string()))?;
    Ok(format!("{} / {}", base.name, cheese.name))
}

// ---------------------------------------------------------------------------
// GET /orders/stream  (SSE)
// ---------------------------------------------------------------------------

pub(crate) async fn stream(State(st): State<Arc<AppState>>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
    headers.insert("Connection", HeaderValue::from_static("keep-alive"));

    let rx = st.tracker.subscribe();
    let events = broadcast_to_sse(rx);

    (headers, Sse::new(events).keep_alive(KeepAlive::new())).into_response()
}

fn broadcast_to_sse(
    rx: broadcast::Receiver<ProgressEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(rx).filter_map(|msg| async move {
        match msg {
            Ok(ev) => {
                let data = serde_json::to_string(&ev).ok()?;
                Some(Ok(Event::default().event("status").data(data)))
            }
            Err(_) => None, // lagged / closed
        }
    })
}
