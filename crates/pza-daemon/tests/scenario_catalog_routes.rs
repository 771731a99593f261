//! In-process scenario tests for the catalog listing endpoints.
//!
//! These tests spin up the Axum router **without** binding a TCP socket.
//! Each test calls `routes::build_router` and drives it via
//! `tower::ServiceExt::oneshot` — no network I/O required.

use std::sync::Arc;

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use pza_daemon::{routes, state};
use pza_tracker::DwellSchedule;
use tower::ServiceExt; // oneshot

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a fresh in-process router backed by a clean in-memory state.
fn make_router() -> axum::Router {
    let st = Arc::new(state::AppState::in_memory(DwellSchedule::standard()));
    routes::build_router(st)
}

/// Drive the router with a single request and return (status, body_bytes).
async fn call(router: axum::Router, req: Request<axum::body::Body>) -> (StatusCode, bytes::Bytes) {
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (status, body)
}

/// Parse body bytes as a `serde_json::Value`.
fn parse_json(b: bytes::Bytes) -> serde_json::Value {
    serde_json::from_slice(&b).expect("body is not valid JSON")
}

fn get(uri: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap()
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_200_ok_true() {
    let (status, body) = call(make_router(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["ok"], true);
    assert_eq!(json["service"], "pza-daemon");
}

// ---------------------------------------------------------------------------
// GET /bases
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bases_lists_the_seed_catalog_with_string_prices() {
    let (status, body) = call(make_router(), get("/bases")).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    let bases = json.as_array().expect("array body");
    assert_eq!(bases.len(), 3);
    assert_eq!(bases[0]["id"], 1);
    assert_eq!(bases[0]["name"], "Thin-crust");
    assert_eq!(bases[0]["price"], "5.00");
    assert_eq!(bases[2]["name"], "Cheese-burst");
    assert_eq!(bases[2]["price"], "7.00");
}

// ---------------------------------------------------------------------------
// GET /cheeses
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cheeses_lists_four_seed_rows() {
    let (status, body) = call(make_router(), get("/cheeses")).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    let cheeses = json.as_array().expect("array body");
    assert_eq!(cheeses.len(), 4);
    assert_eq!(cheeses[1]["name"], "Cheddar");
    assert_eq!(cheeses[1]["price"], "1.50");
}

// ---------------------------------------------------------------------------
// GET /toppings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn toppings_lists_seven_seed_rows_in_id_order() {
    let (status, body) = call(make_router(), get("/toppings")).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    let toppings = json.as_array().expect("array body");
    assert_eq!(toppings.len(), 7);
    let ids: Vec<i64> = toppings.iter().map(|t| t["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(toppings[1]["name"], "Mushrooms");
    assert_eq!(toppings[1]["price"], "0.50");
}

// ---------------------------------------------------------------------------
// Unknown routes return 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let (status, _) = call(make_router(), get("/does_not_exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
