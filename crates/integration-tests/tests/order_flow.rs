//! Integration tests for the order page: size selection, quantity bounds,
//! persistence across page loads, and cancellation.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::{Value, json};
use sunbloom_core::{Price, PricingSnapshot};
use sunbloom_integration_tests::{PRODUCT_ID, TestApp};

fn pricing(view: &Value) -> PricingSnapshot {
    serde_json::from_value(view["draft"]["pricing"].clone()).unwrap()
}

// =============================================================================
// Page Load
// =============================================================================

#[tokio::test]
async fn test_health() {
    let mut app = TestApp::spawn().await;
    let response = app.client.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text, "ok");
}

#[tokio::test]
async fn test_order_page_starts_empty() {
    let mut app = TestApp::spawn().await;

    let response = app.client.get("/order").await;
    assert_eq!(response.status, StatusCode::OK);

    let view = response.json();
    assert_eq!(view["product"]["id"], PRODUCT_ID);
    assert_eq!(view["product"]["sizes"].as_array().unwrap().len(), 3);
    assert_eq!(view["draft"]["selectedSize"], Value::Null);
    assert_eq!(view["draft"]["quantity"], 1);
    assert_eq!(view["shippingMethod"], "standard");
    assert_eq!(pricing(&view), PricingSnapshot::ZERO);
}

#[tokio::test]
async fn test_catalog_is_cached_between_requests() {
    let mut app = TestApp::spawn().await;
    app.client.get("/order").await;
    app.client.get("/order").await;
    assert_eq!(app.backend.product_fetches(), 1);
}

// =============================================================================
// Size And Quantity
// =============================================================================

#[tokio::test]
async fn test_select_size_prices_one_unit() {
    let mut app = TestApp::spawn().await;

    let response = app.client.post("/order/size", json!({ "sizeId": "large" })).await;
    assert_eq!(response.status, StatusCode::OK);

    let view = response.json();
    assert_eq!(view["changed"], true);
    assert_eq!(view["draft"]["selectedSize"]["id"], "large");
    assert_eq!(view["draft"]["quantity"], 1);
    assert_eq!(
        pricing(&view),
        PricingSnapshot::new(Price::from_units(9000), Price::ZERO)
    );
}

#[tokio::test]
async fn test_out_of_stock_size_is_ignored() {
    let mut app = TestApp::spawn().await;

    let view = app
        .client
        .post("/order/size", json!({ "sizeId": "family" }))
        .await
        .json();
    assert_eq!(view["changed"], false);
    assert_eq!(view["draft"]["selectedSize"], Value::Null);
}

#[tokio::test]
async fn test_unknown_size_is_ignored() {
    let mut app = TestApp::spawn().await;
    app.client.post("/order/size", json!({ "sizeId": "small" })).await;

    let view = app
        .client
        .post("/order/size", json!({ "sizeId": "jumbo" }))
        .await
        .json();
    assert_eq!(view["changed"], false);
    assert_eq!(view["draft"]["selectedSize"]["id"], "small");
}

#[tokio::test]
async fn test_quantity_clamped_to_stock() {
    let mut app = TestApp::spawn().await;
    app.client.post("/order/size", json!({ "sizeId": "large" })).await;

    let view = app
        .client
        .post("/order/quantity", json!({ "delta": 5 }))
        .await
        .json();
    assert_eq!(view["draft"]["quantity"], 2);
    assert_eq!(
        pricing(&view),
        PricingSnapshot::new(Price::from_units(18_000), Price::ZERO)
    );

    let view = app
        .client
        .post("/order/quantity", json!({ "delta": -10 }))
        .await
        .json();
    assert_eq!(view["draft"]["quantity"], 1);
}

#[tokio::test]
async fn test_quantity_without_size_does_nothing() {
    let mut app = TestApp::spawn().await;

    let view = app
        .client
        .post("/order/quantity", json!({ "delta": 3 }))
        .await
        .json();
    assert_eq!(view["changed"], false);
    assert_eq!(view["draft"]["quantity"], 1);
}

#[tokio::test]
async fn test_changing_size_resets_quantity() {
    let mut app = TestApp::spawn().await;
    app.client.post("/order/size", json!({ "sizeId": "small" })).await;
    app.client.post("/order/quantity", json!({ "delta": 4 })).await;

    let view = app
        .client
        .post("/order/size", json!({ "sizeId": "large" }))
        .await
        .json();
    assert_eq!(view["draft"]["quantity"], 1);
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn test_selection_survives_page_load() {
    let mut app = TestApp::spawn().await;
    app.client.post("/order/size", json!({ "sizeId": "small" })).await;
    app.client.post("/order/quantity", json!({ "delta": 2 })).await;
    assert!(app.client.has_session());

    let view = app.client.get("/order").await.json();
    assert_eq!(view["draft"]["selectedSize"]["id"], "small");
    assert_eq!(view["draft"]["quantity"], 3);
    assert_eq!(
        pricing(&view),
        PricingSnapshot::new(Price::from_units(15_000), Price::ZERO)
    );
}

#[tokio::test]
async fn test_selection_is_per_shopper() {
    let mut app = TestApp::spawn().await;
    app.client.post("/order/size", json!({ "sizeId": "small" })).await;

    let mut other = app.client.another_shopper();
    let view = other.get("/order").await.json();
    assert_eq!(view["draft"]["selectedSize"], Value::Null);
}

#[tokio::test]
async fn test_cancel_discards_selection() {
    let mut app = TestApp::spawn().await;
    app.client.post("/order/size", json!({ "sizeId": "small" })).await;

    let view = app.client.post_empty("/order/cancel").await.json();
    assert_eq!(view["draft"]["selectedSize"], Value::Null);
    assert_eq!(pricing(&view), PricingSnapshot::ZERO);

    let view = app.client.get("/order").await.json();
    assert_eq!(view["draft"]["selectedSize"], Value::Null);
}

// =============================================================================
// Catalog Failures
// =============================================================================

#[tokio::test]
async fn test_catalog_failure_points_home() {
    let app = TestApp::spawn().await;
    app.backend.fail_catalog(StatusCode::INTERNAL_SERVER_ERROR);
    let mut client = app.client;

    let response = client.get("/order").await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.json()["recovery"], "/");
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let mut app = TestApp::spawn_with(|config| {
        config.product_id = sunbloom_core::ProductId::new("000000");
    })
    .await;

    let response = app.client.get("/order").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["recovery"], "/");
}
