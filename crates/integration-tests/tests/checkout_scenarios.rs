//! End-to-end checkout outcomes against a mocked REST backend.
//!
//! Run with: cargo test -p food-cart-integration-tests

use std::time::Duration;

use food_cart_core::{OrderId, Price, ProductId};
use food_cart_integration_tests::{TestBackend, cart_with, contact, shopper};
use food_cart_storefront::api::ApiClient;
use food_cart_storefront::checkout::{CheckoutError, CheckoutPhase, Reconciler};
use httpmock::prelude::*;
use url::Url;

fn shipping() -> Price {
    Price::from_cents(50_000)
}

// ============================================================================
// Successful checkout
// ============================================================================

#[tokio::test]
async fn test_order_placed_stock_decremented_cart_cleared() {
    let backend = TestBackend::start().await;
    let fetch = backend.product(1, "Milanesa", 10.0, 5).await;
    let order = backend
        .server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/pedidos")
                .json_body_partial(
                    r#"{"usuarioId":7,"estado":"pending","costoEnvio":500.0,"total":520.0}"#,
                );
            then.status(201).json_body(serde_json::json!({
                "id": 31, "usuarioId": 7, "estado": "pending", "total": 520.0,
                "telefono": "555-0101", "direccion": "Av. Corrientes 1234",
                "metodoPago": "cash", "detalles": []
            }));
        })
        .await;
    let update = backend.stock_update(1, "Milanesa", 10.0, 3, 200).await;
    let cart = cart_with(&[(1, 2)]);

    let mut phases = Vec::new();
    let receipt = Reconciler::new(&backend.client, &cart, shipping())
        .run_with(&shopper(), &contact(), |phase| phases.push(phase))
        .await
        .expect("checkout succeeds");

    fetch.assert_async().await;
    order.assert_async().await;
    update.assert_async().await;
    assert_eq!(receipt.order.id, OrderId::new(31));
    assert_eq!(receipt.request.total(), Price::from_cents(52_000));
    let line = receipt.request.lines().first().expect("one line");
    assert_eq!(line.unit_price, Price::from_cents(1_000));
    assert_eq!(line.quantity.get(), 2);
    assert!(cart.get().is_empty());
    assert_eq!(phases.last(), Some(&CheckoutPhase::Done));
}

// ============================================================================
// Failures before the order exists
// ============================================================================

#[tokio::test]
async fn test_insufficient_stock_reports_line_and_places_nothing() {
    let backend = TestBackend::start().await;
    backend.product(1, "Milanesa", 10.0, 2).await;
    let order = backend.order_created(1, 0.0).await;
    let cart = cart_with(&[(1, 10)]);

    let err = Reconciler::new(&backend.client, &cart, shipping())
        .run(&shopper(), &contact())
        .await
        .expect_err("stock is short");

    let CheckoutError::StockInsufficient { lines } = err else {
        panic!("expected StockInsufficient");
    };
    assert_eq!(lines.len(), 1);
    let shortfall = lines.first().expect("one shortfall");
    assert_eq!(shortfall.product_id, ProductId::new(1));
    assert_eq!(shortfall.name.as_deref(), Some("Milanesa"));
    assert_eq!(shortfall.available, 2);
    assert_eq!(shortfall.requested.get(), 10);

    order.assert_hits_async(0).await;
    assert_eq!(cart.count(), 10);
}

#[tokio::test]
async fn test_every_short_line_is_reported_at_once() {
    let backend = TestBackend::start().await;
    backend.product(1, "Milanesa", 10.0, 1).await;
    backend.product(2, "Empanada", 2.5, 12).await;
    backend.product(3, "Flan", 4.0, 0).await;
    let cart = cart_with(&[(1, 2), (2, 3), (3, 1)]);

    let err = Reconciler::new(&backend.client, &cart, shipping())
        .run(&shopper(), &contact())
        .await
        .expect_err("two lines are short");

    let CheckoutError::StockInsufficient { lines } = err else {
        panic!("expected StockInsufficient");
    };
    let ids: Vec<ProductId> = lines.iter().map(|line| line.product_id).collect();
    assert_eq!(ids, vec![ProductId::new(1), ProductId::new(3)]);
}

#[tokio::test]
async fn test_order_rejection_leaves_cart_and_stock_untouched() {
    let backend = TestBackend::start().await;
    backend.product(1, "Milanesa", 10.0, 5).await;
    backend.order_rejected(500).await;
    let update = backend.stock_update(1, "Milanesa", 10.0, 3, 200).await;
    let cart = cart_with(&[(1, 2)]);

    let err = Reconciler::new(&backend.client, &cart, shipping())
        .run(&shopper(), &contact())
        .await
        .expect_err("order creation fails");

    assert!(
        matches!(&err, CheckoutError::OrderCreateFailed { cause } if cause.status() == Some(500)),
        "unexpected error: {err:?}"
    );
    update.assert_hits_async(0).await;
    assert_eq!(cart.count(), 2);
}

#[tokio::test]
async fn test_deleted_product_is_a_shortfall() {
    let backend = TestBackend::start().await;
    backend
        .server
        .mock_async(|when, then| {
            when.method(GET).path("/productos/4");
            then.status(404).body("Producto no encontrado");
        })
        .await;
    let cart = cart_with(&[(4, 1)]);

    let err = Reconciler::new(&backend.client, &cart, shipping())
        .run(&shopper(), &contact())
        .await
        .expect_err("product is gone");

    assert!(
        matches!(&err, CheckoutError::StockInsufficient { lines } if lines.iter().all(|l| l.available == 0 && l.name.is_none())),
        "unexpected error: {err:?}"
    );
}

// ============================================================================
// Backend unreachable
// ============================================================================

#[tokio::test]
async fn test_unreachable_backend_is_transport_and_places_nothing() {
    // Nothing listens on the discard port, so every request is refused.
    let client = ApiClient::with_client(
        reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .expect("http client"),
        Url::parse("http://127.0.0.1:9").expect("base url"),
    );
    let cart = cart_with(&[(1, 2)]);

    let mut phases = Vec::new();
    let err = Reconciler::new(&client, &cart, shipping())
        .run_with(&shopper(), &contact(), |phase| phases.push(phase))
        .await
        .expect_err("backend is unreachable");

    assert!(matches!(err, CheckoutError::Transport { ref cause } if cause.is_transport()));
    assert_eq!(err.terminal_phase(), None);
    assert!(!err.order_created());
    assert!(err.is_retryable());
    assert_eq!(phases, vec![CheckoutPhase::ValidatingStock]);
    assert_eq!(cart.count(), 2);
}

// ============================================================================
// Failures after the order exists
// ============================================================================

#[tokio::test]
async fn test_partial_stock_update_keeps_order_and_cart() {
    let backend = TestBackend::start().await;
    backend.product(1, "Milanesa", 10.0, 5).await;
    backend.product(2, "Empanada", 2.5, 12).await;
    let order = backend.order_created(44, 517.5).await;
    let first = backend.stock_update(1, "Milanesa", 10.0, 4, 200).await;
    let second = backend.stock_update(2, "Empanada", 2.5, 9, 500).await;
    let cart = cart_with(&[(1, 1), (2, 3)]);

    let mut phases = Vec::new();
    let err = Reconciler::new(&backend.client, &cart, shipping())
        .run_with(&shopper(), &contact(), |phase| phases.push(phase))
        .await
        .expect_err("one stock update fails");

    order.assert_async().await;
    first.assert_async().await;
    second.assert_async().await;
    assert!(err.order_created());
    let CheckoutError::StockUpdateFailed {
        order_id,
        failed_product_ids,
        ..
    } = err
    else {
        panic!("expected StockUpdateFailed");
    };
    assert_eq!(order_id, OrderId::new(44));
    assert_eq!(failed_product_ids, vec![ProductId::new(2)]);
    assert_eq!(cart.count(), 4);
    assert_eq!(
        phases,
        vec![
            CheckoutPhase::ValidatingStock,
            CheckoutPhase::CreatingOrder,
            CheckoutPhase::UpdatingStock,
            CheckoutPhase::StockUpdateFailed,
        ]
    );
}
