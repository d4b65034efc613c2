//! Integration tests for Food Cart.
//!
//! The REST backend is replaced by an `httpmock` server; everything on the
//! client side (HTTP client, cart store, reconciler) is the real thing.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p food-cart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_scenarios` - End-to-end checkout outcomes
//! - `local_state` - Cart and session persistence on disk

use food_cart_core::{Email, ProductId, Role, UserId};
use food_cart_storefront::api::{ApiClient, ContactDetails};
use food_cart_storefront::cart::CartStore;
use food_cart_storefront::session::SessionUser;
use food_cart_storefront::store::{KeyValueStore, MemoryStore};
use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::json;
use url::Url;

/// A mocked backend and a client pointed at it.
pub struct TestBackend {
    pub server: MockServer,
    pub client: ApiClient,
}

impl TestBackend {
    /// Start a mock server.
    ///
    /// # Panics
    ///
    /// Panics if the server URL cannot be parsed.
    pub async fn start() -> Self {
        let server = MockServer::start_async().await;
        let base = Url::parse(&server.base_url()).expect("mock server URL");
        let client = ApiClient::with_client(reqwest::Client::new(), base);
        Self { server, client }
    }

    /// Serve `GET /productos/{id}`.
    pub async fn product(&self, id: i64, name: &str, price: f64, stock: u32) -> Mock<'_> {
        self.server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/productos/{id}"));
                then.status(200).json_body(product_json(id, name, price, stock));
            })
            .await
    }

    /// Expect `PUT /productos/{id}` writing `stock`, answering with `status`.
    pub async fn stock_update(
        &self,
        id: i64,
        name: &str,
        price: f64,
        stock: u32,
        status: u16,
    ) -> Mock<'_> {
        self.server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path(format!("/productos/{id}"))
                    .json_body(json!({
                        "nombre": name,
                        "precio": price,
                        "stock": stock,
                        "categoriaId": null
                    }));
                if status == 200 {
                    then.status(200)
                        .json_body(product_json(id, name, price, stock));
                } else {
                    then.status(status);
                }
            })
            .await
    }

    /// Accept `POST /pedidos` and answer with a pending order `order_id`.
    pub async fn order_created(&self, order_id: i64, total: f64) -> Mock<'_> {
        self.server
            .mock_async(|when, then| {
                when.method(POST).path("/pedidos");
                then.status(201).json_body(json!({
                    "id": order_id,
                    "usuarioId": shopper().id,
                    "fecha": "2025-06-01T19:30:00",
                    "estado": "pending",
                    "total": total,
                    "telefono": "555-0101",
                    "direccion": "Av. Corrientes 1234",
                    "metodoPago": "cash",
                    "detalles": []
                }));
            })
            .await
    }

    /// Fail `POST /pedidos` with `status`.
    pub async fn order_rejected(&self, status: u16) -> Mock<'_> {
        self.server
            .mock_async(|when, then| {
                when.method(POST).path("/pedidos");
                then.status(status);
            })
            .await
    }
}

fn product_json(id: i64, name: &str, price: f64, stock: u32) -> serde_json::Value {
    json!({
        "id": id,
        "nombre": name,
        "precio": price,
        "stock": stock,
        "disponible": stock > 0
    })
}

/// An in-memory cart holding `(product, quantity)` lines.
///
/// # Panics
///
/// Panics if a quantity is not positive.
pub fn cart_with(lines: &[(i64, i64)]) -> CartStore<MemoryStore> {
    cart_in(MemoryStore::new(), lines)
}

/// A cart over `store` holding `(product, quantity)` lines.
///
/// # Panics
///
/// Panics if the store rejects a write.
pub fn cart_in<S: KeyValueStore>(store: S, lines: &[(i64, i64)]) -> CartStore<S> {
    let cart = CartStore::new(store);
    for &(id, quantity) in lines {
        let id = ProductId::new(id);
        cart.add(id).expect("add to cart");
        cart.set_quantity(id, quantity).expect("set quantity");
    }
    cart
}

/// A logged-in shopper.
///
/// # Panics
///
/// Never; the address is a literal.
pub fn shopper() -> SessionUser {
    SessionUser {
        id: UserId::new(7),
        name: "Valentina".to_string(),
        email: Email::parse("valentina@food.test").expect("valid email"),
        role: Role::Usuario,
    }
}

/// A complete checkout form.
pub fn contact() -> ContactDetails {
    ContactDetails {
        phone: "555-0101".to_string(),
        address: "Av. Corrientes 1234".to_string(),
        payment_method: "cash".to_string(),
        notes: None,
    }
}
