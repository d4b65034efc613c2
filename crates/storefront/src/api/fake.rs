//! In-memory [`Backend`] for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use food_cart_core::{OrderId, OrderStatus, Price, ProductId};

use super::{ApiError, Backend, OrderRecord, OrderRequest, ProductSnapshot, ProductUpsert};

/// Records every call and answers from a fixed product table.
#[derive(Debug, Default)]
pub struct FakeBackend {
    products: Mutex<HashMap<ProductId, ProductSnapshot>>,
    fail_fetch: HashSet<ProductId>,
    fail_update: HashSet<ProductId>,
    fail_create: bool,
    pub fetches: Mutex<Vec<ProductId>>,
    pub orders: Mutex<Vec<OrderRequest>>,
    pub updates: Mutex<Vec<(ProductId, ProductUpsert)>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(self, id: i64, name: &str, cents: i64, stock: u32) -> Self {
        let product = ProductSnapshot {
            id: ProductId::new(id),
            name: name.to_string(),
            description: None,
            unit_price: Price::from_cents(cents),
            available_stock: stock,
            category_id: None,
            image_url: None,
            available: None,
        };
        lock(&self.products).insert(product.id, product);
        self
    }

    pub fn failing_fetch(mut self, id: i64) -> Self {
        self.fail_fetch.insert(ProductId::new(id));
        self
    }

    pub fn failing_update(mut self, id: i64) -> Self {
        self.fail_update.insert(ProductId::new(id));
        self
    }

    pub const fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn stock_of(&self, id: i64) -> Option<u32> {
        lock(&self.products)
            .get(&ProductId::new(id))
            .map(|p| p.available_stock)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn server_error() -> ApiError {
    ApiError::RequestFailed {
        status: 500,
        message: "Internal Server Error".to_string(),
    }
}

impl Backend for FakeBackend {
    async fn fetch_product(&self, id: ProductId) -> Result<ProductSnapshot, ApiError> {
        lock(&self.fetches).push(id);
        if self.fail_fetch.contains(&id) {
            return Err(server_error());
        }
        lock(&self.products)
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::RequestFailed {
                status: 404,
                message: "Not Found".to_string(),
            })
    }

    async fn create_order(&self, order: &OrderRequest) -> Result<OrderRecord, ApiError> {
        if self.fail_create {
            return Err(server_error());
        }
        let mut orders = lock(&self.orders);
        orders.push(order.clone());
        let id = i64::try_from(orders.len()).unwrap_or(i64::MAX);
        Ok(OrderRecord {
            id: OrderId::new(id),
            user_id: order.user_id(),
            placed_at: None,
            status: OrderStatus::Pending,
            total: order.total(),
            phone: order.contact().phone.clone(),
            address: order.contact().address.clone(),
            payment_method: order.contact().payment_method.clone(),
            notes: order.contact().notes.clone(),
            lines: Vec::new(),
        })
    }

    async fn update_product(
        &self,
        id: ProductId,
        product: &ProductUpsert,
    ) -> Result<Option<ProductSnapshot>, ApiError> {
        lock(&self.updates).push((id, product.clone()));
        if self.fail_update.contains(&id) {
            return Err(server_error());
        }
        let mut products = lock(&self.products);
        let updated = products.get_mut(&id).map(|p| {
            p.available_stock = product.stock;
            p.clone()
        });
        Ok(updated)
    }
}
