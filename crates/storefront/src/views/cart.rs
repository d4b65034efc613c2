use food_cart_core::{Price, ProductId, Quantity};
use futures::future::join_all;
use thiserror::Error;
use tracing::warn;

use crate::api::{ApiError, Backend};
use crate::cart::CartStore;
use crate::store::{KeyValueStore, StoreError};

/// Errors from adding a product to the cart.
#[derive(Debug, Error)]
pub enum AddToCartError {
    /// The cart already holds every unit in stock.
    #[error("only {available} of \"{name}\" in stock")]
    OutOfStock { name: String, available: u32 },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One cart line joined with live product data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub image_url: Option<String>,
    pub unit_price: Price,
    pub quantity: Quantity,
    pub available_stock: u32,
}

impl CartLineView {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price * self.quantity.get()
    }

    /// Whether one more unit fits in live stock.
    #[must_use]
    pub const fn can_increment(&self) -> bool {
        self.quantity.get() < self.available_stock
    }
}

/// The cart as shown to the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    /// Cart entries whose product could not be loaded.
    pub skipped: Vec<ProductId>,
    pub shipping_cost: Price,
}

impl CartView {
    /// Fetch every product in the cart and join it with the stored quantity.
    ///
    /// Products that cannot be fetched are left out and listed in
    /// [`skipped`](Self::skipped).
    pub async fn load<B: Backend, S: KeyValueStore>(
        cart: &CartStore<S>,
        backend: &B,
        shipping_cost: Price,
    ) -> Self {
        let entries = cart.get();
        let fetched = join_all(
            entries
                .iter()
                .map(|line| backend.fetch_product(line.product_id)),
        )
        .await;

        let mut lines = Vec::with_capacity(entries.len());
        let mut skipped = Vec::new();
        for (entry, result) in entries.iter().zip(fetched) {
            match result {
                Ok(product) => lines.push(CartLineView {
                    product_id: product.id,
                    name: product.name,
                    image_url: product.image_url,
                    unit_price: product.unit_price,
                    quantity: entry.quantity,
                    available_stock: product.available_stock,
                }),
                Err(e) => {
                    warn!(product_id = %entry.product_id, error = %e, "Skipping cart line");
                    skipped.push(entry.product_id);
                }
            }
        }

        Self {
            lines,
            skipped,
            shipping_cost,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.iter().map(CartLineView::line_total).sum()
    }

    /// Shipping charged for this cart; nothing when it is empty.
    #[must_use]
    pub fn shipping(&self) -> Price {
        if self.is_empty() {
            Price::ZERO
        } else {
            self.shipping_cost
        }
    }

    #[must_use]
    pub fn total(&self) -> Price {
        self.subtotal() + self.shipping()
    }

    /// Whether the line for `product_id` may be incremented.
    ///
    /// `false` for products not shown in the cart.
    #[must_use]
    pub fn can_increment(&self, product_id: ProductId) -> bool {
        self.lines
            .iter()
            .find(|line| line.product_id == product_id)
            .is_some_and(CartLineView::can_increment)
    }
}

/// Add one unit of `product_id` unless the cart already holds all live stock.
///
/// Returns the new quantity in the cart. Checkout re-validates regardless.
///
/// # Errors
///
/// - [`AddToCartError::OutOfStock`] if no more units are available
/// - [`AddToCartError::Api`] if the product cannot be fetched
/// - [`AddToCartError::Store`] if the cart cannot be persisted
pub async fn add_with_stock_check<B: Backend, S: KeyValueStore>(
    cart: &CartStore<S>,
    backend: &B,
    product_id: ProductId,
) -> Result<Quantity, AddToCartError> {
    let product = backend.fetch_product(product_id).await?;
    let in_cart = cart.quantity_of(product_id).map_or(0, Quantity::get);

    if in_cart >= product.available_stock {
        return Err(AddToCartError::OutOfStock {
            name: product.name,
            available: product.available_stock,
        });
    }

    cart.add(product_id)?;
    Ok(cart.quantity_of(product_id).unwrap_or(Quantity::ONE))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;
    use crate::store::MemoryStore;

    fn pid(id: i64) -> ProductId {
        ProductId::new(id)
    }

    #[tokio::test]
    async fn test_load_joins_live_data_and_totals() {
        let backend = FakeBackend::new()
            .with_product(1, "Taco", 250, 5)
            .with_product(2, "Horchata", 120, 1);
        let cart = CartStore::new(MemoryStore::new());
        cart.add(pid(1)).unwrap();
        cart.set_quantity(pid(1), 2).unwrap();
        cart.add(pid(2)).unwrap();

        let view = CartView::load(&cart, &backend, Price::from_cents(500)).await;

        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.subtotal(), Price::from_cents(620));
        assert_eq!(view.total(), Price::from_cents(1120));
        assert_eq!(view.total().to_string(), "$11.20");
        assert!(view.can_increment(pid(1)));
        assert!(!view.can_increment(pid(2)));
    }

    #[tokio::test]
    async fn test_load_skips_unavailable_products() {
        let backend = FakeBackend::new().with_product(1, "Taco", 250, 5);
        let cart = CartStore::new(MemoryStore::new());
        cart.add(pid(1)).unwrap();
        cart.add(pid(99)).unwrap();

        let view = CartView::load(&cart, &backend, Price::ZERO).await;

        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.skipped, vec![pid(99)]);
    }

    #[tokio::test]
    async fn test_empty_cart_has_no_shipping() {
        let backend = FakeBackend::new();
        let cart = CartStore::new(MemoryStore::new());

        let view = CartView::load(&cart, &backend, Price::from_cents(500)).await;

        assert!(view.is_empty());
        assert_eq!(view.total(), Price::ZERO);
    }

    #[tokio::test]
    async fn test_add_stops_at_live_stock() {
        let backend = FakeBackend::new().with_product(3, "Flan", 300, 2);
        let cart = CartStore::new(MemoryStore::new());

        assert_eq!(
            add_with_stock_check(&cart, &backend, pid(3)).await.unwrap().get(),
            1
        );
        assert_eq!(
            add_with_stock_check(&cart, &backend, pid(3)).await.unwrap().get(),
            2
        );
        let err = add_with_stock_check(&cart, &backend, pid(3))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AddToCartError::OutOfStock { ref name, available: 2 } if name == "Flan"
        ));
        assert_eq!(cart.count(), 2);
    }

    #[tokio::test]
    async fn test_add_unknown_product_leaves_cart() {
        let backend = FakeBackend::new();
        let cart = CartStore::new(MemoryStore::new());

        let err = add_with_stock_check(&cart, &backend, pid(4))
            .await
            .unwrap_err();

        assert!(matches!(err, AddToCartError::Api(ref e) if e.is_not_found()));
        assert!(cart.get().is_empty());
    }
}
