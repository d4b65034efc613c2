//! Local cart store.
//!
//! The cart is an ordered list of `(product, quantity)` lines persisted under
//! [`keys::CART`](crate::store::keys::CART). It holds no prices or stock: those
//! are always fetched fresh from the backend when the cart is shown or checked
//! out. Upper bounds on quantity are enforced against live stock by callers,
//! never here.

use food_cart_core::{ProductId, Quantity, QuantityError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::store::{KeyValueStore, StoreError, keys};

/// Errors from editing a cart line's quantity.
#[derive(Debug, Error)]
pub enum CartError {
    /// The requested quantity cannot be stored on a line.
    #[error("invalid quantity: {0}")]
    Quantity(#[from] QuantityError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One product/quantity pair pending purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

impl CartLine {
    /// Create a cart line.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: Quantity) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Cart persisted in a [`KeyValueStore`].
///
/// Every mutation rewrites the full line list.
#[derive(Debug, Clone)]
pub struct CartStore<S> {
    store: S,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Wrap a key-value store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Current cart lines, in insertion order.
    ///
    /// Never fails: a missing, unreadable or malformed cart reads as empty.
    #[must_use]
    pub fn get(&self) -> Vec<CartLine> {
        let raw = match self.store.get(keys::CART) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read cart, treating as empty");
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "Stored cart is malformed, treating as empty");
            Vec::new()
        })
    }

    /// Quantity of `product_id` in the cart, if present.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> Option<Quantity> {
        self.get()
            .into_iter()
            .find(|line| line.product_id == product_id)
            .map(|line| line.quantity)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.get()
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Add one unit of `product_id`, inserting a new line if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn add(&self, product_id: ProductId) -> Result<(), StoreError> {
        let mut lines = self.get();
        match lines.iter_mut().find(|line| line.product_id == product_id) {
            Some(line) => line.quantity = line.quantity.incremented(),
            None => lines.push(CartLine::new(product_id, Quantity::ONE)),
        }
        self.save(&lines)
    }

    /// Overwrite the quantity of an existing line.
    ///
    /// A quantity of zero or less removes the line. This never inserts: for a
    /// product that is not in the cart it does nothing, so use
    /// [`add`](Self::add) first.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Quantity`] if `quantity` exceeds `u32::MAX`, leaving
    /// the cart unchanged, or [`CartError::Store`] if the cart cannot be
    /// persisted.
    pub fn set_quantity(&self, product_id: ProductId, quantity: i64) -> Result<(), CartError> {
        let quantity = match Quantity::new(quantity) {
            Ok(quantity) => quantity,
            Err(QuantityError::NotPositive(_)) => return Ok(self.remove(product_id)?),
            Err(e) => return Err(e.into()),
        };

        let mut lines = self.get();
        let Some(line) = lines.iter_mut().find(|line| line.product_id == product_id) else {
            return Ok(());
        };
        line.quantity = quantity;
        Ok(self.save(&lines)?)
    }

    /// Remove the line for `product_id`, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn remove(&self, product_id: ProductId) -> Result<(), StoreError> {
        let mut lines = self.get();
        let before = lines.len();
        lines.retain(|line| line.product_id != product_id);
        if lines.len() == before {
            return Ok(());
        }
        self.save(&lines)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored cart cannot be deleted.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(keys::CART)
    }

    fn save(&self, lines: &[CartLine]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(lines)?;
        self.store.set(keys::CART, &raw)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn cart() -> CartStore<MemoryStore> {
        CartStore::new(MemoryStore::new())
    }

    fn pid(id: i64) -> ProductId {
        ProductId::new(id)
    }

    #[test]
    fn test_get_empty_cart() {
        assert!(cart().get().is_empty());
    }

    #[test]
    fn test_add_inserts_then_increments() {
        let cart = cart();
        cart.add(pid(1)).unwrap();
        cart.add(pid(2)).unwrap();
        cart.add(pid(1)).unwrap();

        assert_eq!(
            cart.get(),
            vec![
                CartLine::new(pid(1), Quantity::new(2).unwrap()),
                CartLine::new(pid(2), Quantity::ONE),
            ]
        );
        assert_eq!(cart.count(), 3);
    }

    #[test]
    fn test_set_quantity_overwrites() {
        let cart = cart();
        cart.add(pid(5)).unwrap();
        cart.set_quantity(pid(5), 7).unwrap();
        assert_eq!(cart.quantity_of(pid(5)).map(Quantity::get), Some(7));
    }

    #[test]
    fn test_set_quantity_zero_or_negative_removes() {
        let cart = cart();
        cart.add(pid(5)).unwrap();
        cart.add(pid(6)).unwrap();

        cart.set_quantity(pid(5), 0).unwrap();
        cart.set_quantity(pid(6), -2).unwrap();
        assert!(cart.get().is_empty());
    }

    #[test]
    fn test_set_quantity_too_large_keeps_line() {
        let cart = cart();
        cart.add(pid(1)).unwrap();
        cart.set_quantity(pid(1), 4).unwrap();

        let err = cart.set_quantity(pid(1), 5_000_000_000).unwrap_err();

        assert!(matches!(
            err,
            CartError::Quantity(QuantityError::TooLarge(5_000_000_000))
        ));
        assert_eq!(cart.quantity_of(pid(1)).map(Quantity::get), Some(4));
    }

    #[test]
    fn test_set_quantity_max_round_trips() {
        let cart = cart();
        cart.add(pid(1)).unwrap();
        cart.set_quantity(pid(1), i64::from(u32::MAX)).unwrap();
        assert_eq!(cart.quantity_of(pid(1)).map(Quantity::get), Some(u32::MAX));
    }

    #[test]
    fn test_set_quantity_on_missing_line_is_noop() {
        let cart = cart();
        cart.set_quantity(pid(9), 3).unwrap();
        assert!(cart.get().is_empty());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let cart = cart();
        cart.add(pid(1)).unwrap();
        cart.remove(pid(2)).unwrap();
        assert_eq!(cart.get().len(), 1);
        cart.remove(pid(1)).unwrap();
        assert!(cart.get().is_empty());
    }

    #[test]
    fn test_clear_twice_leaves_cart_empty() {
        let cart = cart();
        cart.add(pid(1)).unwrap();
        cart.clear().unwrap();
        assert!(cart.get().is_empty());
        cart.clear().unwrap();
        assert!(cart.get().is_empty());
    }

    #[test]
    fn test_malformed_blob_reads_as_empty() {
        let store = MemoryStore::new();
        store.set(keys::CART, "{not json").unwrap();
        assert!(CartStore::new(store.clone()).get().is_empty());

        store
            .set(keys::CART, r#"[{"productId":1,"quantity":0}]"#)
            .unwrap();
        assert!(CartStore::new(store).get().is_empty());
    }

    #[test]
    fn test_wire_format_matches_stored_cart() {
        let store = MemoryStore::new();
        let cart = CartStore::new(store.clone());
        cart.add(pid(3)).unwrap();

        let raw = store.get(keys::CART).unwrap().unwrap();
        assert_eq!(raw, r#"[{"productId":3,"quantity":1}]"#);
    }
}
