//! Presentation data for the cart, catalog and order history.
//!
//! Views gather and shape what a front-end shows; they do not render. Money
//! formats through [`Price`](food_cart_core::Price)'s `Display` (two
//! decimals).

mod cart;
mod catalog;
mod orders;

pub use cart::{AddToCartError, CartLineView, CartView, add_with_stock_check};
pub use catalog::{Catalog, load_catalog};
pub use orders::{filter_by_status, newest_first, order_history};
