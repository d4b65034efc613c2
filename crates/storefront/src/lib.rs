//! Food Cart storefront library.
//!
//! Everything a front-end needs to let a shopper build a cart and check it
//! out against the food-ordering REST backend:
//!
//! - [`store`]: file-backed key-value persistence for the cart and session
//! - [`cart`]: the local cart of product/quantity lines
//! - [`session`]: the logged-in user, passed explicitly to operations
//! - [`api`]: the REST client and the [`api::Backend`] seam
//! - [`checkout`]: stock reconciliation and order placement
//! - [`views`]: cart, catalog and order-history data for display
//! - [`config`]: environment-driven settings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod session;
pub mod store;
pub mod views;
