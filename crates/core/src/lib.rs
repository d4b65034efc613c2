//! Food Cart Core - Shared domain types.
//!
//! This crate provides the types used across all Food Cart components:
//! - `storefront` - Cart store, backend client and checkout reconciler
//! - `cli` - Command-line front-end for shoppers and admins
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! This keeps it lightweight and usable from tests without any collaborators.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, quantities, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
