//! Command implementations.
//!
//! Each command gets a [`Context`] holding the backend client and the
//! file-backed cart and session, and prints its result to stdout.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

use food_cart_storefront::api::{ApiClient, ApiError};
use food_cart_storefront::cart::{CartError, CartStore};
use food_cart_storefront::checkout::CheckoutError;
use food_cart_storefront::config::{ClientConfig, ConfigError};
use food_cart_storefront::session::{AuthError, SessionStore};
use food_cart_storefront::store::{FileStore, StoreError};
use food_cart_storefront::views::AddToCartError;
use thiserror::Error;

/// Errors that end a command with a non-zero exit code.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("Checkout failed: {0}")]
    Checkout(#[from] CheckoutError),

    #[error("{0}")]
    AddToCart(#[from] AddToCartError),

    /// The backend has no record with this ID.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },
}

/// Shared handles for one command invocation.
pub struct Context {
    pub config: ClientConfig,
    pub client: ApiClient,
    pub cart: CartStore<FileStore>,
    pub session: SessionStore<FileStore>,
}

impl Context {
    /// Build the client and open the stores under the configured data dir.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, CliError> {
        let client = ApiClient::new(&config)?;
        let store = FileStore::new(config.data_dir.clone());
        Ok(Self {
            client,
            cart: CartStore::new(store.clone()),
            session: SessionStore::new(store),
            config,
        })
    }
}
