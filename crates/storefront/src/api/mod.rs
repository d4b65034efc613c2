//! REST backend client.
//!
//! # Architecture
//!
//! - [`ApiClient`] maps every domain operation to one HTTP request against a
//!   fixed base URL using `reqwest`
//! - Non-2xx responses become [`ApiError::RequestFailed`] carrying the status
//!   and the server's message; connection problems become
//!   [`ApiError::Transport`]
//! - Responses are decoded through explicit validation (see [`types`]) and
//!   fail closed with [`ApiError::Decode`]
//! - The [`Backend`] trait covers the operations checkout depends on, so the
//!   reconciler can run against a fake in tests
//!
//! # Example
//!
//! ```rust,ignore
//! use food_cart_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config)?;
//! let product = client.fetch_product(ProductId::new(1)).await?;
//! println!("{} in stock", product.available_stock);
//! ```

mod client;
#[cfg(test)]
pub(crate) mod fake;
pub mod types;

use std::future::Future;

use food_cart_core::ProductId;
use thiserror::Error;

pub use client::ApiClient;
pub use types::*;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    #[error("request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    /// The request could not be completed (DNS, refused connection, timeout).
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be decoded or failed validation.
    #[error("could not decode response: {0}")]
    Decode(#[from] DecodeError),

    /// A request URL could not be built from the base URL.
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status of a failed request, if the backend answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if the backend answered 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }

    /// Returns `true` if the request never got an answer.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Errors from decoding and validating a response body.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body is not the JSON shape expected.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field was absent or null.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A field was present but its value is not acceptable.
    #[error("invalid field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// A body was required but the backend answered 204 No Content.
    #[error("expected a response body, got none")]
    EmptyBody,
}

impl DecodeError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Backend operations the checkout flow depends on.
pub trait Backend: Sync {
    /// Fetch a fresh, validated snapshot of one product.
    fn fetch_product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<ProductSnapshot, ApiError>> + Send;

    /// Persist a new order.
    fn create_order(
        &self,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<OrderRecord, ApiError>> + Send;

    /// Replace a product (used to write back decremented stock).
    ///
    /// Resolves to `None` when the backend answers 204 No Content.
    fn update_product(
        &self,
        id: ProductId,
        product: &ProductUpsert,
    ) -> impl Future<Output = Result<Option<ProductSnapshot>, ApiError>> + Send;
}
