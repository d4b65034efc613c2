//! Checkout failure taxonomy.

use std::fmt;

use food_cart_core::{OrderId, ProductId, Quantity};
use thiserror::Error;

use super::CheckoutPhase;
use crate::api::ApiError;
use crate::store::StoreError;

/// One cart line that cannot be fulfilled from current stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockShortfall {
    pub product_id: ProductId,
    /// `None` when the product could not be fetched at all.
    pub name: Option<String>,
    pub available: u32,
    pub requested: Quantity,
}

impl fmt::Display for StockShortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "\"{name}\"")?,
            None => write!(f, "product {}", self.product_id)?,
        }
        write!(
            f,
            ": stock={}, requested={}",
            self.available, self.requested
        )
    }
}

/// Why a checkout attempt stopped.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A required contact field is blank.
    #[error("{0} is required")]
    InvalidForm(&'static str),

    /// There is nothing to order.
    #[error("the cart is empty")]
    EmptyCart,

    /// At least one line asks for more than is in stock. Nothing was changed.
    #[error("not enough stock for: {}", describe(.lines))]
    StockInsufficient { lines: Vec<StockShortfall> },

    /// The backend refused or failed to create the order. Nothing was changed.
    #[error("order could not be created: {cause}")]
    OrderCreateFailed {
        #[source]
        cause: ApiError,
    },

    /// The order exists but some stock counts were not decremented and need
    /// manual reconciliation.
    #[error(
        "order {order_id} was created but stock was not updated for products [{}]: {cause}",
        join_ids(.failed_product_ids)
    )]
    StockUpdateFailed {
        order_id: OrderId,
        failed_product_ids: Vec<ProductId>,
        #[source]
        cause: ApiError,
    },

    /// The backend could not be reached while checking stock.
    #[error("backend unreachable: {cause}")]
    Transport {
        #[source]
        cause: ApiError,
    },

    /// The order went through but the local cart could not be emptied.
    #[error("order {order_id} was placed but the cart could not be cleared: {source}")]
    CartNotCleared { order_id: OrderId, source: StoreError },
}

impl CheckoutError {
    /// Terminal phase of the attempt.
    ///
    /// `None` if the attempt was rejected before any network call, or was cut
    /// short because the backend could not be reached.
    #[must_use]
    pub const fn terminal_phase(&self) -> Option<CheckoutPhase> {
        match self {
            Self::InvalidForm(_) | Self::EmptyCart | Self::Transport { .. } => None,
            Self::StockInsufficient { .. } => Some(CheckoutPhase::StockInsufficient),
            Self::OrderCreateFailed { .. } => Some(CheckoutPhase::OrderCreateFailed),
            Self::StockUpdateFailed { .. } => Some(CheckoutPhase::StockUpdateFailed),
            Self::CartNotCleared { .. } => Some(CheckoutPhase::Done),
        }
    }

    /// Returns `true` if an order was persisted despite the error.
    #[must_use]
    pub const fn order_created(&self) -> bool {
        matches!(
            self,
            Self::StockUpdateFailed { .. } | Self::CartNotCleared { .. }
        )
    }

    /// Returns `true` if the same cart may simply be submitted again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::OrderCreateFailed { .. } | Self::Transport { .. }
        )
    }
}

fn describe(lines: &[StockShortfall]) -> String {
    lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_ids(ids: &[ProductId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
