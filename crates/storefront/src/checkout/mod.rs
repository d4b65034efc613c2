//! Checkout reconciliation.
//!
//! Turns the local cart into a persisted order and keeps backend stock in
//! step:
//!
//! 1. Reject an empty cart or blank contact form without touching the network
//! 2. Fetch every product fresh and check stock ([`CheckoutPhase::ValidatingStock`])
//! 3. Build and submit the order with fresh prices ([`CheckoutPhase::CreatingOrder`])
//! 4. Write back decremented stock for every line ([`CheckoutPhase::UpdatingStock`])
//! 5. Clear the cart ([`CheckoutPhase::Done`])
//!
//! Stock is never touched unless the order was created, and the cart is never
//! cleared unless every stock update succeeded. There is no rollback: a
//! failure in step 4 leaves the order in place and is reported with the
//! products that need manual correction.

mod error;
mod steps;

use std::fmt;

use food_cart_core::Price;
use tracing::{info, instrument};
use uuid::Uuid;

pub use error::{CheckoutError, StockShortfall};
pub use steps::{
    ValidatedLine, build_order, decrement_stock, merge_lines, normalize_contact, submit_order,
    validate_stock,
};

use crate::api::{Backend, ContactDetails, OrderRecord, OrderRequest};
use crate::cart::CartStore;
use crate::session::SessionUser;
use crate::store::KeyValueStore;

/// Observable progress of one checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutPhase {
    Idle,
    ValidatingStock,
    StockInsufficient,
    CreatingOrder,
    OrderCreateFailed,
    UpdatingStock,
    StockUpdateFailed,
    Done,
}

impl CheckoutPhase {
    /// Returns `true` once the attempt can make no further progress.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::StockInsufficient | Self::OrderCreateFailed | Self::StockUpdateFailed | Self::Done
        )
    }
}

impl fmt::Display for CheckoutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::ValidatingStock => "checking stock",
            Self::StockInsufficient => "insufficient stock",
            Self::CreatingOrder => "creating order",
            Self::OrderCreateFailed => "order failed",
            Self::UpdatingStock => "updating stock",
            Self::StockUpdateFailed => "stock update failed",
            Self::Done => "done",
        };
        f.write_str(label)
    }
}

/// Result of a successful checkout.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    /// The order as persisted by the backend.
    pub order: OrderRecord,
    /// The request that was submitted.
    pub request: OrderRequest,
}

/// Drives one checkout attempt against a [`Backend`] and a cart.
#[derive(Debug)]
pub struct Reconciler<'a, B, S> {
    backend: &'a B,
    cart: &'a CartStore<S>,
    shipping_cost: Price,
}

impl<'a, B: Backend, S: KeyValueStore> Reconciler<'a, B, S> {
    /// Create a reconciler charging `shipping_cost` per order.
    #[must_use]
    pub const fn new(backend: &'a B, cart: &'a CartStore<S>, shipping_cost: Price) -> Self {
        Self {
            backend,
            cart,
            shipping_cost,
        }
    }

    /// Check out the current cart for `user`.
    ///
    /// # Errors
    ///
    /// See [`CheckoutError`] for the failure modes.
    pub async fn run(
        &self,
        user: &SessionUser,
        contact: &ContactDetails,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        self.run_with(user, contact, |_| {}).await
    }

    /// Like [`run`](Self::run), reporting every phase entered to `on_phase`.
    ///
    /// Attempts rejected before any network call report nothing. Otherwise
    /// the last phase reported is terminal, unless the backend became
    /// unreachable mid-attempt (see [`CheckoutError::terminal_phase`]).
    ///
    /// # Errors
    ///
    /// See [`CheckoutError`] for the failure modes.
    #[instrument(
        skip_all,
        fields(attempt = %Uuid::new_v4(), user_id = %user.id)
    )]
    pub async fn run_with(
        &self,
        user: &SessionUser,
        contact: &ContactDetails,
        mut on_phase: impl FnMut(CheckoutPhase) + Send,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        let result = self.drive(user, contact, &mut on_phase).await;
        match &result {
            Ok(receipt) => {
                info!(order_id = %receipt.order.id, total = %receipt.request.total(), "Checkout complete");
                on_phase(CheckoutPhase::Done);
            }
            Err(e) => {
                info!(error = %e, "Checkout stopped");
                if let Some(phase) = e.terminal_phase() {
                    on_phase(phase);
                }
            }
        }
        result
    }

    async fn drive(
        &self,
        user: &SessionUser,
        contact: &ContactDetails,
        on_phase: &mut (impl FnMut(CheckoutPhase) + Send),
    ) -> Result<CheckoutReceipt, CheckoutError> {
        let lines = self.cart.get();
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let contact = normalize_contact(contact)?;

        on_phase(CheckoutPhase::ValidatingStock);
        let validated = validate_stock(self.backend, &lines).await?;

        on_phase(CheckoutPhase::CreatingOrder);
        let request = build_order(user, &contact, &validated, self.shipping_cost);
        let order = submit_order(self.backend, &request).await?;

        on_phase(CheckoutPhase::UpdatingStock);
        decrement_stock(self.backend, order.id, &validated).await?;

        self.cart
            .clear()
            .map_err(|source| CheckoutError::CartNotCleared {
                order_id: order.id,
                source,
            })?;

        Ok(CheckoutReceipt { order, request })
    }
}
