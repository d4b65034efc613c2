//! Individual checkout steps.
//!
//! Each step is usable on its own; [`Reconciler`](super::Reconciler) chains
//! them and reports phase transitions.

use food_cart_core::{OrderId, Price, ProductId, Quantity};
use futures::future::join_all;
use tracing::{debug, error, warn};

use super::error::{CheckoutError, StockShortfall};
use crate::api::{
    ApiError, Backend, ContactDetails, OrderLineRequest, OrderRecord, OrderRequest,
    ProductSnapshot,
};
use crate::cart::CartLine;
use crate::session::SessionUser;

/// A cart line confirmed against a fresh product snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLine {
    pub product: ProductSnapshot,
    pub quantity: Quantity,
}

impl ValidatedLine {
    /// Stock left once this line is fulfilled.
    #[must_use]
    pub const fn remaining_stock(&self) -> u32 {
        self.product
            .available_stock
            .saturating_sub(self.quantity.get())
    }

    fn to_order_line(&self) -> OrderLineRequest {
        OrderLineRequest {
            product_id: self.product.id,
            product_name: self.product.name.clone(),
            product_image: self.product.image_url.clone(),
            quantity: self.quantity,
            unit_price: self.product.unit_price,
        }
    }
}

/// Trim the contact form and reject blank required fields.
///
/// Blank notes become `None`.
///
/// # Errors
///
/// Returns [`CheckoutError::InvalidForm`] naming the first blank field.
pub fn normalize_contact(contact: &ContactDetails) -> Result<ContactDetails, CheckoutError> {
    let required = |value: &str, field: &'static str| {
        let value = value.trim();
        if value.is_empty() {
            Err(CheckoutError::InvalidForm(field))
        } else {
            Ok(value.to_string())
        }
    };

    Ok(ContactDetails {
        phone: required(&contact.phone, "phone")?,
        address: required(&contact.address, "address")?,
        payment_method: required(&contact.payment_method, "payment method")?,
        notes: contact
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
            .map(ToString::to_string),
    })
}

/// Collapse repeated products into one line, summing quantities.
///
/// First-seen order is kept.
#[must_use]
pub fn merge_lines(lines: &[CartLine]) -> Vec<CartLine> {
    let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());
    for line in lines {
        match merged.iter_mut().find(|m| m.product_id == line.product_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => merged.push(*line),
        }
    }
    merged
}

/// Fetch every product in the cart concurrently and check requested
/// quantities against live stock.
///
/// All fetches complete before a verdict is reached, so a shortfall error
/// lists every offending line. A product that cannot be fetched (404, server
/// error, bad payload) counts as a shortfall with nothing available.
///
/// # Errors
///
/// - [`CheckoutError::StockInsufficient`] if any line cannot be fulfilled
/// - [`CheckoutError::Transport`] if the backend could not be reached
pub async fn validate_stock<B: Backend>(
    backend: &B,
    lines: &[CartLine],
) -> Result<Vec<ValidatedLine>, CheckoutError> {
    let lines = merge_lines(lines);
    let fetched = join_all(lines.iter().map(|line| backend.fetch_product(line.product_id))).await;

    let mut validated = Vec::with_capacity(lines.len());
    let mut shortfalls = Vec::new();

    for (line, result) in lines.iter().zip(fetched) {
        match result {
            Ok(product) if line.quantity.get() <= product.available_stock => {
                validated.push(ValidatedLine {
                    product,
                    quantity: line.quantity,
                });
            }
            Ok(product) => shortfalls.push(StockShortfall {
                product_id: line.product_id,
                name: Some(product.name),
                available: product.available_stock,
                requested: line.quantity,
            }),
            Err(cause) if cause.is_transport() => {
                return Err(CheckoutError::Transport { cause });
            }
            Err(cause) => {
                warn!(product_id = %line.product_id, error = %cause, "Product unavailable during stock check");
                shortfalls.push(StockShortfall {
                    product_id: line.product_id,
                    name: None,
                    available: 0,
                    requested: line.quantity,
                });
            }
        }
    }

    if shortfalls.is_empty() {
        debug!(lines = validated.len(), "Stock validated");
        Ok(validated)
    } else {
        Err(CheckoutError::StockInsufficient { lines: shortfalls })
    }
}

/// Build the order request from validated lines.
///
/// Unit prices come from the snapshots taken during validation, never from
/// anything cached earlier.
#[must_use]
pub fn build_order(
    user: &SessionUser,
    contact: &ContactDetails,
    lines: &[ValidatedLine],
    shipping_cost: Price,
) -> OrderRequest {
    OrderRequest::new(
        user.id,
        contact.clone(),
        lines.iter().map(ValidatedLine::to_order_line).collect(),
        shipping_cost,
    )
}

/// Persist the order.
///
/// # Errors
///
/// Returns [`CheckoutError::OrderCreateFailed`] on any backend failure.
pub async fn submit_order<B: Backend>(
    backend: &B,
    order: &OrderRequest,
) -> Result<OrderRecord, CheckoutError> {
    backend
        .create_order(order)
        .await
        .map_err(|cause| CheckoutError::OrderCreateFailed { cause })
}

/// Write back `available − requested` for every line, concurrently.
///
/// Every update is attempted even if some fail. Nothing is rolled back.
///
/// # Errors
///
/// Returns [`CheckoutError::StockUpdateFailed`] listing the products whose
/// stock could not be written, with the first failure as the cause.
pub async fn decrement_stock<B: Backend>(
    backend: &B,
    order_id: OrderId,
    lines: &[ValidatedLine],
) -> Result<(), CheckoutError> {
    let results = join_all(lines.iter().map(|line| {
        let body = line.product.with_stock(line.remaining_stock());
        async move {
            backend
                .update_product(line.product.id, &body)
                .await
                .map_err(|e| (line.product.id, e))
        }
    }))
    .await;

    let failures: Vec<(ProductId, ApiError)> = results.into_iter().filter_map(Result::err).collect();
    let failed_product_ids: Vec<ProductId> = failures.iter().map(|(id, _)| *id).collect();

    let Some((_, cause)) = failures.into_iter().next() else {
        return Ok(());
    };

    error!(
        %order_id,
        failed = ?failed_product_ids,
        error = %cause,
        "Order created but stock update failed; manual reconciliation required"
    );
    Err(CheckoutError::StockUpdateFailed {
        order_id,
        failed_product_ids,
        cause,
    })
}
