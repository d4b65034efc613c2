use food_cart_core::OrderStatus;
use tracing::instrument;

use crate::api::{ApiClient, ApiError, OrderRecord};
use crate::session::SessionUser;

/// Orders placed by `user`, newest first.
///
/// # Errors
///
/// Returns error if the orders cannot be fetched.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn order_history(
    client: &ApiClient,
    user: &SessionUser,
) -> Result<Vec<OrderRecord>, ApiError> {
    let mut orders = client.orders_for_user(user.id).await?;
    newest_first(&mut orders);
    Ok(orders)
}

/// Keep only orders with `status`; `None` keeps everything.
#[must_use]
pub fn filter_by_status(orders: Vec<OrderRecord>, status: Option<OrderStatus>) -> Vec<OrderRecord> {
    match status {
        Some(status) => orders
            .into_iter()
            .filter(|order| order.status == status)
            .collect(),
        None => orders,
    }
}

/// Sort orders by placement date, newest first. Undated orders sort last.
pub fn newest_first(orders: &mut [OrderRecord]) {
    orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at).then(b.id.cmp(&a.id)));
}
