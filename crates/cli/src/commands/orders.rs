//! Order history commands.

#![allow(clippy::print_stdout)]

use food_cart_core::{OrderId, Role};
use food_cart_storefront::api::OrderRecord;
use food_cart_storefront::views::order_history;

use super::{CliError, Context};

pub async fn list(ctx: &Context) -> Result<(), CliError> {
    let user = ctx.session.require()?;
    let orders = order_history(&ctx.client, &user).await?;

    if orders.is_empty() {
        println!("You have no orders yet");
    }
    for order in &orders {
        print_summary(order);
    }
    Ok(())
}

pub async fn show(ctx: &Context, id: OrderId) -> Result<(), CliError> {
    let user = ctx.session.require()?;
    let order = match ctx.client.fetch_order(id).await {
        Ok(order) => order,
        Err(e) if e.is_not_found() => {
            return Err(CliError::NotFound {
                kind: "Order",
                id: id.as_i64(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    // Shoppers only see their own orders
    if order.user_id != user.id && user.require_role(Role::Admin).is_err() {
        return Err(CliError::NotFound {
            kind: "Order",
            id: id.as_i64(),
        });
    }

    print_detail(&order);
    Ok(())
}

/// One-line summary shared with the admin listing.
pub fn print_summary(order: &OrderRecord) {
    let placed = order
        .placed_at
        .map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string());
    println!(
        "#{:<5} {placed:<16} {:<10} {:>3} items {:>10}",
        order.id,
        order.status.label(),
        order.unit_count(),
        order.total
    );
}

pub fn print_detail(order: &OrderRecord) {
    print_summary(order);
    println!("  {}", order.status.description());
    for line in &order.lines {
        println!(
            "  {:>3} x {:<30} {:>10}",
            line.quantity,
            line.product_name,
            line.line_total()
        );
    }
    println!("  Subtotal: {}", order.subtotal());
    println!("  Total:    {}", order.total);
    println!("  Phone:    {}", order.phone);
    println!("  Address:  {}", order.address);
    println!("  Payment:  {}", order.payment_method);
    if let Some(notes) = &order.notes {
        println!("  Notes:    {notes}");
    }
}
