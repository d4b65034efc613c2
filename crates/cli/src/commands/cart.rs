//! Cart commands.

#![allow(clippy::print_stdout)]

use food_cart_core::ProductId;
use food_cart_storefront::api::Backend;
use food_cart_storefront::views::{AddToCartError, CartView, add_with_stock_check};

use super::{CliError, Context};

pub async fn show(ctx: &Context) {
    let view = CartView::load(&ctx.cart, &ctx.client, ctx.config.shipping_cost).await;

    if view.is_empty() {
        println!("Your cart is empty");
    }
    for line in &view.lines {
        let limit = if line.can_increment() { "" } else { "  (max)" };
        println!(
            "#{:<4} {:<30} {:>3} x {:>10} = {:>10}{limit}",
            line.product_id,
            line.name,
            line.quantity,
            line.unit_price,
            line.line_total()
        );
    }
    for id in &view.skipped {
        println!("#{id:<4} (unavailable)");
    }
    if !view.is_empty() {
        println!("{:>61}", format!("Subtotal: {}", view.subtotal()));
        println!("{:>61}", format!("Shipping: {}", view.shipping()));
        println!("{:>61}", format!("Total: {}", view.total()));
    }
}

/// Add one unit, refusing when the cart already holds all live stock.
pub async fn add(ctx: &Context, id: ProductId) -> Result<(), CliError> {
    let quantity = add_with_stock_check(&ctx.cart, &ctx.client, id).await?;
    println!("Product #{id}: {quantity} in cart ({} items total)", ctx.cart.count());
    Ok(())
}

pub fn decrement(ctx: &Context, id: ProductId) -> Result<(), CliError> {
    let Some(quantity) = ctx.cart.quantity_of(id) else {
        println!("Product #{id} is not in your cart");
        return Ok(());
    };
    ctx.cart.set_quantity(id, i64::from(quantity.get()) - 1)?;
    match ctx.cart.quantity_of(id) {
        Some(left) => println!("Product #{id}: {left} in cart"),
        None => println!("Removed product #{id} from cart"),
    }
    Ok(())
}

/// Overwrite a line's quantity, capped by live stock.
pub async fn set(ctx: &Context, id: ProductId, quantity: i64) -> Result<(), CliError> {
    if ctx.cart.quantity_of(id).is_none() {
        println!("Product #{id} is not in your cart");
        return Ok(());
    }

    if quantity > 0 {
        let product = ctx.client.fetch_product(id).await?;
        if quantity > i64::from(product.available_stock) {
            return Err(AddToCartError::OutOfStock {
                name: product.name,
                available: product.available_stock,
            }
            .into());
        }
    }

    ctx.cart.set_quantity(id, quantity)?;
    match ctx.cart.quantity_of(id) {
        Some(now) => println!("Product #{id}: {now} in cart"),
        None => println!("Removed product #{id} from cart"),
    }
    Ok(())
}

pub fn remove(ctx: &Context, id: ProductId) -> Result<(), CliError> {
    ctx.cart.remove(id)?;
    println!("Removed product #{id} from cart");
    Ok(())
}

pub fn clear(ctx: &Context) -> Result<(), CliError> {
    ctx.cart.clear()?;
    println!("Cart cleared");
    Ok(())
}
