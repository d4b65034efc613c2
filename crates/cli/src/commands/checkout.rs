//! Checkout command.

#![allow(clippy::print_stdout)]

use food_cart_storefront::api::ContactDetails;
use food_cart_storefront::checkout::{CheckoutError, Reconciler};

use super::{CliError, Context};

/// Check out the cart for the logged-in user, reporting progress.
pub async fn run(
    ctx: &Context,
    phone: String,
    address: String,
    payment_method: String,
    notes: Option<String>,
) -> Result<(), CliError> {
    let user = ctx.session.require()?;
    let contact = ContactDetails {
        phone,
        address,
        payment_method,
        notes,
    };

    let reconciler = Reconciler::new(&ctx.client, &ctx.cart, ctx.config.shipping_cost);
    let result = reconciler
        .run_with(&user, &contact, |phase| {
            if !phase.is_terminal() {
                println!("{}...", capitalize(&phase.to_string()));
            }
        })
        .await;

    match result {
        Ok(receipt) => {
            println!(
                "Order #{} placed: {} items, total {} ({})",
                receipt.order.id,
                receipt.request.lines().len(),
                receipt.request.total(),
                receipt.order.status.label()
            );
            Ok(())
        }
        Err(CheckoutError::StockInsufficient { lines }) => {
            println!("Not enough stock, adjust your cart and try again:");
            for line in &lines {
                println!("  {line}");
            }
            Err(CheckoutError::StockInsufficient { lines }.into())
        }
        Err(e) => {
            if e.order_created() {
                println!("Your order was placed, but needs attention from the store.");
            } else if e.is_retryable() {
                println!("No order was placed and your cart is unchanged; you can try again.");
            }
            Err(e.into())
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use food_cart_storefront::checkout::CheckoutPhase;

    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("checking stock"), "Checking stock");
        assert_eq!(capitalize(""), "");
        assert_eq!(CheckoutPhase::UpdatingStock.to_string(), "updating stock");
    }
}
