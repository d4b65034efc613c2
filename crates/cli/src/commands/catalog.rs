//! Catalog listing.

#![allow(clippy::print_stdout)]

use food_cart_core::CategoryId;
use food_cart_storefront::views::load_catalog;

use super::Context;

/// Print products, optionally only those in `category`, then the category list.
pub async fn list(ctx: &Context, category: Option<CategoryId>) {
    let catalog = load_catalog(&ctx.client, category).await;

    if catalog.products.is_empty() {
        println!("No products available");
    }
    for product in &catalog.products {
        let category = product
            .category_id
            .and_then(|id| catalog.category_name(id))
            .unwrap_or("-");
        let stock = if product.available_stock == 0 {
            "out of stock".to_string()
        } else {
            format!("{} in stock", product.available_stock)
        };
        println!(
            "#{:<4} {:<30} {:>10}  {:<16} {stock}",
            product.id, product.name, product.unit_price, category
        );
    }

    if !catalog.categories.is_empty() {
        println!();
        println!("Categories:");
        for category in &catalog.categories {
            println!("  #{:<4} {}", category.id, category.name);
        }
    }
}
