//! Store administration commands.
//!
//! The caller has already checked that the session user is an admin.

#![allow(clippy::print_stdout)]

use food_cart_core::{CategoryId, OrderId, OrderStatus, Price, ProductId};
use food_cart_storefront::api::{Backend, CategoryUpsert, ProductUpsert};
use food_cart_storefront::views::{filter_by_status, newest_first};

use super::orders::{print_detail, print_summary};
use super::{CliError, Context};

/// Optional product field overrides for `admin product update`.
#[derive(Debug, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<Price>,
    pub stock: Option<u32>,
    pub category: Option<CategoryId>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// List every order, newest first, optionally only one status.
pub async fn orders(ctx: &Context, status: Option<OrderStatus>) -> Result<(), CliError> {
    let mut orders = ctx.client.list_orders().await?;
    newest_first(&mut orders);
    let orders = filter_by_status(orders, status);

    if orders.is_empty() {
        println!("No orders");
    }
    for order in &orders {
        print_summary(order);
    }
    Ok(())
}

pub async fn set_order_status(
    ctx: &Context,
    id: OrderId,
    status: OrderStatus,
) -> Result<(), CliError> {
    match ctx.client.update_order_status(id, status).await {
        Ok(Some(order)) => print_detail(&order),
        Ok(None) => println!("Order #{id} is now {}", status.label()),
        Err(e) if e.is_not_found() => {
            return Err(CliError::NotFound {
                kind: "Order",
                id: id.as_i64(),
            });
        }
        Err(e) => return Err(e.into()),
    }
    tracing::info!(order_id = %id, %status, "Order status updated");
    Ok(())
}

pub async fn create_product(ctx: &Context, product: ProductUpsert) -> Result<(), CliError> {
    let created = ctx.client.create_product(&product).await?;
    println!("Created product #{} {}", created.id, created.name);
    Ok(())
}

/// Fetch the product, apply `changes` and write the full body back.
pub async fn update_product(
    ctx: &Context,
    id: ProductId,
    changes: ProductChanges,
) -> Result<(), CliError> {
    let current = match ctx.client.fetch_product(id).await {
        Ok(product) => product,
        Err(e) if e.is_not_found() => {
            return Err(CliError::NotFound {
                kind: "Product",
                id: id.as_i64(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let mut body = current.with_stock(changes.stock.unwrap_or(current.available_stock));
    if let Some(name) = changes.name {
        body.name = name;
    }
    if let Some(price) = changes.price {
        body.price = price;
    }
    if changes.category.is_some() {
        body.category_id = changes.category;
    }
    if changes.description.is_some() {
        body.description = changes.description;
    }
    if changes.image_url.is_some() {
        body.image_url = changes.image_url;
    }

    ctx.client.update_product(id, &body).await?;
    println!("Updated product #{id} {}", body.name);
    Ok(())
}

pub async fn delete_product(ctx: &Context, id: ProductId) -> Result<(), CliError> {
    ctx.client.delete_product(id).await?;
    println!("Deleted product #{id}");
    Ok(())
}

pub async fn create_category(
    ctx: &Context,
    name: String,
    description: Option<String>,
) -> Result<(), CliError> {
    let created = ctx
        .client
        .create_category(&CategoryUpsert { name, description })
        .await?;
    println!("Created category #{} {}", created.id, created.name);
    Ok(())
}

pub async fn update_category(
    ctx: &Context,
    id: CategoryId,
    name: String,
    description: Option<String>,
) -> Result<(), CliError> {
    let updated = ctx
        .client
        .update_category(id, &CategoryUpsert { name, description })
        .await?;
    match updated {
        Some(category) => println!("Updated category #{} {}", category.id, category.name),
        None => println!("Updated category #{id}"),
    }
    Ok(())
}

pub async fn delete_category(ctx: &Context, id: CategoryId) -> Result<(), CliError> {
    ctx.client.delete_category(id).await?;
    println!("Deleted category #{id}");
    Ok(())
}
