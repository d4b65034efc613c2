//! Session commands.

#![allow(clippy::print_stdout)]

use food_cart_core::{Email, Role};
use food_cart_storefront::api::{LoginRequest, NewUser};
use secrecy::SecretString;

use super::{CliError, Context};

/// Create a shopper account and log in as it.
pub async fn register(
    ctx: &Context,
    name: String,
    email: Email,
    password: String,
) -> Result<(), CliError> {
    let request = NewUser {
        name,
        email,
        password: SecretString::from(password),
        role: Role::Usuario,
    };
    let user = ctx.client.register(&request).await?;
    ctx.session.save(&user)?;

    tracing::info!(user_id = %user.id, "Registered");
    println!("Registered and logged in as {} <{}>", user.name, user.email);
    Ok(())
}

pub async fn login(ctx: &Context, email: Email, password: String) -> Result<(), CliError> {
    let request = LoginRequest {
        email,
        password: SecretString::from(password),
    };
    let user = ctx.client.login(&request).await?;
    ctx.session.save(&user)?;

    println!("Logged in as {} ({})", user.name, user.role);
    Ok(())
}

pub fn logout(ctx: &Context) -> Result<(), CliError> {
    ctx.session.logout()?;
    println!("Logged out");
    Ok(())
}

pub fn whoami(ctx: &Context) -> Result<(), CliError> {
    let user = ctx.session.require()?;
    println!("{} <{}> #{} ({})", user.name, user.email, user.id, user.role);
    Ok(())
}
