//! Food Cart CLI - shop and administer the food-ordering backend from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in (the session is kept in FOOD_CART_DATA_DIR)
//! fc-cli login -e ana@example.com -p secret
//!
//! # Browse and fill the cart
//! fc-cli catalog --category 2
//! fc-cli cart add 7
//! fc-cli cart set 7 3
//!
//! # Place the order
//! fc-cli checkout --phone 555-0101 --address "1 Main St" --payment cash
//!
//! # Admin: move an order along
//! fc-cli admin order-status 12 processing
//! ```
//!
//! # Commands
//!
//! - `register`, `login`, `logout`, `whoami` - Session management
//! - `catalog` - List products and categories
//! - `cart` - Show and edit the local cart
//! - `checkout` - Validate stock, place the order and update stock
//! - `orders` - The logged-in user's order history
//! - `admin` - Order, product and category management (ADMIN role)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use food_cart_core::{CategoryId, Email, OrderId, OrderStatus, Price, ProductId, Role};
use food_cart_storefront::api::ProductUpsert;
use food_cart_storefront::config::ClientConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{CliError, Context};

#[derive(Parser)]
#[command(name = "fc-cli")]
#[command(author, version, about = "Food Cart command-line storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and log in
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: Email,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Log in with an existing account
    Login {
        /// Email address
        #[arg(short, long)]
        email: Email,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Forget the current session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List products and categories
    Catalog {
        /// Only show products in this category
        #[arg(short, long)]
        category: Option<CategoryId>,
    },
    /// Show or edit the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Place an order for the current cart
    Checkout {
        /// Contact phone number
        #[arg(long)]
        phone: String,

        /// Delivery address
        #[arg(long)]
        address: String,

        /// Payment method (e.g. cash, card)
        #[arg(long)]
        payment: String,

        /// Notes for the kitchen or driver
        #[arg(long)]
        notes: Option<String>,
    },
    /// Your orders
    Orders {
        #[command(subcommand)]
        action: Option<OrdersAction>,
    },
    /// Store administration (requires ADMIN)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines with live prices and totals
    Show,
    /// Add one unit of a product
    Add { id: ProductId },
    /// Same as `add`, for a product already in the cart
    Inc { id: ProductId },
    /// Remove one unit of a product
    Dec { id: ProductId },
    /// Set the quantity of a product already in the cart (0 removes it)
    Set {
        id: ProductId,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product from the cart
    Remove { id: ProductId },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List your orders, newest first
    List,
    /// Show one order in detail
    Show { id: OrderId },
}

#[derive(Subcommand)]
enum AdminAction {
    /// List every order
    Orders {
        /// Only orders with this status
        #[arg(short, long)]
        status: Option<OrderStatus>,
    },
    /// Change an order's status
    OrderStatus { id: OrderId, status: OrderStatus },
    /// Manage products
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Create a product
    Create {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        price: Price,
        #[arg(short, long)]
        stock: u32,
        #[arg(short, long)]
        category: Option<CategoryId>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        image_url: Option<String>,
    },
    /// Update fields of a product; omitted fields keep their value
    Update {
        id: ProductId,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        price: Option<Price>,
        #[arg(short, long)]
        stock: Option<u32>,
        #[arg(short, long)]
        category: Option<CategoryId>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        image_url: Option<String>,
    },
    /// Delete a product
    Delete { id: ProductId },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// Create a category
    Create {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Replace a category's name and description
    Update {
        id: CategoryId,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a category
    Delete { id: CategoryId },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Sentry must be initialized before the tracing subscriber
    let config = ClientConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "food_cart_storefront=info,food_cart_cli=info".into());

    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), CliError> {
    let ctx = Context::new(config)?;

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
        } => commands::auth::register(&ctx, name, email, password).await?,
        Commands::Login { email, password } => commands::auth::login(&ctx, email, password).await?,
        Commands::Logout => commands::auth::logout(&ctx)?,
        Commands::Whoami => commands::auth::whoami(&ctx)?,
        Commands::Catalog { category } => commands::catalog::list(&ctx, category).await,
        Commands::Cart { action } => match action.unwrap_or(CartAction::Show) {
            CartAction::Show => commands::cart::show(&ctx).await,
            CartAction::Add { id } | CartAction::Inc { id } => {
                commands::cart::add(&ctx, id).await?;
            }
            CartAction::Dec { id } => commands::cart::decrement(&ctx, id)?,
            CartAction::Set { id, quantity } => commands::cart::set(&ctx, id, quantity).await?,
            CartAction::Remove { id } => commands::cart::remove(&ctx, id)?,
            CartAction::Clear => commands::cart::clear(&ctx)?,
        },
        Commands::Checkout {
            phone,
            address,
            payment,
            notes,
        } => commands::checkout::run(&ctx, phone, address, payment, notes).await?,
        Commands::Orders { action } => match action.unwrap_or(OrdersAction::List) {
            OrdersAction::List => commands::orders::list(&ctx).await?,
            OrdersAction::Show { id } => commands::orders::show(&ctx, id).await?,
        },
        Commands::Admin { action } => {
            let user = ctx.session.require()?;
            user.require_role(Role::Admin)?;
            match action {
                AdminAction::Orders { status } => commands::admin::orders(&ctx, status).await?,
                AdminAction::OrderStatus { id, status } => {
                    commands::admin::set_order_status(&ctx, id, status).await?;
                }
                AdminAction::Product { action } => match action {
                    ProductAction::Create {
                        name,
                        price,
                        stock,
                        category,
                        description,
                        image_url,
                    } => {
                        let product = ProductUpsert {
                            name,
                            description,
                            price,
                            stock,
                            category_id: category,
                            image_url,
                        };
                        commands::admin::create_product(&ctx, product).await?;
                    }
                    ProductAction::Update {
                        id,
                        name,
                        price,
                        stock,
                        category,
                        description,
                        image_url,
                    } => {
                        let changes = commands::admin::ProductChanges {
                            name,
                            price,
                            stock,
                            category,
                            description,
                            image_url,
                        };
                        commands::admin::update_product(&ctx, id, changes).await?;
                    }
                    ProductAction::Delete { id } => commands::admin::delete_product(&ctx, id).await?,
                },
                AdminAction::Category { action } => match action {
                    CategoryAction::Create { name, description } => {
                        commands::admin::create_category(&ctx, name, description).await?;
                    }
                    CategoryAction::Update {
                        id,
                        name,
                        description,
                    } => commands::admin::update_category(&ctx, id, name, description).await?,
                    CategoryAction::Delete { id } => {
                        commands::admin::delete_category(&ctx, id).await?;
                    }
                },
            }
        }
    }
    Ok(())
}
