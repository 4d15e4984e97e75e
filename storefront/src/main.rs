//! Storefront command-line client.
//!
//! Each invocation restores the session from the state file, runs one
//! command against the backend and exits. Configuration comes from the
//! environment (or a `.env` file) and can be overridden with flags.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use storefront::cart::{CartState, DEFAULT_QUANTITY};
use storefront::session::Registration;
use storefront::{App, Config, StorefrontError};
use storefront_api::{FileStorage, Product, ProductFilter};
use storefront_core::environment::Navigator;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "storefront", version, about = "Browse the catalog and manage your cart")]
struct Cli {
    /// Backend base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// File holding the stored session
    #[arg(long, global = true)]
    state_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in
    Login {
        /// Account email
        email: String,
        /// Account password
        #[arg(long, env = "STOREFRONT_PASSWORD")]
        password: String,
    },
    /// Create an account and sign in
    Register {
        /// Display name
        name: String,
        /// Account email
        email: String,
        /// Password
        #[arg(long, env = "STOREFRONT_PASSWORD")]
        password: String,
        /// Password again; defaults to `--password`
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,
    /// List products
    Products {
        /// Case-insensitive name search
        #[arg(long, default_value = "")]
        search: String,
        /// Category name
        #[arg(long, default_value = "")]
        category: String,
        /// Lowest price
        #[arg(long, default_value = "")]
        min_price: String,
        /// Highest price
        #[arg(long, default_value = "")]
        max_price: String,
    },
    /// Show one product
    Product {
        /// Product ID
        id: i64,
    },
    /// List categories
    Categories,
    /// Show the cart
    Cart,
    /// Add a product to the cart
    Add {
        /// Product ID
        item_id: i64,
        /// Units to add
        #[arg(long, short)]
        quantity: Option<u32>,
    },
    /// Change the quantity of a cart line
    Update {
        /// Cart line ID
        cart_id: i64,
        /// New quantity
        quantity: u32,
    },
    /// Remove a cart line
    Remove {
        /// Cart line ID
        cart_id: i64,
    },
    /// Empty the cart
    Clear,
}

/// Redirects to login by telling the user to sign in again
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn redirect_to_login(&self) {
        eprintln!("Session expired. Sign in again with `storefront login <email>`.");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront=info,storefront_runtime=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env().context("loading configuration")?;
    if let Some(api_url) = cli.api_url {
        config = config.with_api_url(api_url);
    }
    if let Some(state_path) = cli.state_path {
        config = config.with_state_path(state_path);
    }
    tracing::debug!(api_url = %config.api_url, state_path = %config.state_path.display(), "Configuration loaded");

    let storage = Arc::new(FileStorage::open(&config.state_path));
    let app = App::new(config, storage, Arc::new(ConsoleNavigator));

    let outcome = run(&app, cli.command).await;
    app.shutdown().await.context("shutting down")?;

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(error) => {
            eprintln!("{error}");
            Ok(ExitCode::FAILURE)
        },
    }
}

async fn run(app: &App, command: Command) -> storefront::Result<()> {
    match command {
        Command::Login { email, password } => {
            app.login(&email, &password).await?;
            print_whoami(app).await;
        },
        Command::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            let confirm_password = confirm_password.unwrap_or_else(|| password.clone());
            app.register(Registration {
                name,
                email,
                password,
                confirm_password,
            })
            .await?;
            print_whoami(app).await;
        },
        Command::Logout => {
            app.logout().await?;
            println!("Signed out");
        },
        Command::Whoami => print_whoami(app).await,
        Command::Products {
            search,
            category,
            min_price,
            max_price,
        } => {
            let filter = ProductFilter::default()
                .with_search(search)
                .with_category(category)
                .with_price_range(min_price, max_price);
            let products = app.products(filter).await?;
            if products.is_empty() {
                println!("No products found");
            }
            for product in products {
                println!(
                    "{:>5}  {:<32} {:>10}  {:>4} in stock  {}",
                    product.id,
                    product.name,
                    product.price,
                    product.stock,
                    product.category_name.as_deref().unwrap_or("-"),
                );
            }
        },
        Command::Product { id } => {
            let product = app.product(id).await?;
            println!("{} (#{})", product.name, product.id);
            println!("  price: {}", product.price);
            println!(
                "  stock: {}",
                if product.in_stock() {
                    product.stock.to_string()
                } else {
                    "out of stock".to_string()
                }
            );
            if let Some(category) = &product.category_name {
                println!("  category: {category}");
            }
            if let Some(description) = &product.description {
                println!("  {description}");
            }
        },
        Command::Categories => {
            for category in app.categories().await? {
                println!("{:>5}  {}", category.id, category.name);
            }
        },
        Command::Cart => {
            app.fetch_cart().await?;
            print_cart(app).await;
        },
        Command::Add { item_id, quantity } => {
            let product = app.product(item_id).await?;
            check_add(&product, quantity.unwrap_or(DEFAULT_QUANTITY))?;
            app.add_item(item_id, quantity).await?;
            print_cart(app).await;
        },
        Command::Update { cart_id, quantity } => {
            app.fetch_cart().await?;
            check_update(&app.cart().await, cart_id, quantity)?;
            app.update_line(cart_id, quantity).await?;
            print_cart(app).await;
        },
        Command::Remove { cart_id } => {
            app.remove_line(cart_id).await?;
            print_cart(app).await;
        },
        Command::Clear => {
            app.clear_cart().await?;
            print_cart(app).await;
        },
    }
    Ok(())
}

fn quantity_out_of_range(stock: u32) -> StorefrontError {
    StorefrontError::Validation(format!("Quantity must be between 1 and {stock}"))
}

/// Reject an add the product cannot satisfy
fn check_add(product: &Product, quantity: u32) -> storefront::Result<()> {
    if !product.in_stock() {
        return Err(StorefrontError::Validation("Out of stock".to_string()));
    }
    if quantity == 0 || quantity > product.stock {
        return Err(quantity_out_of_range(product.stock));
    }
    Ok(())
}

/// Reject a quantity the line cannot take
fn check_update(cart: &CartState, cart_id: i64, quantity: u32) -> storefront::Result<()> {
    let line = cart
        .line(cart_id)
        .ok_or_else(|| StorefrontError::Validation("Cart item not found".to_string()))?;
    if line.accepts_quantity(quantity) {
        Ok(())
    } else {
        Err(quantity_out_of_range(line.stock))
    }
}

async fn print_whoami(app: &App) {
    let session = app.session().await;
    match session.user {
        Some(user) if session.is_authenticated => match user.email {
            Some(email) => println!("Signed in as {} <{email}>", user.name),
            None => println!("Signed in as {}", user.name),
        },
        _ => println!("Not signed in"),
    }
}

async fn print_cart(app: &App) {
    let cart = app.cart().await;
    if !cart.authenticated {
        println!("Sign in to see your cart");
        return;
    }
    if cart.is_empty() {
        println!("Your cart is empty");
        return;
    }
    for line in &cart.items {
        println!(
            "{:>5}  {:<32} {:>3} x {:>10} = {:>10}",
            line.cart_id, line.name, line.quantity, line.price, line.total_price
        );
    }
    println!("{} items, total {}", cart.total_items, cart.total_amount);
}
