//! Vitrine CLI - the storefront in a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! vitrine products --category smartphones --max 500 --pages 2
//! vitrine product 12
//!
//! # Log in with a one-time code (in-process code service)
//! vitrine login emily.johnson@x.dummyjson.com
//!
//! # Or against a running storefront server
//! vitrine --server http://127.0.0.1:3000 login emily.johnson@x.dummyjson.com
//!
//! # Cart, favorites and checkout for the logged-in user
//! vitrine cart add 12
//! vitrine favorites toggle 7
//! vitrine checkout --full-name "Emily Johnson" --email emily@example.com ...
//! ```
//!
//! Session, cart and favorites live under `--data-dir`, one JSON file per
//! entry, so they persist between invocations.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use url::Url;
use vitrine_core::ProductId;
use vitrine_storefront::telemetry::{LogFormat, init_tracing};

mod commands;

use commands::{CliError, Context};

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(author, version, about = "Vitrine storefront client")]
struct Cli {
    /// Directory holding the session, carts and favorites
    #[arg(long, env = "VITRINE_DATA_DIR", default_value = ".vitrine", global = true)]
    data_dir: PathBuf,

    /// Remote product and user API
    #[arg(long, env = "VITRINE_CATALOG_URL", global = true)]
    catalog_url: Option<Url>,

    /// Storefront server for login codes; codes are issued in-process when unset
    #[arg(long, env = "VITRINE_SERVER_URL", global = true)]
    server: Option<Url>,

    /// Log output format (`pretty` or `json`)
    #[arg(long, env = "VITRINE_LOG_FORMAT", default_value = "pretty", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products, filtered and paged like the product grid
    Products {
        /// Category to show (`all` for every category)
        #[arg(short, long, default_value = "all")]
        category: String,

        /// Lowest price to show
        #[arg(long)]
        min: Option<Decimal>,

        /// Highest price to show
        #[arg(long)]
        max: Option<Decimal>,

        /// Number of pages to reveal
        #[arg(short, long, default_value_t = 1)]
        pages: usize,
    },
    /// List product categories
    Categories,
    /// Show one product
    Product {
        /// Product ID
        id: ProductId,
    },
    /// Log in with an emailed one-time code
    Login {
        /// Account email address
        email: String,
    },
    /// Log out
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesAction>,
    },
    /// Place a (simulated) order for the cart
    Checkout(commands::checkout::CheckoutArgs),
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and total
    Show,
    /// Add one unit of a product
    Add { id: ProductId },
    /// Remove one unit of a product, keeping at least one
    Decrease { id: ProductId },
    /// Remove a product line
    Remove { id: ProductId },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// Show favorite products
    Show,
    /// Add or remove a favorite
    Toggle { id: ProductId },
}

#[tokio::main]
async fn main() {
    // Load .env before clap reads env-backed arguments
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing("vitrine_cli=info,vitrine_storefront=warn", cli.log_format);

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = Context::open(cli.data_dir, cli.catalog_url, cli.server)?;

    match cli.command {
        Commands::Products {
            category,
            min,
            max,
            pages,
        } => commands::catalog::products(&ctx, &category, min, max, pages).await?,
        Commands::Categories => commands::catalog::categories(&ctx).await?,
        Commands::Product { id } => commands::catalog::product(&ctx, id).await?,
        Commands::Login { email } => commands::account::login(&ctx, &email).await?,
        Commands::Logout => commands::account::logout(&ctx)?,
        Commands::Whoami => commands::account::whoami(&ctx),
        Commands::Cart { action } => match action.unwrap_or(CartAction::Show) {
            CartAction::Show => commands::cart::show(&ctx),
            CartAction::Add { id } => commands::cart::add(&ctx, id).await?,
            CartAction::Decrease { id } => commands::cart::decrease(&ctx, id)?,
            CartAction::Remove { id } => commands::cart::remove(&ctx, id)?,
            CartAction::Clear => commands::cart::clear(&ctx)?,
        },
        Commands::Favorites { action } => match action.unwrap_or(FavoritesAction::Show) {
            FavoritesAction::Show => commands::cart::favorites(&ctx).await?,
            FavoritesAction::Toggle { id } => commands::cart::toggle_favorite(&ctx, id)?,
        },
        Commands::Checkout(args) => commands::checkout::checkout(&ctx, args).await?,
    }
    Ok(())
}
