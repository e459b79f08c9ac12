//! Open Fashion CLI - Browse the catalog and manage a persisted cart.
//!
//! # Usage
//!
//! ```bash
//! # List the first two pages of products matching "shirt"
//! ofs products --pages 2 --query shirt
//!
//! # Show one product
//! ofs product 5
//!
//! # Manage the cart
//! ofs cart add 5
//! ofs cart set 5 3
//! ofs cart remove 5
//! ofs cart show
//!
//! # Estimated total
//! ofs checkout
//! ```
//!
//! Configuration is read from the environment (see
//! `open_fashion_storefront::config`). The cart survives between runs in
//! `CART_DATA_DIR`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use open_fashion_core::ProductId;
use open_fashion_storefront::config::StorefrontConfig;
use open_fashion_storefront::error::AppError;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::Session;

#[derive(Parser)]
#[command(name = "ofs")]
#[command(author, version, about = "Open Fashion storefront in your terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products
    Products {
        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,

        /// Only show products whose title or category contains this text
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Show a single product
    Product {
        /// Catalog product ID
        id: ProductId,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Show the cart with its estimated total
    Checkout,
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart contents
    Show,
    /// Add one unit of a product
    Add {
        /// Catalog product ID
        id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Catalog product ID
        id: ProductId,
    },
    /// Set the quantity of a product already in the cart
    Set {
        /// Catalog product ID
        id: ProductId,

        /// New quantity (minimum 1)
        quantity: u32,
    },
    /// Empty the cart
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

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
    let config = StorefrontConfig::from_env();
    let sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Logs go to stderr so command output stays pipeable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "open_fashion_cli=info,open_fashion_storefront=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, &config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "{}", e.user_message());
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), AppError> {
    let session = Session::open(config).await?;

    match cli.command {
        Commands::Products { pages, query } => {
            commands::catalog::list(&session, pages, query.as_deref()).await?;
        }
        Commands::Product { id } => commands::catalog::show(&session, id).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&session),
            CartAction::Add { id } => commands::cart::add(&session, id).await?,
            CartAction::Remove { id } => commands::cart::remove(&session, id).await,
            CartAction::Set { id, quantity } => {
                commands::cart::set_quantity(&session, id, quantity).await;
            }
            CartAction::Clear => commands::cart::clear(&session).await,
        },
        Commands::Checkout => commands::cart::checkout(&session),
    }
    Ok(())
}
