//! # shop-cli
//!
//! Operator command line for the masterclass shop.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          shop-cli                                       │
//! │                                                                         │
//! │  clap args ──► ShopConfig::load ──► init_tracing                        │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │               Database::new ──► ensure_seed_data (if seed_on_start)     │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │   products ─► ProductRepository     cart / checkout ─► CartEngine       │
//! │   order ────► OrderRepository       login ──────────► auth::check_login │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │                JSON on stdout                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Examples
//! ```bash
//! shop-cli products list
//! shop-cli cart create
//! shop-cli cart add <cart-id> <product-id>
//! shop-cli checkout <cart-id> ninja@coders.ninja
//! ```

mod settings;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::settings::ShopConfig;
use masterclass_core::{CartEngine, Product};
use masterclass_db::{
    check_login, ensure_seed_data, CartRepository, Database, DbConfig, OrderRepository,
    ProductRepository, SeedOptions,
};

type ShopEngine = CartEngine<ProductRepository, CartRepository, OrderRepository>;

// =============================================================================
// Arguments
// =============================================================================

#[derive(Parser, Debug)]
#[command(name = "shop-cli", version, about = "Masterclass shop operator CLI")]
struct Cli {
    /// Config file (default: ./masterclass.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the database path from the config
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert default products and the admin account if missing
    Seed,

    /// Catalog management
    #[command(subcommand)]
    Products(ProductCommand),

    /// Cart operations
    #[command(subcommand)]
    Cart(CartCommand),

    /// Place an order for a cart
    Checkout { cart_id: String, email: String },

    /// Order lookup
    #[command(subcommand)]
    Order(OrderCommand),

    /// Check a user's credentials
    Login { email: String, password: String },
}

#[derive(Subcommand, Debug)]
enum ProductCommand {
    /// List all products by name
    List,
    /// Show one product
    Show { id: String },
    /// Create or update a product
    Upsert(UpsertArgs),
    /// Delete a product (carts and orders keep their snapshots)
    Delete { id: String },
}

#[derive(Args, Debug)]
struct UpsertArgs {
    /// Existing product id; a new one is generated when omitted
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    sku: String,
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    price: Decimal,
    #[arg(long, default_value = "")]
    image: String,
    #[arg(long)]
    requires_deposit: bool,
}

#[derive(Subcommand, Debug)]
enum CartCommand {
    /// Create an empty cart and print its id
    Create,
    /// Show a cart
    Show { cart_id: String },
    /// Add one unit of a product
    Add { cart_id: String, product_id: String },
    /// Set a line's quantity (0 or less removes it)
    Qty {
        cart_id: String,
        product_id: String,
        #[arg(allow_negative_numbers = true)]
        qty: i64,
    },
    /// Remove a product's line
    Remove { cart_id: String, product_id: String },
    /// Remove every line
    Clear { cart_id: String },
    /// Show cart warnings
    Warnings { cart_id: String },
}

#[derive(Subcommand, Debug)]
enum OrderCommand {
    /// Show an order and its cart snapshot
    Show { id: String },
}

// =============================================================================
// Output
// =============================================================================

/// Product plus its formatted price.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductView<'a> {
    #[serde(flatten)]
    product: &'a Product,
    display_price: String,
}

fn product_view<'a>(product: &'a Product, symbol: &str) -> ProductView<'a> {
    ProductView {
        product,
        display_price: product.display_price(symbol),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// =============================================================================
// Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing();

    let mut config = ShopConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(db) = cli.db.clone() {
        config.database_path = db;
    }
    debug!(
        database_path = %config.database_path,
        seed_on_start = config.seed_on_start,
        "Configuration loaded"
    );

    let db = Database::new(
        DbConfig::new(&config.database_path).max_connections(config.max_connections),
    )
    .await
    .context("opening database")?;

    let seed_options = SeedOptions {
        admin_email: config.admin_email.clone(),
        admin_password: config.admin_password.clone(),
    };
    if config.seed_on_start && !matches!(cli.command, Command::Seed) {
        let report = ensure_seed_data(&db, &seed_options).await?;
        if !report.is_noop() {
            info!(?report, "Seeded database");
        }
    }

    let result = run(cli.command, &db, &config, &seed_options).await;
    db.close().await;
    result
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=masterclass_db=trace` - Trace the database layer only
/// - Default: info, debug for the shop crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,masterclass_core=debug,masterclass_db=debug,sqlx=warn")
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(
    command: Command,
    db: &Database,
    config: &ShopConfig,
    seed_options: &SeedOptions,
) -> anyhow::Result<()> {
    let engine: ShopEngine = CartEngine::new(db.products(), db.carts(), db.orders());
    let symbol = config.currency_symbol.as_str();

    match command {
        Command::Seed => print_json(&ensure_seed_data(db, seed_options).await?),

        Command::Products(cmd) => run_products(cmd, db, &engine, symbol).await,

        Command::Cart(cmd) => run_cart(cmd, &engine).await,

        Command::Checkout { cart_id, email } => {
            let order = engine.checkout(&cart_id, &email).await?;
            print_json(&order)
        }

        Command::Order(OrderCommand::Show { id }) => match db.orders().get_by_id(&id).await? {
            Some(order) => print_json(&order),
            None => bail!("Order not found: {}", id),
        },

        Command::Login { email, password } => {
            print_json(&check_login(db, &email, &password).await?)
        }
    }
}

async fn run_products(
    cmd: ProductCommand,
    db: &Database,
    engine: &ShopEngine,
    symbol: &str,
) -> anyhow::Result<()> {
    match cmd {
        ProductCommand::List => {
            let products = engine.list_products().await?;
            let views: Vec<_> = products.iter().map(|p| product_view(p, symbol)).collect();
            print_json(&views)
        }

        ProductCommand::Show { id } => {
            let product = engine.get_product(&id).await?;
            print_json(&product_view(&product, symbol))
        }

        ProductCommand::Upsert(args) => {
            let existing = match &args.id {
                Some(id) => db.products().get_by_id(id).await?,
                None => None,
            };

            let mut product = existing.unwrap_or_else(|| {
                Product::new("", "", "", Decimal::ZERO, "", false)
            });
            if let Some(id) = args.id {
                product.id = id;
            }
            product.sku = args.sku;
            product.name = args.name;
            product.description = args.description;
            product.price = args.price;
            product.featured_image = args.image;
            product.requires_deposit = args.requires_deposit;

            let stored = db.products().upsert(&product).await?;
            print_json(&product_view(&stored, symbol))
        }

        ProductCommand::Delete { id } => {
            db.products().delete(&id).await?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
    }
}

async fn run_cart(cmd: CartCommand, engine: &ShopEngine) -> anyhow::Result<()> {
    match cmd {
        CartCommand::Create => {
            let id = engine.create().await?;
            print_json(&serde_json::json!({ "cartId": id }))
        }
        CartCommand::Show { cart_id } => print_json(&engine.get_cart(&cart_id).await?),
        CartCommand::Add {
            cart_id,
            product_id,
        } => print_json(&engine.add_item(&cart_id, &product_id).await?),
        CartCommand::Qty {
            cart_id,
            product_id,
            qty,
        } => print_json(&engine.change_qty(&cart_id, &product_id, qty).await?),
        CartCommand::Remove {
            cart_id,
            product_id,
        } => print_json(&engine.remove_item(&cart_id, &product_id).await?),
        CartCommand::Clear { cart_id } => print_json(&engine.clear(&cart_id).await?),
        CartCommand::Warnings { cart_id } => print_json(&engine.get_warnings(&cart_id).await?),
    }
}
