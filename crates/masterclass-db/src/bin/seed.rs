//! # Seed Data Loader
//!
//! Applies migrations to a database file and inserts the default
//! masterclasses and admin account if they are missing.
//!
//! ## Usage
//! ```bash
//! # Seed ./masterclass.db with the default admin
//! cargo run -p masterclass-db --bin seed
//!
//! # Specify database path and admin credentials
//! cargo run -p masterclass-db --bin seed -- --db ./data/shop.db \
//!     --admin-email boss@coders.ninja --admin-password s3cret
//! ```
//!
//! Running it again is harmless: tables that already have rows are left
//! alone.

use clap::Parser;
use masterclass_db::seed::{DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD};
use masterclass_db::{ensure_seed_data, Database, DbConfig, SeedOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "seed", about = "Seed a masterclass shop database")]
struct Args {
    /// Database file path
    #[arg(short, long, default_value = "./masterclass.db")]
    db: String,

    /// Email for the admin account created on an empty users table
    #[arg(long, default_value = DEFAULT_ADMIN_EMAIL)]
    admin_email: String,

    /// Password for that admin account
    #[arg(long, default_value = DEFAULT_ADMIN_PASSWORD)]
    admin_password: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let args = Args::parse();

    println!("🌱 Masterclass Seed Data Loader");
    println!("==============================");
    println!("Database: {}", args.db);
    println!();

    let db = Database::new(DbConfig::new(&args.db)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let options = SeedOptions {
        admin_email: args.admin_email,
        admin_password: args.admin_password,
    };
    let report = ensure_seed_data(&db, &options).await?;

    if report.is_noop() {
        println!("⚠ Products and users already present, nothing to do");
    } else {
        println!("✓ Products inserted: {}", report.products_inserted);
        if report.admin_created {
            println!("✓ Admin created: {}", options.admin_email);
        }
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&report)?);

    db.close().await;
    Ok(())
}
