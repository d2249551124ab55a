//! # Seed Data
//!
//! Populates an empty database with the default masterclasses and an admin
//! account.
//!
//! ```text
//! ensure_seed_data(db, options)
//!      │
//!      ├── default SKU missing?  ──► insert it (one transaction for all 4)
//!      │
//!      └── users table empty?    ──► insert the admin (argon2-hashed)
//! ```
//!
//! Products are matched by SKU, so a run that stopped part way is completed
//! by the next one and a second full run inserts nothing. A default product
//! deleted from the catalog comes back on the next seeding run.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::auth::new_user;
use crate::error::DbResult;
use crate::pool::Database;
use masterclass_core::Product;

/// Default admin email.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@coders.ninja";

/// Default admin password. Override it in any shared deployment.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Who to create as the first admin.
#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub admin_email: String,
    pub admin_password: String,
}

impl Default for SeedOptions {
    fn default() -> Self {
        SeedOptions {
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

/// What a seeding run inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub products_inserted: usize,
    pub admin_created: bool,
}

impl SeedReport {
    /// True when the run inserted nothing.
    pub fn is_noop(&self) -> bool {
        self.products_inserted == 0 && !self.admin_created
    }
}

/// The four masterclasses every fresh shop starts with.
pub fn default_products() -> Vec<Product> {
    vec![
        Product::new(
            "mc-react",
            "Getting Started with React",
            "Get quickly up and running with React and create a profile website in just 3 hours!",
            Decimal::new(90, 0),
            "masterclass_react.png",
            false,
        ),
        Product::new(
            "mc-ai-python",
            "AI with TensorFlow & Python",
            "Create a machine learning model using Python and TensorFlow, focusing on image recognition and classification.",
            Decimal::new(90, 0),
            "masterclass_ai.png",
            false,
        ),
        Product::new(
            "mc-unity",
            "Game Development with Unity",
            "Create a clone of the popular 2D platformer featuring an Italian plumber, starting from scratch and covering all aspects of game development.",
            Decimal::new(360, 0),
            "masterclass_game.png",
            true,
        ),
        Product::new(
            "mc-flexbox",
            "Introduction to CSS FlexBox",
            "FlexBox can revolutionise how you create responsive websites. Learn how in just 3 hours!",
            Decimal::new(90, 0),
            "masterclass_css.png",
            false,
        ),
    ]
}

/// Seeds missing default products and, if there are no users, the admin.
pub async fn ensure_seed_data(db: &Database, options: &SeedOptions) -> DbResult<SeedReport> {
    let mut report = SeedReport::default();

    report.products_inserted = db.products().insert_missing(&default_products()).await?;
    if report.products_inserted > 0 {
        info!(count = report.products_inserted, "Seeded default products");
    }

    let users = db.users();
    if users.count().await? == 0 {
        let admin = new_user(&options.admin_email, &options.admin_password, true)?;
        users.insert(&admin).await?;
        report.admin_created = true;
        info!(email = %admin.email, "Seeded admin user");
    }

    Ok(report)
}
