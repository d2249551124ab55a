//! # Database Migrations
//!
//! The shop schema, embedded from `migrations/sqlite` at compile time.
//!
//! ## Schema
//! ```text
//! products ─────────── catalog, price as decimal TEXT, sku UNIQUE
//!
//! carts ──┬── cart_items           (cart_id, position, product_* snapshot,
//!         │                         qty > 0, subtotal)
//!         └── version              bumped by every CartRepository::replace
//!
//! client_orders ─── client_order_items   same line shape as cart_items
//!
//! users ────────────── email UNIQUE, argon2 password_hash, is_admin
//! ```
//!
//! Line tables copy every product column instead of referencing
//! `products`, so they carry no foreign key to it. Editing or deleting a
//! product leaves carts and orders exactly as they were. Lines do cascade
//! from their owning cart or order.
//!
//! Orders keep `cart_id` only as a reference; an order outlives its cart.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Every file under `migrations/sqlite`, applied in filename order.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies any migration not yet recorded in `_sqlx_migrations`.
///
/// Safe to call on every start; applied migrations are skipped.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!(embedded = MIGRATOR.migrations.len(), "Applying migrations");
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Returns `(embedded, applied)` migration counts.
///
/// Fails if migrations were never run on this database.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;

    Ok((MIGRATOR.migrations.len(), applied as usize))
}
