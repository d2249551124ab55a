//! # Cart Repository
//!
//! Stores carts as a header row in `carts` plus one row per line in
//! `cart_items`.
//!
//! ## Replace Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  replace(cart @ version N)                                              │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    UPDATE carts SET version = N + 1, ... WHERE id = ? AND version = N   │
//! │      │                                                                  │
//! │      ├── 0 rows ─► SELECT version ─► none   ─► ROLLBACK, NotFound       │
//! │      │                             └► M ≠ N ─► ROLLBACK, VersionConflict│
//! │      ▼                                                                  │
//! │    DELETE FROM cart_items WHERE cart_id = ?                             │
//! │    INSERT INTO cart_items ... (one per line, in order)                  │
//! │  COMMIT ─► N + 1                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The version check and the line rewrite share one transaction, so a
//! losing writer changes nothing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::str::FromStr;
use tracing::debug;

use super::line::{ensure_consistent, fetch_lines, insert_lines};
use crate::error::{DbError, DbResult};
use masterclass_core::{Cart, CartStore, CoreResult, Money};

const LINES_TABLE: &str = "cart_items";
const OWNER_COLUMN: &str = "cart_id";

/// Raw `carts` row.
#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: String,
    total: String,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Repository for cart database operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Inserts a cart and its lines.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - a cart with this id exists
    pub async fn insert(&self, cart: &Cart) -> DbResult<()> {
        debug!(id = %cart.id, "Inserting cart");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO carts (id, total, version, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&cart.id)
        .bind(cart.total.to_string())
        .bind(cart.version)
        .bind(cart.created_at)
        .bind(cart.updated_at)
        .execute(&mut *tx)
        .await?;

        insert_lines(&mut tx, LINES_TABLE, OWNER_COLUMN, &cart.id, &cart.items).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Gets a cart with its lines.
    ///
    /// Header and lines are read in one transaction. A stored cart whose
    /// total or subtotals disagree with its lines is reported as
    /// `DbError::InvalidData` rather than returned.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Cart>> {
        let mut tx = self.pool.begin().await?;

        let row: Option<CartRow> = sqlx::query_as(
            "SELECT id, total, version, created_at, updated_at FROM carts WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = fetch_lines(&mut tx, LINES_TABLE, OWNER_COLUMN, id).await?;
        tx.commit().await?;

        let total =
            Money::from_str(&row.total).map_err(|e| DbError::invalid_data("carts", "total", e))?;

        let cart = Cart {
            id: row.id,
            items,
            total,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };
        ensure_consistent(&cart, "carts")?;

        Ok(Some(cart))
    }

    /// Overwrites a cart if its stored version equals `cart.version`.
    ///
    /// ## Returns
    /// * `Ok(new_version)` - write applied
    /// * `Err(DbError::NotFound)` - no such cart
    /// * `Err(DbError::VersionConflict)` - someone else wrote first
    pub async fn replace(&self, cart: &Cart) -> DbResult<i64> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE carts
            SET total = ?3, version = version + 1, updated_at = ?4
            WHERE id = ?1 AND version = ?2
            "#,
        )
        .bind(&cart.id)
        .bind(cart.version)
        .bind(cart.total.to_string())
        .bind(cart.updated_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let actual = current_version(&mut tx, &cart.id).await?;
            tx.rollback().await?;
            return Err(match actual {
                None => DbError::not_found("Cart", &cart.id),
                Some(actual) => DbError::VersionConflict {
                    cart_id: cart.id.clone(),
                    expected: cart.version,
                    actual,
                },
            });
        }

        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?1")
            .bind(&cart.id)
            .execute(&mut *tx)
            .await?;
        insert_lines(&mut tx, LINES_TABLE, OWNER_COLUMN, &cart.id, &cart.items).await?;

        tx.commit().await?;

        let new_version = cart.version + 1;
        debug!(id = %cart.id, version = new_version, items = cart.items.len(), "Cart replaced");
        Ok(new_version)
    }

    /// Whether the cart has a line for the product. False for unknown carts.
    pub async fn has_item(&self, cart_id: &str, product_id: &str) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM cart_items WHERE cart_id = ?1 AND product_id = ?2",
        )
        .bind(cart_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    /// Deletes a cart and, by cascade, its lines.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting cart");

        let result = sqlx::query("DELETE FROM carts WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart", id));
        }
        Ok(())
    }
}

async fn current_version(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<i64>> {
    let version = sqlx::query_scalar("SELECT version FROM carts WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(version)
}

#[async_trait]
impl CartStore for CartRepository {
    async fn create(&self, cart: &Cart) -> CoreResult<String> {
        self.insert(cart).await?;
        Ok(cart.id.clone())
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Cart>> {
        Ok(self.get_by_id(id).await?)
    }

    async fn replace(&self, cart: &Cart) -> CoreResult<i64> {
        Ok(CartRepository::replace(self, cart).await?)
    }

    async fn exists(&self, cart_id: &str, product_id: &str) -> CoreResult<bool> {
        Ok(self.has_item(cart_id, product_id).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
