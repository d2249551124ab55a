//! # Line Snapshots
//!
//! Shared row mapping for `cart_items` and `client_order_items`. Both tables
//! store a line the same way: a full product snapshot, a quantity and a
//! subtotal.
//!
//! ```text
//! CartItem { product: Product { .. }, qty, subtotal }
//!      │
//!      ▼  flattened, one column per product field
//! (owner_id, position, product_id, product_sku, ..., qty, subtotal)
//! ```
//!
//! A header and its lines are read inside one transaction so they come from
//! the same snapshot, and the rebuilt cart must satisfy
//! [`Cart::is_consistent`] before it leaves this crate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqliteConnection;
use std::str::FromStr;

use crate::error::{DbError, DbResult};
use masterclass_core::{Cart, CartItem, Money, Product};

/// Raw line row, shared by both line tables.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct LineRow {
    product_id: String,
    product_sku: String,
    product_name: String,
    product_description: String,
    product_price: String,
    product_featured_image: String,
    product_requires_deposit: bool,
    product_created_at: DateTime<Utc>,
    product_updated_at: DateTime<Utc>,
    qty: i64,
    subtotal: String,
}

impl LineRow {
    /// Rebuilds the domain line, reporting bad decimals against `table`.
    pub(crate) fn into_item(self, table: &str) -> DbResult<CartItem> {
        let price = Decimal::from_str(&self.product_price)
            .map_err(|e| DbError::invalid_data(table, "product_price", e))?;
        let subtotal = Money::from_str(&self.subtotal)
            .map_err(|e| DbError::invalid_data(table, "subtotal", e))?;

        if self.qty <= 0 {
            return Err(DbError::invalid_data(
                table,
                "qty",
                format!("quantity {} is not positive", self.qty),
            ));
        }

        Ok(CartItem {
            product: Product {
                id: self.product_id,
                sku: self.product_sku,
                name: self.product_name,
                description: self.product_description,
                price,
                featured_image: self.product_featured_image,
                requires_deposit: self.product_requires_deposit,
                created_at: self.product_created_at,
                updated_at: self.product_updated_at,
            },
            qty: self.qty,
            subtotal,
        })
    }
}

/// Rejects a cart whose stored subtotals or total disagree with its lines.
pub(crate) fn ensure_consistent(cart: &Cart, table: &str) -> DbResult<()> {
    if cart.is_consistent() {
        return Ok(());
    }
    Err(DbError::invalid_data(
        table,
        "total",
        format!(
            "cart {} total {} does not match its {} line(s)",
            cart.id,
            cart.total,
            cart.items.len()
        ),
    ))
}

/// Loads the lines of one cart or order, in insertion order.
pub(crate) async fn fetch_lines(
    conn: &mut SqliteConnection,
    table: &'static str,
    owner_column: &'static str,
    owner_id: &str,
) -> DbResult<Vec<CartItem>> {
    let rows: Vec<LineRow> = sqlx::query_as(&format!(
        r#"
        SELECT product_id, product_sku, product_name, product_description,
               product_price, product_featured_image, product_requires_deposit,
               product_created_at, product_updated_at, qty, subtotal
        FROM {table}
        WHERE {owner_column} = ?1
        ORDER BY position
        "#
    ))
    .bind(owner_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(|row| row.into_item(table)).collect()
}

/// Writes the lines of one cart or order. Callers delete old lines first.
pub(crate) async fn insert_lines(
    conn: &mut SqliteConnection,
    table: &'static str,
    owner_column: &'static str,
    owner_id: &str,
    items: &[CartItem],
) -> DbResult<()> {
    let sql = format!(
        r#"
        INSERT INTO {table} (
            {owner_column}, position, product_id, product_sku, product_name,
            product_description, product_price, product_featured_image,
            product_requires_deposit, product_created_at, product_updated_at,
            qty, subtotal
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#
    );

    for (position, item) in items.iter().enumerate() {
        let p = &item.product;
        sqlx::query(&sql)
            .bind(owner_id)
            .bind(position as i64)
            .bind(&p.id)
            .bind(&p.sku)
            .bind(&p.name)
            .bind(&p.description)
            .bind(p.price.to_string())
            .bind(&p.featured_image)
            .bind(p.requires_deposit)
            .bind(p.created_at)
            .bind(p.updated_at)
            .bind(item.qty)
            .bind(item.subtotal.to_string())
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}
