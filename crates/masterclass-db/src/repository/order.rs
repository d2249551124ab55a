//! # Client Order Repository
//!
//! Orders are written once at checkout and never updated. The cart they
//! were placed from is copied into `client_orders` (header) and
//! `client_order_items` (lines), so deleting or clearing the cart later has
//! no effect on the order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::debug;

use super::line::{ensure_consistent, fetch_lines, insert_lines};
use crate::error::{DbError, DbResult};
use masterclass_core::{Cart, ClientOrder, CoreResult, Money, OrderStore};

const LINES_TABLE: &str = "client_order_items";
const OWNER_COLUMN: &str = "order_id";

/// Raw `client_orders` row.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    email: String,
    cart_id: String,
    cart_version: i64,
    cart_total: String,
    cart_created_at: DateTime<Utc>,
    cart_updated_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

/// Repository for client orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order and its line snapshot in one transaction.
    ///
    /// ## Returns
    /// * `Err(DbError::InvalidData)` - the snapshot's total disagrees with its lines
    pub async fn insert(&self, order: &ClientOrder) -> DbResult<()> {
        ensure_consistent(&order.cart, "client_orders")?;
        debug!(id = %order.id, cart_id = %order.cart.id, "Inserting client order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO client_orders (
                id, email, cart_id, cart_version, cart_total,
                cart_created_at, cart_updated_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&order.id)
        .bind(&order.email)
        .bind(&order.cart.id)
        .bind(order.cart.version)
        .bind(order.cart.total.to_string())
        .bind(order.cart.created_at)
        .bind(order.cart.updated_at)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        insert_lines(&mut tx, LINES_TABLE, OWNER_COLUMN, &order.id, &order.cart.items).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Gets an order with its cart snapshot.
    ///
    /// Header and lines are read in one transaction and checked for
    /// consistency like carts are.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ClientOrder>> {
        let mut tx = self.pool.begin().await?;

        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, email, cart_id, cart_version, cart_total,
                   cart_created_at, cart_updated_at, created_at
            FROM client_orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = fetch_lines(&mut tx, LINES_TABLE, OWNER_COLUMN, id).await?;
        tx.commit().await?;

        let total = Money::from_str(&row.cart_total)
            .map_err(|e| DbError::invalid_data("client_orders", "cart_total", e))?;

        let order = ClientOrder {
            id: row.id,
            email: row.email,
            cart: Cart {
                id: row.cart_id,
                items,
                total,
                version: row.cart_version,
                created_at: row.cart_created_at,
                updated_at: row.cart_updated_at,
            },
            created_at: row.created_at,
        };
        ensure_consistent(&order.cart, "client_orders")?;

        Ok(Some(order))
    }

    /// Lists order ids placed by an email, newest first.
    pub async fn ids_for_email(&self, email: &str) -> DbResult<Vec<String>> {
        let ids = sqlx::query_scalar(
            "SELECT id FROM client_orders WHERE email = ?1 ORDER BY created_at DESC",
        )
        .bind(email.trim())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Counts all orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM client_orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl OrderStore for OrderRepository {
    async fn create(&self, order: &ClientOrder) -> CoreResult<String> {
        self.insert(order).await?;
        Ok(order.id.clone())
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<ClientOrder>> {
        Ok(self.get_by_id(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use masterclass_core::Product;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_order_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let mut cart = Cart::new("c1");
        cart.add_product(&Product::new("mc-unity", "Unity", "", Decimal::new(360, 0), "", true))
            .unwrap();
        let order = ClientOrder::new("ninja@coders.ninja", &cart);
        repo.insert(&order).await.unwrap();

        let stored = repo.get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.email, "ninja@coders.ninja");
        assert_eq!(stored.cart.id, "c1");
        assert_eq!(stored.cart.total.to_string(), "360.00");
        assert_eq!(stored.cart.items.len(), 1);
        assert!(stored.cart.items[0].product.requires_deposit);

        assert_eq!(
            repo.ids_for_email("ninja@coders.ninja").await.unwrap(),
            vec![order.id.clone()]
        );
        assert_eq!(repo.count().await.unwrap(), 1);
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_inconsistent_snapshot_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let mut cart = Cart::new("c1");
        cart.add_product(&Product::new("mc-react", "React", "", Decimal::new(90, 0), "", false))
            .unwrap();

        let mut broken = cart.clone();
        broken.total = Money::from_cents(100);
        let err = repo
            .insert(&ClientOrder::new("ninja@coders.ninja", &broken))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidData { .. }));
        assert_eq!(repo.count().await.unwrap(), 0);

        let order = ClientOrder::new("ninja@coders.ninja", &cart);
        repo.insert(&order).await.unwrap();
        sqlx::query("UPDATE client_orders SET cart_total = '1.00' WHERE id = ?1")
            .bind(&order.id)
            .execute(&repo.pool)
            .await
            .unwrap();

        let err = repo.get_by_id(&order.id).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidData { .. }));
    }
}
