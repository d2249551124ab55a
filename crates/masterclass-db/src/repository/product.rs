//! # Product Repository
//!
//! Database operations for the masterclass catalog.
//!
//! ## Key Operations
//! - Listing and lookup (the shop's product page)
//! - Admin upsert and delete
//! - [`ProductCatalog`] for the cart engine
//!
//! ## Price Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products.price is TEXT                                                 │
//! │                                                                         │
//! │  Decimal("33.333") ──► "33.333" ──► SQLite ──► "33.333" ──► Decimal     │
//! │                                                                         │
//! │  No float ever touches a price. A row whose price doesn't parse is      │
//! │  reported as DbError::InvalidData, never silently zeroed.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::debug;

use crate::error::{DbError, DbResult};
use masterclass_core::validation::validate_product;
use masterclass_core::{CoreResult, Product, ProductCatalog};

const PRODUCT_COLUMNS: &str = r#"
    id, sku, name, description, price, featured_image,
    requires_deposit, created_at, updated_at
"#;

/// Raw `products` row.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    sku: String,
    name: String,
    description: String,
    price: String,
    featured_image: String,
    requires_deposit: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> DbResult<Self> {
        let price = Decimal::from_str(&row.price)
            .map_err(|e| DbError::invalid_data("products", "price", e))?;

        Ok(Product {
            id: row.id,
            sku: row.sku,
            name: row.name,
            description: row.description,
            price,
            featured_image: row.featured_image,
            requires_deposit: row.requires_deposit,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let all = repo.find_all().await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists every product, ordered by name.
    pub async fn find_all(&self) -> DbResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products ORDER BY name, sku",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Listed products");
        rows.into_iter().map(Product::try_from).collect()
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products WHERE id = ?1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Gets a product by its SKU (e.g., "mc-react").
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products WHERE sku = ?1",
            PRODUCT_COLUMNS
        ))
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(DbError::Validation)` - sku, name or price rejected
    /// * `Err(DbError::UniqueViolation)` - id or SKU already exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        validate_product(product)?;
        debug!(sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name, description, price, featured_image,
                requires_deposit, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(product.sku.trim())
        .bind(product.name.trim())
        .bind(&product.description)
        .bind(product.price.to_string())
        .bind(&product.featured_image)
        .bind(product.requires_deposit)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts the product, or overwrites every editable field if the id
    /// already exists.
    ///
    /// `created_at` survives an update; `updated_at` is set to now. Carts and
    /// orders that already hold a snapshot of this product are not touched.
    ///
    /// ## Returns
    /// The product as stored.
    pub async fn upsert(&self, product: &Product) -> DbResult<Product> {
        validate_product(product)?;
        debug!(id = %product.id, sku = %product.sku, "Upserting product");

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name, description, price, featured_image,
                requires_deposit, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                sku = excluded.sku,
                name = excluded.name,
                description = excluded.description,
                price = excluded.price,
                featured_image = excluded.featured_image,
                requires_deposit = excluded.requires_deposit,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&product.id)
        .bind(product.sku.trim())
        .bind(product.name.trim())
        .bind(&product.description)
        .bind(product.price.to_string())
        .bind(&product.featured_image)
        .bind(product.requires_deposit)
        .bind(product.created_at)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(&product.id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", &product.id))
    }

    /// Hard-deletes a product.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Inserts every product whose SKU is not stored yet, in one transaction.
    ///
    /// Products whose SKU already exists are left as they are. Either all
    /// missing products land or none do.
    ///
    /// ## Returns
    /// The number of products inserted.
    pub async fn insert_missing(&self, products: &[Product]) -> DbResult<usize> {
        for product in products {
            validate_product(product)?;
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for product in products {
            let result = sqlx::query(
                r#"
                INSERT INTO products (
                    id, sku, name, description, price, featured_image,
                    requires_deposit, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ON CONFLICT(sku) DO NOTHING
                "#,
            )
            .bind(&product.id)
            .bind(product.sku.trim())
            .bind(product.name.trim())
            .bind(&product.description)
            .bind(product.price.to_string())
            .bind(&product.featured_image)
            .bind(product.requires_deposit)
            .bind(product.created_at)
            .bind(product.updated_at)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() > 0 {
                debug!(sku = %product.sku, "Inserted missing product");
                inserted += 1;
            }
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl ProductCatalog for ProductRepository {
    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Product>> {
        Ok(self.get_by_id(id).await?)
    }

    async fn find_all(&self) -> CoreResult<Vec<Product>> {
        Ok(ProductRepository::find_all(self).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
