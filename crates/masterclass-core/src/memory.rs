//! # In-Memory Stores
//!
//! Port implementations backed by `HashMap`s behind tokio `RwLock`s.
//! Used by tests and for running the engine without a database.
//!
//! Each store honors the same contracts as the SQLite repositories,
//! including the cart version check on `replace`.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::ports::{CartStore, OrderStore, ProductCatalog};
use crate::types::{Cart, ClientOrder, Product};

// =============================================================================
// Catalog
// =============================================================================

/// Product catalog held in memory.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<String, Product>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from a list of products.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let map = products.into_iter().map(|p| (p.id.clone(), p)).collect();
        InMemoryCatalog {
            products: RwLock::new(map),
        }
    }

    /// Inserts or replaces a product.
    pub async fn insert(&self, product: Product) {
        self.products.write().await.insert(product.id.clone(), product);
    }

    /// Removes a product. Carts keep their snapshots.
    pub async fn remove(&self, id: &str) -> Option<Product> {
        self.products.write().await.remove(id)
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Product>> {
        Ok(self.products.read().await.get(id).cloned())
    }

    async fn find_all(&self) -> CoreResult<Vec<Product>> {
        let mut products: Vec<Product> = self.products.read().await.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }
}

// =============================================================================
// Carts
// =============================================================================

/// Cart store held in memory.
#[derive(Debug, Default)]
pub struct InMemoryCartStore {
    carts: RwLock<HashMap<String, Cart>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored carts.
    pub async fn len(&self) -> usize {
        self.carts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.carts.read().await.is_empty()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn create(&self, cart: &Cart) -> CoreResult<String> {
        let mut carts = self.carts.write().await;
        if carts.contains_key(&cart.id) {
            return Err(CoreError::Persistence(format!(
                "cart {} already exists",
                cart.id
            )));
        }
        carts.insert(cart.id.clone(), cart.clone());
        Ok(cart.id.clone())
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Cart>> {
        Ok(self.carts.read().await.get(id).cloned())
    }

    async fn replace(&self, cart: &Cart) -> CoreResult<i64> {
        let mut carts = self.carts.write().await;
        let stored = carts
            .get_mut(&cart.id)
            .ok_or_else(|| CoreError::not_found("Cart", &cart.id))?;

        if stored.version != cart.version {
            return Err(CoreError::Conflict {
                cart_id: cart.id.clone(),
                expected_version: cart.version,
            });
        }

        let mut next = cart.clone();
        next.version = cart.version + 1;
        *stored = next;
        Ok(stored.version)
    }

    async fn exists(&self, cart_id: &str, product_id: &str) -> CoreResult<bool> {
        Ok(self
            .carts
            .read()
            .await
            .get(cart_id)
            .map(|c| c.contains(product_id))
            .unwrap_or(false))
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Order store held in memory.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<String, ClientOrder>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders.
    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: &ClientOrder) -> CoreResult<String> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(CoreError::Persistence(format!(
                "order {} already exists",
                order.id
            )));
        }
        orders.insert(order.id.clone(), order.clone());
        Ok(order.id.clone())
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<ClientOrder>> {
        Ok(self.orders.read().await.get(id).cloned())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replace_bumps_version() {
        let store = InMemoryCartStore::new();
        let cart = Cart::new("c1");
        store.create(&cart).await.unwrap();

        assert_eq!(store.replace(&cart).await.unwrap(), 1);
        let stored = store.find_by_id("c1").await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn test_stale_replace_conflicts() {
        let store = InMemoryCartStore::new();
        let cart = Cart::new("c1");
        store.create(&cart).await.unwrap();
        store.replace(&cart).await.unwrap();

        let err = store.replace(&cart).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Conflict {
                expected_version: 0,
                ..
            }
        ));
        assert_eq!(store.find_by_id("c1").await.unwrap().unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_replace_unknown_cart() {
        let store = InMemoryCartStore::new();
        let err = store.replace(&Cart::new("ghost")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_exists_on_unknown_cart_is_false() {
        let store = InMemoryCartStore::new();
        assert!(!store.exists("nope", "p1").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_create_rejected() {
        let store = InMemoryCartStore::new();
        let cart = Cart::new("c1");
        store.create(&cart).await.unwrap();
        assert!(store.create(&cart).await.is_err());
        assert_eq!(store.len().await, 1);
    }
}
