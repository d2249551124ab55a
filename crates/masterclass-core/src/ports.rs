//! # Store Ports
//!
//! Traits the [`CartEngine`](crate::engine::CartEngine) talks to. The engine
//! never sees SQL or locks; it only sees these three seams.
//!
//! ```text
//! ┌──────────────┐     ┌─────────────────┐     ┌──────────────────────────┐
//! │  CartEngine  │────►│ ProductCatalog  │◄────│ InMemoryCatalog          │
//! │              │     └─────────────────┘     │ ProductRepository (db)   │
//! │              │     ┌─────────────────┐     ├──────────────────────────┤
//! │              │────►│   CartStore     │◄────│ InMemoryCartStore        │
//! │              │     └─────────────────┘     │ CartRepository (db)      │
//! │              │     ┌─────────────────┐     ├──────────────────────────┤
//! │              │────►│   OrderStore    │◄────│ InMemoryOrderStore       │
//! └──────────────┘     └─────────────────┘     │ OrderRepository (db)     │
//!                                              └──────────────────────────┘
//! ```
//!
//! Implementations report failures as [`CoreError`](crate::error::CoreError):
//! `NotFound` for unknown ids on write, `Conflict` for stale cart versions,
//! and `Persistence` for everything else.

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{Cart, ClientOrder, Product};

/// Read-only access to the product catalog.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Product>>;

    /// All products, ordered by name.
    async fn find_all(&self) -> CoreResult<Vec<Product>>;
}

/// Cart persistence.
///
/// ## Versioning Contract
/// ```text
/// create(cart v0)            → stored at v0
/// replace(cart v0)           → stored at v1, returns 1
/// replace(cart v0) again     → Conflict { expected_version: 0 }, nothing written
/// replace(unknown id)        → NotFound
/// ```
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Inserts a new cart and returns its id.
    async fn create(&self, cart: &Cart) -> CoreResult<String>;

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Cart>>;

    /// Overwrites the stored cart if its version still equals `cart.version`.
    ///
    /// Returns the new version.
    async fn replace(&self, cart: &Cart) -> CoreResult<i64>;

    /// Whether the cart holds a line for `product_id`. False for unknown carts.
    async fn exists(&self, cart_id: &str, product_id: &str) -> CoreResult<bool>;
}

/// Order persistence. Orders are write-once.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts an order and returns its id.
    async fn create(&self, order: &ClientOrder) -> CoreResult<String>;

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<ClientOrder>>;
}
