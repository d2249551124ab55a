//! # Cart Engine
//!
//! Orchestrates one read-modify-write per operation against the store ports.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     add_item(cart_id, product_id)                       │
//! │                                                                         │
//! │  1. catalog.find_by_id(product_id) ──► None? ──► NotFound(Product)      │
//! │  2. carts.find_by_id(cart_id) ───────► None? ──► NotFound(Cart)         │
//! │  3. cart.add_product(&product)       (pure, may fail on limits)         │
//! │  4. carts.replace(&cart) ────────────► stale? ─► Conflict (no retry)    │
//! │  5. return cart at its new version                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Errors from collaborators are returned unchanged. Nothing here retries.

use tracing::{debug, info};

use crate::cart::CartWarning;
use crate::error::{CoreError, CoreResult};
use crate::ports::{CartStore, OrderStore, ProductCatalog};
use crate::types::{generate_id, Cart, ClientOrder, Product};
use crate::validation::validate_email;

/// Cart aggregation engine over a catalog, a cart store and an order store.
pub struct CartEngine<P, C, O> {
    catalog: P,
    carts: C,
    orders: O,
}

impl<P, C, O> CartEngine<P, C, O>
where
    P: ProductCatalog,
    C: CartStore,
    O: OrderStore,
{
    pub fn new(catalog: P, carts: C, orders: O) -> Self {
        CartEngine {
            catalog,
            carts,
            orders,
        }
    }

    pub fn catalog(&self) -> &P {
        &self.catalog
    }

    pub fn carts(&self) -> &C {
        &self.carts
    }

    pub fn orders(&self) -> &O {
        &self.orders
    }

    // =========================================================================
    // Cart Lifecycle
    // =========================================================================

    /// Creates and stores an empty cart. Returns its id.
    pub async fn create(&self) -> CoreResult<String> {
        let cart = Cart::new(generate_id());
        let id = self.carts.create(&cart).await?;
        info!(cart_id = %id, "Cart created");
        Ok(id)
    }

    /// Reads a cart.
    pub async fn get_cart(&self, cart_id: &str) -> CoreResult<Cart> {
        self.load_cart(cart_id).await
    }

    /// Whether the cart holds a line for the product.
    pub async fn contains_item(&self, cart_id: &str, product_id: &str) -> CoreResult<bool> {
        self.carts.exists(cart_id, product_id).await
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds one unit of a product to a cart.
    ///
    /// Not idempotent: each call adds another unit.
    pub async fn add_item(&self, cart_id: &str, product_id: &str) -> CoreResult<Cart> {
        let product = self
            .catalog
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Product", product_id))?;

        let mut cart = self.load_cart(cart_id).await?;
        cart.add_product(&product)?;

        debug!(cart_id = %cart_id, product_id = %product_id, total = %cart.total, "Item added");
        self.persist(cart).await
    }

    /// Sets a line's quantity. `qty <= 0` removes the line.
    ///
    /// A product that is not in the cart changes no lines, but the total is
    /// still recomputed and written.
    pub async fn change_qty(&self, cart_id: &str, product_id: &str, qty: i64) -> CoreResult<Cart> {
        let mut cart = self.load_cart(cart_id).await?;
        cart.change_qty(product_id, qty)?;

        debug!(cart_id = %cart_id, product_id = %product_id, qty, total = %cart.total, "Quantity changed");
        self.persist(cart).await
    }

    /// Removes a product's line. Absent products are not an error.
    pub async fn remove_item(&self, cart_id: &str, product_id: &str) -> CoreResult<Cart> {
        let mut cart = self.load_cart(cart_id).await?;
        let removed = cart.remove_product(product_id)?;

        debug!(cart_id = %cart_id, product_id = %product_id, removed, total = %cart.total, "Item removed");
        self.persist(cart).await
    }

    /// Empties a cart, keeping its id.
    pub async fn clear(&self, cart_id: &str) -> CoreResult<Cart> {
        let mut cart = self.load_cart(cart_id).await?;
        cart.clear();

        debug!(cart_id = %cart_id, "Cart cleared");
        self.persist(cart).await
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Warnings for the cart's current contents.
    pub async fn get_warnings(&self, cart_id: &str) -> CoreResult<Vec<CartWarning>> {
        Ok(self.load_cart(cart_id).await?.warnings())
    }

    /// Every product in the catalog, ordered by name.
    pub async fn list_products(&self) -> CoreResult<Vec<Product>> {
        self.catalog.find_all().await
    }

    /// One product from the catalog.
    pub async fn get_product(&self, product_id: &str) -> CoreResult<Product> {
        self.catalog
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Product", product_id))
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Places an order for the cart's current contents.
    ///
    /// The returned order holds its own copy of the cart. The live cart is
    /// left untouched; call [`clear`](Self::clear) to reset it.
    pub async fn checkout(&self, cart_id: &str, email: &str) -> CoreResult<ClientOrder> {
        validate_email(email)?;
        let cart = self.load_cart(cart_id).await?;

        let order = ClientOrder::new(email.trim(), &cart);
        self.orders.create(&order).await?;

        info!(
            order_id = %order.id,
            cart_id = %cart_id,
            total = %order.cart.total,
            items = order.cart.items.len(),
            "Order placed"
        );
        Ok(order)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn load_cart(&self, cart_id: &str) -> CoreResult<Cart> {
        self.carts
            .find_by_id(cart_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Cart", cart_id))
    }

    async fn persist(&self, mut cart: Cart) -> CoreResult<Cart> {
        cart.version = self.carts.replace(&cart).await?;
        Ok(cart)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::DEPOSIT_WARNING;
    use crate::memory::{InMemoryCartStore, InMemoryCatalog, InMemoryOrderStore};
    use async_trait::async_trait;
    use rust_decimal::Decimal;

    type TestEngine = CartEngine<InMemoryCatalog, InMemoryCartStore, InMemoryOrderStore>;

    struct Fixture {
        engine: TestEngine,
        react: Product,
        unity: Product,
    }

    fn fixture() -> Fixture {
        let react = Product::new(
            "mc-react",
            "Getting Started with React",
            "Profile website in 3 hours",
            Decimal::new(90, 0),
            "masterclass_react.png",
            false,
        );
        let unity = Product::new(
            "mc-unity",
            "Game Development with Unity",
            "Two day course",
            Decimal::new(360, 0),
            "masterclass_game.png",
            true,
        );
        let catalog = InMemoryCatalog::with_products(vec![react.clone(), unity.clone()]);
        let engine = CartEngine::new(catalog, InMemoryCartStore::new(), InMemoryOrderStore::new());
        Fixture {
            engine,
            react,
            unity,
        }
    }

    #[tokio::test]
    async fn test_create_returns_empty_cart() {
        let f = fixture();
        let id = f.engine.create().await.unwrap();
        let cart = f.engine.get_cart(&id).await.unwrap();

        assert_eq!(cart.id, id);
        assert!(cart.items.is_empty());
        assert_eq!(cart.total.to_string(), "0.00");
        assert_eq!(cart.version, 0);
    }

    #[tokio::test]
    async fn test_scenarios_a_through_e() {
        let f = fixture();
        let id = f.engine.create().await.unwrap();

        // A
        let cart = f.engine.add_item(&id, &f.react.id).await.unwrap();
        assert_eq!(cart.items[0].qty, 1);
        assert_eq!(cart.total.to_string(), "90.00");

        // B
        let cart = f.engine.add_item(&id, &f.react.id).await.unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].subtotal.to_string(), "180.00");

        // C
        let cart = f.engine.add_item(&id, &f.unity.id).await.unwrap();
        assert_eq!(cart.total.to_string(), "540.00");
        let warnings = f.engine.get_warnings(&id).await.unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].to_string(), DEPOSIT_WARNING);

        // D
        let cart = f.engine.change_qty(&id, &f.react.id, 0).await.unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].product.id, f.unity.id);
        assert_eq!(cart.total.to_string(), "360.00");

        // E
        let order = f.engine.checkout(&id, "ninja@coders.ninja").await.unwrap();
        assert_eq!(order.email, "ninja@coders.ninja");
        assert_eq!(order.cart.total.to_string(), "360.00");
        assert_eq!(order.cart.items.len(), 1);

        f.engine.add_item(&id, &f.react.id).await.unwrap();
        f.engine.clear(&id).await.unwrap();

        let stored = f.engine.orders().find_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.cart.total.to_string(), "360.00");
        assert_eq!(stored.cart.items.len(), 1);
        assert_eq!(stored, order);
    }

    #[tokio::test]
    async fn test_every_write_bumps_version() {
        let f = fixture();
        let id = f.engine.create().await.unwrap();

        let cart = f.engine.add_item(&id, &f.react.id).await.unwrap();
        assert_eq!(cart.version, 1);
        let cart = f.engine.remove_item(&id, "absent").await.unwrap();
        assert_eq!(cart.version, 2);
        assert_eq!(f.engine.get_cart(&id).await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let f = fixture();
        let id = f.engine.create().await.unwrap();

        let err = f.engine.add_item(&id, "no-such-product").await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { ref entity, .. } if entity == "Product"));

        let err = f.engine.add_item("no-such-cart", &f.react.id).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { ref entity, .. } if entity == "Cart"));

        assert!(f.engine.change_qty("no-such-cart", &f.react.id, 1).await.unwrap_err().is_not_found());
        assert!(f.engine.remove_item("no-such-cart", &f.react.id).await.unwrap_err().is_not_found());
        assert!(f.engine.get_warnings("no-such-cart").await.unwrap_err().is_not_found());
        assert!(f.engine.checkout("no-such-cart", "a@b.co").await.unwrap_err().is_not_found());
        assert!(f.engine.get_product("no-such-product").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_change_qty_on_missing_item_still_persists() {
        let f = fixture();
        let id = f.engine.create().await.unwrap();
        f.engine.add_item(&id, &f.react.id).await.unwrap();

        let cart = f.engine.change_qty(&id, &f.unity.id, 5).await.unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total.to_string(), "90.00");
        assert_eq!(cart.version, 2);
    }

    #[tokio::test]
    async fn test_remove_twice_is_idempotent() {
        let f = fixture();
        let id = f.engine.create().await.unwrap();
        f.engine.add_item(&id, &f.react.id).await.unwrap();
        f.engine.add_item(&id, &f.unity.id).await.unwrap();

        let first = f.engine.remove_item(&id, &f.react.id).await.unwrap();
        let second = f.engine.remove_item(&id, &f.react.id).await.unwrap();
        assert_eq!(first.items, second.items);
        assert_eq!(first.total, second.total);
        assert!(!f.engine.contains_item(&id, &f.react.id).await.unwrap());
        assert!(f.engine.contains_item(&id, &f.unity.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_cart_keeps_snapshot_after_catalog_change() {
        let f = fixture();
        let id = f.engine.create().await.unwrap();
        f.engine.add_item(&id, &f.react.id).await.unwrap();

        let mut repriced = f.react.clone();
        repriced.price = Decimal::new(10, 0);
        f.engine.catalog().insert(repriced).await;

        let cart = f.engine.add_item(&id, &f.react.id).await.unwrap();
        assert_eq!(cart.items[0].qty, 2);
        assert_eq!(cart.total.to_string(), "180.00");

        // Deleting the product does not touch existing lines
        f.engine.catalog().remove(&f.react.id).await;
        let cart = f.engine.change_qty(&id, &f.react.id, 3).await.unwrap();
        assert_eq!(cart.total.to_string(), "270.00");
    }

    #[tokio::test]
    async fn test_checkout_rejects_invalid_email() {
        let f = fixture();
        let id = f.engine.create().await.unwrap();
        let err = f.engine.checkout(&id, "not-an-email").await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(f.engine.orders().is_empty().await);
    }

    #[tokio::test]
    async fn test_checkout_leaves_live_cart_untouched() {
        let f = fixture();
        let id = f.engine.create().await.unwrap();
        f.engine.add_item(&id, &f.unity.id).await.unwrap();
        let before = f.engine.get_cart(&id).await.unwrap();

        f.engine.checkout(&id, "a@b.co").await.unwrap();
        assert_eq!(f.engine.get_cart(&id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_list_products_sorted_by_name() {
        let f = fixture();
        let names: Vec<String> = f
            .engine
            .list_products()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(
            names,
            vec!["Game Development with Unity", "Getting Started with React"]
        );
    }

    #[tokio::test]
    async fn test_total_consistent_through_mixed_sequence() {
        let f = fixture();
        let id = f.engine.create().await.unwrap();
        let ids = [f.react.id.clone(), f.unity.id.clone()];

        for step in 0..40usize {
            let pid = &ids[step % 2];
            let cart = match step % 4 {
                0 | 1 => f.engine.add_item(&id, pid).await.unwrap(),
                2 => f.engine.change_qty(&id, pid, (step % 5) as i64 - 1).await.unwrap(),
                _ => f.engine.remove_item(&id, pid).await.unwrap(),
            };
            assert!(cart.is_consistent(), "step {}", step);
            let stored = f.engine.get_cart(&id).await.unwrap();
            assert_eq!(stored, cart);
        }
    }

    /// Cart store that lets another writer win between read and write.
    struct RacingCartStore {
        inner: InMemoryCartStore,
    }

    #[async_trait]
    impl CartStore for RacingCartStore {
        async fn create(&self, cart: &Cart) -> CoreResult<String> {
            self.inner.create(cart).await
        }

        async fn find_by_id(&self, id: &str) -> CoreResult<Option<Cart>> {
            self.inner.find_by_id(id).await
        }

        async fn replace(&self, cart: &Cart) -> CoreResult<i64> {
            if let Some(current) = self.inner.find_by_id(&cart.id).await? {
                self.inner.replace(&current).await?;
            }
            self.inner.replace(cart).await
        }

        async fn exists(&self, cart_id: &str, product_id: &str) -> CoreResult<bool> {
            self.inner.exists(cart_id, product_id).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_write_surfaces_conflict() {
        let f = fixture();
        let engine = CartEngine::new(
            InMemoryCatalog::with_products(vec![f.react.clone()]),
            RacingCartStore {
                inner: InMemoryCartStore::new(),
            },
            InMemoryOrderStore::new(),
        );
        let id = engine.create().await.unwrap();

        let err = engine.add_item(&id, &f.react.id).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Conflict {
                expected_version: 0,
                ..
            }
        ));

        // The losing write left nothing behind
        let stored = engine.get_cart(&id).await.unwrap();
        assert!(stored.items.is_empty());
        assert_eq!(stored.version, 1);
    }
}
