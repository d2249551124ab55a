//! # Domain Types
//!
//! Core domain types used throughout the masterclass shop.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Cart       │   │  ClientOrder    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sku (business) │   │  items ─────────┼─┐ │  email          │       │
//! │  │  price (Decimal)│   │  total (Money)  │ │ │  cart (copy)    │       │
//! │  │  requires_dep.  │   │  version        │ │ └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘ │                            │
//! │          ▲                                 ▼                            │
//! │          │ snapshot            ┌─────────────────┐                      │
//! │          └─────────────────────│    CartItem     │                      │
//! │                                │  product, qty   │                      │
//! │                                │  subtotal       │                      │
//! │                                └─────────────────┘                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Products have:
//! - `id`: UUID v4 - immutable, used as the cart line key
//! - `sku`: human-readable business identifier (`mc-react`)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;

/// Generates a new entity ID (UUID v4 string).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Product
// =============================================================================

/// A masterclass available for purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name shown on the listing page.
    pub name: String,

    /// Longer description for the product card.
    pub description: String,

    /// Unit price. May carry more than two fraction digits.
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,

    /// Image file name, resolved by the web layer.
    pub featured_image: String,

    /// Whether an upfront deposit is required to book this class.
    pub requires_deposit: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a product with a fresh id and timestamps.
    pub fn new(
        sku: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        featured_image: impl Into<String>,
        requires_deposit: bool,
    ) -> Self {
        let now = Utc::now();
        Product {
            id: generate_id(),
            sku: sku.into(),
            name: name.into(),
            description: description.into(),
            price,
            featured_image: featured_image.into(),
            requires_deposit,
            created_at: now,
            updated_at: now,
        }
    }

    /// Price formatted for display, e.g. `€90.00`.
    pub fn display_price(&self, currency_symbol: &str) -> String {
        Money::round2(self.price).display_with_symbol(currency_symbol)
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// One product's line in a cart.
///
/// ## Snapshot Pattern
/// `product` is a frozen copy taken when the line was first added. Later
/// catalog edits do not reprice lines already in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product snapshot at add time.
    pub product: Product,

    /// Quantity. Always > 0 in a stored cart.
    pub qty: i64,

    /// `round2(product.price × qty)`.
    pub subtotal: Money,
}

impl CartItem {
    /// Product id this line is keyed by.
    #[inline]
    pub fn product_id(&self) -> &str {
        &self.product.id
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A shopping cart.
///
/// ## Invariants
/// - Items are unique by product id
/// - Every stored item has `qty > 0` and `subtotal == round2(price × qty)`
/// - `total == round2(Σ subtotal)` after every mutation
/// - `id` never changes once created
///
/// Mutations live in [`crate::cart`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Cart identity (UUID v4).
    pub id: String,

    /// Lines in insertion order.
    pub items: Vec<CartItem>,

    /// Rounded sum of all line subtotals.
    pub total: Money,

    /// Optimistic concurrency counter, bumped by every successful store write.
    pub version: i64,

    /// When the cart was created.
    pub created_at: DateTime<Utc>,

    /// When the cart was last written.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Client Order
// =============================================================================

/// An order placed at checkout.
///
/// `cart` is a by-value copy. Mutating or clearing the live cart afterwards
/// never changes an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOrder {
    /// Order identity (UUID v4).
    pub id: String,

    /// Purchaser email.
    pub email: String,

    /// Cart contents at checkout time.
    pub cart: Cart,

    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

impl ClientOrder {
    /// Binds an email to a copy of `cart`.
    pub fn new(email: impl Into<String>, cart: &Cart) -> Self {
        ClientOrder {
            id: generate_id(),
            email: email.into(),
            cart: cart.clone(),
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// A back-office user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    /// PHC-format password hash. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: Decimal) -> Product {
        Product::new(
            "mc-react",
            "Getting Started with React",
            "Profile website in 3 hours",
            price,
            "masterclass_react.png",
            false,
        )
    }

    #[test]
    fn test_display_price() {
        assert_eq!(product(Decimal::new(90, 0)).display_price("€"), "€90.00");
        assert_eq!(product(Decimal::new(33333, 3)).display_price("€"), "€33.33");
    }

    #[test]
    fn test_product_ids_are_unique() {
        let a = product(Decimal::ONE);
        let b = product(Decimal::ONE);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_product_serializes_price_as_string() {
        let json = serde_json::to_value(product(Decimal::new(33333, 3))).unwrap();
        assert_eq!(json["price"], "33.333");
        assert_eq!(json["requiresDeposit"], false);
    }
}
