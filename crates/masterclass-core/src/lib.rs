//! # masterclass-core: Pure Business Logic for the Masterclass Shop
//!
//! This crate owns the cart aggregation rules: how line items, subtotals and
//! the cart total stay consistent while a visitor adds, re-quantifies and
//! removes masterclasses.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Masterclass Shop Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Callers (web layer, shop-cli, tests)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ masterclass-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  engine   │  │   │
//! │  │   │  Product  │  │   Money   │  │  add/qty  │  │CartEngine │  │   │
//! │  │   │ ClientOrd │  │  round2   │  │  remove   │  │  + ports  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO DATABASE • NO NETWORK • STORAGE ONLY THROUGH PORTS         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               masterclass-db (Database Layer)                   │   │
//! │  │          SQLite repositories implementing the ports             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Cart, CartItem, ClientOrder)
//! - [`money`] - Decimal `Money` with a single rounding rule (`round2`)
//! - [`cart`] - Pure cart arithmetic and warnings
//! - [`engine`] - `CartEngine`, the read-modify-write orchestration
//! - [`ports`] - Store traits consumed by the engine
//! - [`memory`] - In-memory store implementations
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use masterclass_core::money::Money;
//! use rust_decimal::Decimal;
//!
//! // 33.333 × 2 = 66.666 → 66.67 after round-half-up at 2 decimals
//! let subtotal = Money::line_total(Decimal::new(33333, 3), 2).unwrap();
//! assert_eq!(subtotal.to_string(), "66.67");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod engine;
pub mod error;
pub mod memory;
pub mod money;
pub mod ports;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::CartWarning;
pub use engine::CartEngine;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use ports::{CartStore, OrderStore, ProductCatalog};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct products allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single product in a cart.
///
/// Stops runaway quantities from repeated add clicks or a mistyped field.
pub const MAX_ITEM_QUANTITY: i64 = 999;
