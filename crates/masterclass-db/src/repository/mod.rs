//! # Repository Module
//!
//! Database repository implementations for the masterclass shop.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  CartEngine / shop-cli                                                 │
//! │       │                                                                 │
//! │       │  db.carts().replace(&cart)                                     │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  CartRepository                                                        │
//! │  ├── insert(&self, cart)                                               │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── replace(&self, cart)   (version-checked)                          │
//! │  └── has_item(&self, cart_id, product_id)                              │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Easy to test (in-memory stores share the port traits)               │
//! │  • SQL is isolated in one place                                        │
//! │  • Can swap database implementations                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog listing and admin CRUD
//! - [`cart::CartRepository`] - Carts with versioned replace
//! - [`order::OrderRepository`] - Write-once client orders
//! - [`user::UserRepository`] - Back-office accounts

pub mod cart;
mod line;
pub mod order;
pub mod product;
pub mod user;
