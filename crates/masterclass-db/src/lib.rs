//! # masterclass-db: Database Layer for the Masterclass Shop
//!
//! This crate provides SQLite persistence for the masterclass shop and
//! implements the store ports the cart engine depends on.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Masterclass Shop Data Flow                       │
//! │                                                                         │
//! │  shop-cli command (cart add <cart> <product>)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartEngine (masterclass-core) ── ProductCatalog / CartStore / OrderStore│
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  masterclass-db (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CartRepo      │    │ 001_init.sql │  │   │
//! │  │   │               │    │ OrderRepo     │    │              │  │   │
//! │  │   │               │    │ UserRepo      │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   auth (argon2 login checks)   seed (ensure_seed_data)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (or a private in-memory database in tests)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, cart, order, user)
//! - [`auth`] - Password hashing and login checks
//! - [`seed`] - Idempotent default data
//!
//! ## Usage
//!
//! ```rust,ignore
//! use masterclass_core::CartEngine;
//! use masterclass_db::{ensure_seed_data, Database, DbConfig, SeedOptions};
//!
//! let db = Database::new(DbConfig::new("masterclass.db")).await?;
//! ensure_seed_data(&db, &SeedOptions::default()).await?;
//!
//! let engine = CartEngine::new(db.products(), db.carts(), db.orders());
//! let cart_id = engine.create().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use auth::{check_login, LoginOutcome};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use seed::{ensure_seed_data, SeedOptions, SeedReport};

// Repository re-exports for convenience
pub use repository::cart::CartRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::user::UserRepository;
