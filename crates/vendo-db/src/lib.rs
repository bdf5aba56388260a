//! # vendo-db: Database Layer for Vendo
//!
//! This crate provides database access for the Vendo vending engine.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Vendo Data Flow                                │
//! │                                                                         │
//! │  vendo-engine (purchase / deposit / catalogue)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     vendo-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (product.rs,  │    │  (embedded)  │  │   │
//! │  │   │               │    │  account.rs)  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo   │    │ 001_init.sql │  │   │
//! │  │   │ Management    │    │ AccountRepo   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │                     SQLite Database (WAL mode)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Two Primitives That Matter
//!
//! Everything else here is ordinary CRUD. Two operations carry the
//! correctness load for the purchase flow and are worth reading closely:
//!
//! - [`ProductRepository::reserve_stock`] - conditional decrement: a single
//!   `UPDATE ... WHERE amount_available >= ?` statement, so two concurrent
//!   reservations can never drive stock negative.
//! - [`AccountRepository::debit_all`] - compare-and-swap zero-out: the
//!   balance is read, checked, and zeroed with the observed value as a
//!   guard, so a concurrent mutation forces a clean re-read instead of a
//!   double spend.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vendo_db::{Database, DbConfig};
//!
//! let config = DbConfig::new("path/to/vendo.db");
//! let db = Database::new(config).await?;
//!
//! let product = db.products().get_by_id("some-uuid").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::account::{AccountRepository, DebitOutcome};
pub use repository::product::{ProductRepository, ReserveOutcome};
