//! # vendo-engine: Purchase Transaction Engine
//!
//! This crate composes the storage primitives into the one flow the whole
//! system exists for: a buyer pays coins, picks a product, and gets the
//! product plus exact change.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Purchase Transaction                             │
//! │                                                                         │
//! │  Surrounding service (HTTP, auth, roles)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  vendo-engine (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   PurchaseEngine ──► StockReservation ──► conditional decrement │   │
//! │  │        │                  (trait)                               │   │
//! │  │        └────────────► BalanceLedger   ──► atomic zero-out       │   │
//! │  │                           (trait)                               │   │
//! │  │                                                                 │   │
//! │  │   CatalogService ──► seller-keyed product CRUD                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                               │                                 │
//! │       ▼                               ▼                                 │
//! │  SQLite (vendo-db)            in-memory (tests, demos)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`purchase`] - The orchestrator: purchase, deposit, reset
//! - [`stock`] - Stock reservation trait + SQLite implementation
//! - [`ledger`] - Balance ledger trait + SQLite implementation
//! - [`memory`] - In-memory implementations of both seams
//! - [`catalog`] - Seller-facing catalogue management
//! - [`error`] - Component errors and the caller-facing taxonomy
//!
//! ## Known Limitation
//!
//! The stock decrement and the balance debit are two per-entity atomic
//! operations, not one cross-entity transaction. With the default
//! [`purchase::RecoveryPolicy::KeepReservation`], a purchase that fails at
//! the debit leaves the stock already decremented. See the module docs in
//! [`purchase`] for the reasoning and the compensating alternative.

pub mod catalog;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod purchase;
pub mod stock;

pub use catalog::CatalogService;
pub use error::{ErrorCode, LedgerError, StockError, VendError};
pub use ledger::{BalanceLedger, SqliteLedger};
pub use memory::{MemoryLedger, MemoryStock};
pub use purchase::{PurchaseEngine, RecoveryPolicy};
pub use stock::{Reservation, SqliteStock, StockReservation};
