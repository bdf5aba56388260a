//! # Repository Module
//!
//! Database repository implementations for Vendo.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  vendo-engine                                                          │
//! │       │                                                                 │
//! │       │  db.products().reserve_stock(id, 2)                            │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── insert(&self, product)                                            │
//! │  ├── reserve_stock(&self, id, quantity)                                │
//! │  └── ...                                                                │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • SQL is isolated in one place                                        │
//! │  • Atomicity decisions live next to the statements that provide them   │
//! │  • Easy to test against an in-memory database                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalogue CRUD and stock reservation
//! - [`account::AccountRepository`] - Buyer balances: credit, reset, debit

pub mod account;
pub mod product;
