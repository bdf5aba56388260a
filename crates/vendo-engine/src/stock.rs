//! # Stock Reservation
//!
//! The stock side of a purchase: atomically verify and decrement a
//! product's availability, returning the pricing data the orchestrator
//! needs for the receipt.
//!
//! The trait exists so the orchestrator can run against any store that
//! offers an atomic conditional decrement. [`SqliteStock`] backs it with
//! the conditional UPDATE in vendo-db; the in-memory implementation lives
//! in [`crate::memory`].

use async_trait::async_trait;
use tracing::debug;

use crate::error::StockError;
use vendo_db::{Database, ProductRepository, ReserveOutcome};

/// Result of a successful stock reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    /// Unit cost times quantity, in cents.
    pub total_cost_cents: i64,

    /// Product name at reservation time, for the receipt.
    pub product_name: String,
}

/// Trait for atomic stock reservation.
///
/// ## Contract
/// - `reserve` either decrements availability by exactly `quantity` and
///   returns pricing, or fails with no side effect at all.
/// - The sufficiency check and the decrement are evaluated against the
///   same observed state; two racing reservations can never both succeed
///   past what is available.
/// - `release` is the compensating action: it puts `quantity` units back
///   after a reservation whose purchase could not complete.
#[async_trait]
pub trait StockReservation: Send + Sync {
    /// Reserves `quantity` units of the product.
    async fn reserve(&self, product_id: &str, quantity: i64) -> Result<Reservation, StockError>;

    /// Returns `quantity` previously reserved units to stock.
    async fn release(&self, product_id: &str, quantity: i64) -> Result<(), StockError>;
}

// =============================================================================
// SQLite-backed Implementation
// =============================================================================

/// Stock reservation backed by the SQLite product repository.
///
/// Atomicity comes from the repository's single conditional UPDATE; this
/// type only maps storage outcomes onto component errors.
#[derive(Debug, Clone)]
pub struct SqliteStock {
    products: ProductRepository,
}

impl SqliteStock {
    /// Creates a stock component over the given database.
    pub fn new(db: &Database) -> Self {
        SqliteStock {
            products: db.products(),
        }
    }
}

#[async_trait]
impl StockReservation for SqliteStock {
    async fn reserve(&self, product_id: &str, quantity: i64) -> Result<Reservation, StockError> {
        debug!(product_id = %product_id, quantity = %quantity, "reserve");

        match self.products.reserve_stock(product_id, quantity).await? {
            ReserveOutcome::Reserved {
                total_cost_cents,
                product_name,
            } => Ok(Reservation {
                total_cost_cents,
                product_name,
            }),
            ReserveOutcome::NotFound => Err(StockError::NotFound(product_id.to_string())),
            ReserveOutcome::Insufficient { available } => {
                Err(StockError::Insufficient { available })
            }
        }
    }

    async fn release(&self, product_id: &str, quantity: i64) -> Result<(), StockError> {
        debug!(product_id = %product_id, quantity = %quantity, "release");

        self.products
            .restore_stock(product_id, quantity)
            .await
            .map_err(StockError::from)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;
    use vendo_core::Product;
    use vendo_db::DbConfig;

    async fn db_with_product(cost_cents: i64, amount: i64) -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        let product = Product {
            id: "prod-1".to_string(),
            seller_id: "seller-1".to_string(),
            name: "Cola Classic".to_string(),
            cost_cents,
            amount_available: amount,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        (db, product.id)
    }

    #[tokio::test]
    async fn test_reserve_returns_pricing() {
        let (db, id) = db_with_product(100, 5).await;
        let stock = SqliteStock::new(&db);

        let reservation = stock.reserve(&id, 2).await.unwrap();
        assert_eq!(reservation.total_cost_cents, 200);
        assert_eq!(reservation.product_name, "Cola Classic");

        let left = db.products().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(left.amount_available, 3);
    }

    #[tokio::test]
    async fn test_reserve_unknown_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let stock = SqliteStock::new(&db);

        let err = stock.reserve("ghost", 1).await.unwrap_err();
        assert!(matches!(err, StockError::NotFound(id) if id == "ghost"));
    }

    #[tokio::test]
    async fn test_reserve_insufficient_has_no_side_effect() {
        let (db, id) = db_with_product(100, 1).await;
        let stock = SqliteStock::new(&db);

        let err = stock.reserve(&id, 2).await.unwrap_err();
        assert!(matches!(err, StockError::Insufficient { available: 1 }));

        let left = db.products().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(left.amount_available, 1);
    }

    #[tokio::test]
    async fn test_concurrent_reservations_only_one_wins() {
        let (db, id) = db_with_product(100, 1).await;
        let stock = Arc::new(SqliteStock::new(&db));

        let (a, b) = tokio::join!(
            {
                let stock = Arc::clone(&stock);
                let id = id.clone();
                async move { stock.reserve(&id, 1).await }
            },
            {
                let stock = Arc::clone(&stock);
                let id = id.clone();
                async move { stock.reserve(&id, 1).await }
            }
        );

        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);

        let loser = if a.is_err() { a } else { b };
        assert!(matches!(
            loser.unwrap_err(),
            StockError::Insufficient { available: 0 }
        ));

        let left = db.products().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(left.amount_available, 0);
    }

    #[tokio::test]
    async fn test_release_restores_units() {
        let (db, id) = db_with_product(100, 2).await;
        let stock = SqliteStock::new(&db);

        stock.reserve(&id, 2).await.unwrap();
        stock.release(&id, 2).await.unwrap();

        let left = db.products().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(left.amount_available, 2);
    }
}
