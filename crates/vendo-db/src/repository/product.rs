//! # Product Repository
//!
//! Database operations for the vending machine catalogue.
//!
//! ## The Reservation Primitive
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Conditional Stock Decrement                             │
//! │                                                                         │
//! │  ❌ WRONG: read stock, check in Rust, write new value                  │
//! │     Two concurrent buyers both read available=1, both write 0,         │
//! │     both walk away with the last item.                                 │
//! │                                                                         │
//! │  ✅ CORRECT: one conditional UPDATE                                    │
//! │     UPDATE products                                                    │
//! │        SET amount_available = amount_available - ?qty                  │
//! │      WHERE id = ? AND amount_available >= ?qty                         │
//! │                                                                         │
//! │  SQLite serializes writers, so exactly one of two concurrent           │
//! │  reservations matches the WHERE clause when only one unit is left.    │
//! │  The loser sees zero rows affected and no side effect at all.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use vendo_core::Product;

/// Outcome of a stock reservation attempt.
///
/// These are expected domain conditions, not storage failures, so they are
/// data rather than `DbError` variants. The engine decides what each one
/// means to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// Stock was decremented; pricing data for the receipt.
    Reserved {
        total_cost_cents: i64,
        product_name: String,
    },
    /// No product row with that id.
    NotFound,
    /// Product exists but has fewer units than requested.
    Insufficient { available: i64 },
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, seller_id, name, cost_cents, amount_available, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists the whole catalogue, sorted by name.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, seller_id, name, cost_cents, amount_available, created_at, updated_at
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(())` - Inserted
    /// * `Err(DbError::UniqueViolation)` - ID already exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, seller_id, name, cost_cents, amount_available, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.seller_id)
        .bind(&product.name)
        .bind(product.cost_cents)
        .bind(product.amount_available)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a product, but only for its owning seller.
    ///
    /// The seller check is part of the WHERE clause rather than a separate
    /// read, so a non-owner cannot race an owner update. A non-owner and a
    /// missing product are indistinguishable on purpose: both affect zero
    /// rows and report NotFound, which avoids leaking catalogue ownership.
    pub async fn update_owned(
        &self,
        product_id: &str,
        seller_id: &str,
        name: &str,
        cost_cents: i64,
        amount_available: i64,
    ) -> DbResult<()> {
        debug!(id = %product_id, seller_id = %seller_id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?3,
                cost_cents = ?4,
                amount_available = ?5,
                updated_at = ?6
            WHERE id = ?1 AND seller_id = ?2
            "#,
        )
        .bind(product_id)
        .bind(seller_id)
        .bind(name)
        .bind(cost_cents)
        .bind(amount_available)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id));
        }

        Ok(())
    }

    /// Deletes a product, but only for its owning seller.
    pub async fn delete_owned(&self, product_id: &str, seller_id: &str) -> DbResult<()> {
        debug!(id = %product_id, seller_id = %seller_id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1 AND seller_id = ?2")
            .bind(product_id)
            .bind(seller_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id));
        }

        Ok(())
    }

    /// Atomically reserves `quantity` units of a product.
    ///
    /// ## How It Works
    /// One conditional UPDATE checks availability and decrements in the
    /// same statement, returning the pricing columns via RETURNING. If no
    /// row matched, a follow-up read distinguishes "product missing" from
    /// "not enough stock" and fetches the availability for the caller's
    /// error message.
    ///
    /// ## Guarantees
    /// - A failed reservation leaves stock untouched.
    /// - Stock never goes negative, no matter how many reservations race.
    ///
    /// The availability reported in [`ReserveOutcome::Insufficient`] comes
    /// from a second read and is informational; by the time the caller
    /// formats a message it may already be stale. The decrement itself is
    /// never based on it.
    pub async fn reserve_stock(&self, product_id: &str, quantity: i64) -> DbResult<ReserveOutcome> {
        debug!(id = %product_id, quantity = %quantity, "Reserving stock");

        let now = Utc::now();

        let row = sqlx::query_as::<_, (String, i64)>(
            r#"
            UPDATE products
            SET amount_available = amount_available - ?2,
                updated_at = ?3
            WHERE id = ?1 AND amount_available >= ?2
            RETURNING name, cost_cents
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        if let Some((name, cost_cents)) = row {
            debug!(id = %product_id, quantity = %quantity, "Stock reserved");
            return Ok(ReserveOutcome::Reserved {
                total_cost_cents: cost_cents * quantity,
                product_name: name,
            });
        }

        // Zero rows matched: either the product does not exist or it has
        // fewer units than requested.
        let available: Option<i64> =
            sqlx::query_scalar("SELECT amount_available FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&self.pool)
                .await?;

        match available {
            Some(available) => Ok(ReserveOutcome::Insufficient { available }),
            None => Ok(ReserveOutcome::NotFound),
        }
    }

    /// Returns previously reserved units to stock.
    ///
    /// Compensation counterpart of [`reserve_stock`](Self::reserve_stock),
    /// used when a later purchase step fails and the engine is configured
    /// to roll the reservation back.
    pub async fn restore_stock(&self, product_id: &str, quantity: i64) -> DbResult<()> {
        debug!(id = %product_id, quantity = %quantity, "Restoring stock");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET amount_available = amount_available + ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id));
        }

        Ok(())
    }

    /// Counts products (for diagnostics and the seed tool).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
