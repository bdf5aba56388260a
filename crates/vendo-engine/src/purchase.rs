//! # Purchase Orchestration
//!
//! The core transaction of the whole system: reserve stock, charge the
//! balance, pay out change.
//!
//! ## Purchase Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        purchase(buyer, product, qty)                    │
//! │                                                                         │
//! │  1. validate qty > 0                 ── bad input ──► BadRequest        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. stock.reserve(product, qty)      ── missing ────► NotFound          │
//! │       │   (conditional decrement)    ── too few ────► Forbidden         │
//! │       ▼                              (balance never touched)            │
//! │  3. ledger.debit(buyer, total)       ── too poor ───► Forbidden         │
//! │       │   (zero balance, get change)     │                              │
//! │       │                                  ▼                              │
//! │       │                           recovery policy:                      │
//! │       │                           keep or release the reservation       │
//! │       ▼                                                                 │
//! │  4. change_breakdown(remainder)  ──► PurchaseReceipt                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Gap Between Steps 2 and 3
//!
//! There is no cross-entity transaction spanning the stock decrement and
//! the balance debit. If the debit fails, the decrement has already
//! committed. This is a deliberate saga-style design, not an oversight:
//!
//! - [`RecoveryPolicy::KeepReservation`] (default) leaves the decrement
//!   in place and only logs it. Matches stores without multi-entity
//!   transactions, where a compensating write could itself fail.
//! - [`RecoveryPolicy::ReleaseStock`] runs the compensating action and
//!   puts the units back before reporting the failure.
//!
//! Either way the failure reported to the caller is the same; the policy
//! only decides what happens to the already-reserved units.

use tracing::{debug, info, warn};

use crate::error::{LedgerError, StockError, VendError};
use crate::ledger::{BalanceLedger, SqliteLedger};
use crate::stock::{SqliteStock, StockReservation};
use vendo_core::{change_breakdown, validation, Money, PurchaseReceipt};
use vendo_db::Database;

// =============================================================================
// Recovery Policy
// =============================================================================

/// What to do with an already-committed stock reservation when the
/// balance debit fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryPolicy {
    /// Leave the decrement in place (documented limitation; the default).
    #[default]
    KeepReservation,

    /// Run the compensating action and restore the reserved units.
    ReleaseStock,
}

// =============================================================================
// Purchase Engine
// =============================================================================

/// Orchestrates purchases, deposits and resets over a stock component and
/// a ledger component.
///
/// ## Usage
/// ```rust,ignore
/// let engine = PurchaseEngine::sqlite(&db, RecoveryPolicy::default());
///
/// engine.deposit(&buyer_id, 100).await?;
/// let receipt = engine.purchase(&buyer_id, &product_id, 1).await?;
/// ```
#[derive(Debug, Clone)]
pub struct PurchaseEngine<S, L> {
    stock: S,
    ledger: L,
    recovery: RecoveryPolicy,
}

impl PurchaseEngine<SqliteStock, SqliteLedger> {
    /// Wires an engine over the SQLite storage layer.
    pub fn sqlite(db: &Database, recovery: RecoveryPolicy) -> Self {
        PurchaseEngine::with_recovery(SqliteStock::new(db), SqliteLedger::new(db), recovery)
    }
}

impl<S, L> PurchaseEngine<S, L>
where
    S: StockReservation,
    L: BalanceLedger,
{
    /// Creates an engine with the default recovery policy.
    pub fn new(stock: S, ledger: L) -> Self {
        Self::with_recovery(stock, ledger, RecoveryPolicy::default())
    }

    /// Creates an engine with an explicit recovery policy.
    pub fn with_recovery(stock: S, ledger: L, recovery: RecoveryPolicy) -> Self {
        PurchaseEngine {
            stock,
            ledger,
            recovery,
        }
    }

    /// Buys `quantity` units of a product for a buyer.
    ///
    /// Not idempotent: every call is a fresh attempt that reserves stock
    /// and debits the balance again. Callers needing request deduplication
    /// must handle it above this layer.
    pub async fn purchase(
        &self,
        buyer_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> Result<PurchaseReceipt, VendError> {
        debug!(buyer_id = %buyer_id, product_id = %product_id, quantity = %quantity, "purchase requested");

        validation::validate_quantity(quantity)?;

        // Step 1: reserve stock. On failure the ledger is never touched.
        let reservation = match self.stock.reserve(product_id, quantity).await {
            Ok(r) => r,
            Err(StockError::NotFound(_)) => {
                return Err(VendError::NotFound(format!(
                    "Cannot find product with id {}",
                    product_id
                )));
            }
            Err(StockError::Insufficient { available }) => {
                return Err(VendError::Forbidden(format!(
                    "The requested amount of the product is not available. \
                     You requested {} while there are only {} available.",
                    quantity, available
                )));
            }
            Err(StockError::Storage(e)) => return Err(VendError::Internal(e.to_string())),
        };

        // Step 2: debit the whole balance against the total cost.
        let change_cents = match self
            .ledger
            .debit(buyer_id, reservation.total_cost_cents)
            .await
        {
            Ok(change) => change,
            Err(err) => {
                self.recover_reservation(product_id, quantity).await;
                return Err(match err {
                    LedgerError::Insufficient { shortfall } => VendError::Forbidden(format!(
                        "Deposited amount is insufficient to buy the selected products. \
                         Please deposit {} more cents.",
                        shortfall
                    )),
                    LedgerError::AccountNotFound(_) => VendError::NotFound(format!(
                        "Cannot find account with id {}",
                        buyer_id
                    )),
                    LedgerError::Storage(e) => VendError::Internal(e.to_string()),
                });
            }
        };

        // Step 3: render the remainder as coins. A failure here means a
        // stored amount broke the multiple-of-5 invariant; surfaced, not
        // truncated.
        let change = change_breakdown(Money::from_cents(change_cents))?;

        info!(
            buyer_id = %buyer_id,
            product_id = %product_id,
            quantity = %quantity,
            total_cost = %Money::from_cents(reservation.total_cost_cents),
            change = %Money::from_cents(change_cents),
            "purchase completed"
        );

        Ok(PurchaseReceipt {
            total_cost_cents: reservation.total_cost_cents,
            product_name: reservation.product_name,
            purchased_amount: quantity,
            change,
        })
    }

    /// Deposits a single coin into the buyer's balance.
    ///
    /// The raw coin value is validated against the accepted denominations
    /// before anything touches storage.
    pub async fn deposit(&self, buyer_id: &str, coin_cents: i64) -> Result<(), VendError> {
        let coin = validation::validate_coin(coin_cents)?;

        match self.ledger.credit(buyer_id, coin).await {
            Ok(()) => {
                debug!(buyer_id = %buyer_id, coin = %coin, "coin deposited");
                Ok(())
            }
            Err(LedgerError::AccountNotFound(_)) => Err(VendError::NotFound(format!(
                "Cannot find account with id {}",
                buyer_id
            ))),
            Err(e) => Err(VendError::Internal(e.to_string())),
        }
    }

    /// Returns the buyer's balance to zero (the coin-return lever).
    pub async fn reset(&self, buyer_id: &str) -> Result<(), VendError> {
        match self.ledger.reset(buyer_id).await {
            Ok(()) => {
                debug!(buyer_id = %buyer_id, "balance reset");
                Ok(())
            }
            Err(LedgerError::AccountNotFound(_)) => Err(VendError::NotFound(format!(
                "Cannot find account with id {}",
                buyer_id
            ))),
            Err(e) => Err(VendError::Internal(e.to_string())),
        }
    }

    /// Applies the recovery policy after a failed debit.
    ///
    /// A failed compensation is logged and swallowed: the buyer-facing
    /// error is the debit failure either way, and retrying the release
    /// is an operational concern, not a request-scoped one.
    async fn recover_reservation(&self, product_id: &str, quantity: i64) {
        match self.recovery {
            RecoveryPolicy::KeepReservation => {
                warn!(
                    product_id = %product_id,
                    quantity = %quantity,
                    "debit failed after stock was reserved; reservation kept (no rollback)"
                );
            }
            RecoveryPolicy::ReleaseStock => match self.stock.release(product_id, quantity).await {
                Ok(()) => {
                    info!(
                        product_id = %product_id,
                        quantity = %quantity,
                        "debit failed; reservation released"
                    );
                }
                Err(e) => {
                    warn!(
                        product_id = %product_id,
                        quantity = %quantity,
                        error = %e,
                        "failed to release reservation after debit failure"
                    );
                }
            },
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::memory::{MemoryLedger, MemoryStock};
    use std::sync::Arc;
    use vendo_core::Denomination;
    use vendo_db::DbConfig;

    fn engine_with(
        recovery: RecoveryPolicy,
    ) -> (PurchaseEngine<MemoryStock, MemoryLedger>, MemoryStock, MemoryLedger) {
        let stock = MemoryStock::new();
        let ledger = MemoryLedger::new();
        let engine = PurchaseEngine::with_recovery(stock.clone(), ledger.clone(), recovery);
        (engine, stock, ledger)
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found_and_balance_untouched() {
        let (engine, _stock, ledger) = engine_with(RecoveryPolicy::default());
        ledger.open_account_with("buyer", 100);

        let err = engine.purchase("buyer", "ghost", 1).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert!(err.to_string().contains("ghost"));

        assert_eq!(ledger.balance("buyer").await.unwrap(), 100);
    }

    #[tokio::test]
    async fn test_insufficient_stock_is_forbidden_with_counts() {
        let (engine, stock, ledger) = engine_with(RecoveryPolicy::default());
        stock.add_product("water", "Sparkling Water", 65, 1);
        ledger.open_account_with("buyer", 500);

        let err = engine.purchase("buyer", "water", 2).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);
        let msg = err.to_string();
        assert!(msg.contains("requested 2"));
        assert!(msg.contains("only 1 available"));

        // Neither entity was mutated
        assert_eq!(stock.available("water"), Some(1));
        assert_eq!(ledger.balance("buyer").await.unwrap(), 500);
    }

    #[tokio::test]
    async fn test_exact_balance_purchase_gives_empty_change() {
        let (engine, stock, ledger) = engine_with(RecoveryPolicy::default());
        stock.add_product("gum", "Chewing Gum", 10, 5);
        ledger.open_account_with("buyer", 10);

        let receipt = engine.purchase("buyer", "gum", 1).await.unwrap();

        assert_eq!(receipt.total_cost_cents, 10);
        assert_eq!(receipt.product_name, "Chewing Gum");
        assert_eq!(receipt.purchased_amount, 1);
        assert!(receipt.change.is_empty());

        assert_eq!(ledger.balance("buyer").await.unwrap(), 0);
        assert_eq!(stock.available("gum"), Some(4));
    }

    #[tokio::test]
    async fn test_change_is_minimal_coins_largest_first() {
        let (engine, stock, ledger) = engine_with(RecoveryPolicy::default());
        stock.add_product("gum", "Chewing Gum", 10, 5);
        ledger.open_account_with("buyer", 195);

        let receipt = engine.purchase("buyer", "gum", 1).await.unwrap();

        assert_eq!(
            receipt.change,
            vec![
                Denomination::Hundred,
                Denomination::Fifty,
                Denomination::Twenty,
                Denomination::Ten,
                Denomination::Five,
            ]
        );
        assert_eq!(receipt.change_total().cents(), 185);
    }

    #[tokio::test]
    async fn test_multi_unit_purchase_totals_cost() {
        let (engine, stock, ledger) = engine_with(RecoveryPolicy::default());
        stock.add_product("soda", "Orange Soda", 95, 10);
        ledger.open_account_with("buyer", 300);

        let receipt = engine.purchase("buyer", "soda", 3).await.unwrap();

        assert_eq!(receipt.total_cost_cents, 285);
        assert_eq!(receipt.purchased_amount, 3);
        assert_eq!(receipt.change, vec![Denomination::Ten, Denomination::Five]);
        assert_eq!(stock.available("soda"), Some(7));
    }

    #[tokio::test]
    async fn test_insufficient_balance_keeps_reservation_by_default() {
        let (engine, stock, ledger) = engine_with(RecoveryPolicy::KeepReservation);
        stock.add_product("gum", "Chewing Gum", 10, 5);
        ledger.open_account_with("buyer", 8);

        let err = engine.purchase("buyer", "gum", 1).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert!(err.to_string().contains("deposit 2 more cents"));

        // Balance untouched by the failed debit
        assert_eq!(ledger.balance("buyer").await.unwrap(), 8);
        // The reservation already committed and is deliberately kept
        assert_eq!(stock.available("gum"), Some(4));
    }

    #[tokio::test]
    async fn test_insufficient_balance_releases_stock_when_configured() {
        let (engine, stock, ledger) = engine_with(RecoveryPolicy::ReleaseStock);
        stock.add_product("gum", "Chewing Gum", 10, 5);
        ledger.open_account_with("buyer", 8);

        let err = engine.purchase("buyer", "gum", 1).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);

        assert_eq!(ledger.balance("buyer").await.unwrap(), 8);
        // Compensation put the unit back
        assert_eq!(stock.available("gum"), Some(5));
    }

    #[tokio::test]
    async fn test_unknown_buyer_is_not_found() {
        let (engine, stock, _ledger) = engine_with(RecoveryPolicy::ReleaseStock);
        stock.add_product("gum", "Chewing Gum", 10, 5);

        let err = engine.purchase("ghost", "gum", 1).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert!(err.to_string().contains("account"));

        // Compensation applies to account failures too
        assert_eq!(stock.available("gum"), Some(5));
    }

    #[tokio::test]
    async fn test_non_positive_quantity_is_bad_request() {
        let (engine, stock, ledger) = engine_with(RecoveryPolicy::default());
        stock.add_product("gum", "Chewing Gum", 10, 5);
        ledger.open_account_with("buyer", 100);

        for quantity in [0, -3] {
            let err = engine.purchase("buyer", "gum", quantity).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::BadRequest);
        }

        // Rejected before any component ran
        assert_eq!(stock.available("gum"), Some(5));
        assert_eq!(ledger.balance("buyer").await.unwrap(), 100);
    }

    #[tokio::test]
    async fn test_deposit_accepts_only_denominations() {
        let (engine, _stock, ledger) = engine_with(RecoveryPolicy::default());
        ledger.open_account("buyer");

        engine.deposit("buyer", 100).await.unwrap();
        engine.deposit("buyer", 20).await.unwrap();
        assert_eq!(ledger.balance("buyer").await.unwrap(), 120);

        for bad_coin in [1, 7, 25, 200, 0, -5] {
            let err = engine.deposit("buyer", bad_coin).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::BadRequest);
        }
        assert_eq!(ledger.balance("buyer").await.unwrap(), 120);
    }

    #[tokio::test]
    async fn test_deposit_unknown_buyer() {
        let (engine, _stock, _ledger) = engine_with(RecoveryPolicy::default());
        let err = engine.deposit("ghost", 5).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_reset_zeroes_balance() {
        let (engine, _stock, ledger) = engine_with(RecoveryPolicy::default());
        ledger.open_account_with("buyer", 135);

        engine.reset("buyer").await.unwrap();
        assert_eq!(ledger.balance("buyer").await.unwrap(), 0);

        let err = engine.reset("ghost").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_repeated_purchase_is_not_idempotent() {
        let (engine, stock, ledger) = engine_with(RecoveryPolicy::default());
        stock.add_product("gum", "Chewing Gum", 10, 5);
        ledger.open_account_with("buyer", 20);

        engine.purchase("buyer", "gum", 1).await.unwrap();
        // The first purchase returned the remainder as change, so an
        // identical retry runs against an empty balance.
        let err = engine.purchase("buyer", "gum", 1).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(stock.available("gum"), Some(3));
    }

    #[tokio::test]
    async fn test_concurrent_purchases_of_last_unit() {
        let (engine, stock, ledger) = engine_with(RecoveryPolicy::default());
        stock.add_product("bar", "Protein Bar", 185, 1);
        ledger.open_account_with("alice", 200);
        ledger.open_account_with("bob", 200);

        let engine = Arc::new(engine);

        let (a, b) = tokio::join!(
            {
                let engine = Arc::clone(&engine);
                async move { engine.purchase("alice", "bar", 1).await }
            },
            {
                let engine = Arc::clone(&engine);
                async move { engine.purchase("bob", "bar", 1).await }
            }
        );

        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);

        let loser = if a.is_err() { a } else { b };
        let err = loser.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert!(err.to_string().contains("only 0 available"));

        assert_eq!(stock.available("bar"), Some(0));
    }

    /// Same happy path and documented gap, wired over real SQLite storage.
    #[tokio::test]
    async fn test_sqlite_end_to_end() {
        use chrono::Utc;
        use vendo_core::Product;

        let db = vendo_db::Database::new(DbConfig::in_memory()).await.unwrap();

        let now = Utc::now();
        let product = Product {
            id: "espresso".to_string(),
            seller_id: "seller-1".to_string(),
            name: "Espresso Shot".to_string(),
            cost_cents: 85,
            amount_available: 2,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        let buyer = db.accounts().create().await.unwrap();

        let engine = PurchaseEngine::sqlite(&db, RecoveryPolicy::KeepReservation);

        engine.deposit(&buyer.id, 100).await.unwrap();
        let receipt = engine.purchase(&buyer.id, "espresso", 1).await.unwrap();

        assert_eq!(receipt.total_cost_cents, 85);
        assert_eq!(receipt.product_name, "Espresso Shot");
        assert_eq!(receipt.change, vec![Denomination::Ten, Denomination::Five]);

        // Balance zeroed, stock decremented
        let account = db.accounts().get_by_id(&buyer.id).await.unwrap().unwrap();
        assert_eq!(account.deposit_cents, 0);
        let left = db.products().get_by_id("espresso").await.unwrap().unwrap();
        assert_eq!(left.amount_available, 1);

        // Documented gap: a failed debit leaves the decrement in place
        engine.deposit(&buyer.id, 50).await.unwrap();
        let err = engine.purchase(&buyer.id, "espresso", 1).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert!(err.to_string().contains("deposit 35 more cents"));

        let left = db.products().get_by_id("espresso").await.unwrap().unwrap();
        assert_eq!(left.amount_available, 0);
        let account = db.accounts().get_by_id(&buyer.id).await.unwrap().unwrap();
        assert_eq!(account.deposit_cents, 50);
    }
}
