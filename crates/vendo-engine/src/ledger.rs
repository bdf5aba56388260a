//! # Balance Ledger
//!
//! The money side of a purchase: coin credits, the coin-return reset, and
//! the atomic debit that zeroes a balance in exchange for change.
//!
//! [`SqliteLedger`] backs the trait with the account repository's
//! compare-and-swap updates; the in-memory implementation lives in
//! [`crate::memory`].

use async_trait::async_trait;
use tracing::debug;

use crate::error::LedgerError;
use vendo_core::Denomination;
use vendo_db::{AccountRepository, Database, DbError, DebitOutcome};

/// Trait for atomic balance operations.
///
/// ## Contract
/// - `credit` only ever adds one of the accepted coin denominations, so a
///   balance stays a sum of coins at all times. Enforced by the type: the
///   parameter is [`Denomination`], not a raw amount.
/// - `debit` either zeroes the balance and returns the pre-debit
///   remainder, or fails with no mutation. The zeroing is the same atomic
///   update `reset` uses; no intermediate balance is observable.
/// - `reset` zeroes unconditionally (the coin-return lever).
#[async_trait]
pub trait BalanceLedger: Send + Sync {
    /// Adds a coin to the buyer's balance.
    async fn credit(&self, buyer_id: &str, coin: Denomination) -> Result<(), LedgerError>;

    /// Charges `cost_cents` against the whole balance; returns the change
    /// amount in cents.
    async fn debit(&self, buyer_id: &str, cost_cents: i64) -> Result<i64, LedgerError>;

    /// Returns the balance to zero.
    async fn reset(&self, buyer_id: &str) -> Result<(), LedgerError>;

    /// Reads the current balance in cents.
    async fn balance(&self, buyer_id: &str) -> Result<i64, LedgerError>;
}

// =============================================================================
// SQLite-backed Implementation
// =============================================================================

/// Balance ledger backed by the SQLite account repository.
#[derive(Debug, Clone)]
pub struct SqliteLedger {
    accounts: AccountRepository,
}

impl SqliteLedger {
    /// Creates a ledger component over the given database.
    pub fn new(db: &Database) -> Self {
        SqliteLedger {
            accounts: db.accounts(),
        }
    }

    fn map_not_found(buyer_id: &str, err: DbError) -> LedgerError {
        match err {
            DbError::NotFound { .. } => LedgerError::AccountNotFound(buyer_id.to_string()),
            other => LedgerError::Storage(other),
        }
    }
}

#[async_trait]
impl BalanceLedger for SqliteLedger {
    async fn credit(&self, buyer_id: &str, coin: Denomination) -> Result<(), LedgerError> {
        debug!(buyer_id = %buyer_id, coin = %coin, "credit");

        self.accounts
            .credit(buyer_id, coin.cents())
            .await
            .map_err(|e| Self::map_not_found(buyer_id, e))
    }

    async fn debit(&self, buyer_id: &str, cost_cents: i64) -> Result<i64, LedgerError> {
        debug!(buyer_id = %buyer_id, cost = %cost_cents, "debit");

        match self.accounts.debit_all(buyer_id, cost_cents).await? {
            DebitOutcome::Debited { change_cents } => Ok(change_cents),
            DebitOutcome::NotFound => Err(LedgerError::AccountNotFound(buyer_id.to_string())),
            DebitOutcome::Insufficient { shortfall } => {
                Err(LedgerError::Insufficient { shortfall })
            }
        }
    }

    async fn reset(&self, buyer_id: &str) -> Result<(), LedgerError> {
        debug!(buyer_id = %buyer_id, "reset");

        self.accounts
            .reset(buyer_id)
            .await
            .map_err(|e| Self::map_not_found(buyer_id, e))
    }

    async fn balance(&self, buyer_id: &str) -> Result<i64, LedgerError> {
        let account = self
            .accounts
            .get_by_id(buyer_id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(buyer_id.to_string()))?;

        Ok(account.deposit_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
