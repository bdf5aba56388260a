//! # Account Repository
//!
//! Database operations for buyer balances.
//!
//! ## Balance Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Balance Lifecycle                                  │
//! │                                                                         │
//! │  insert()          → deposit_cents = 0                                 │
//! │  credit(20)        → deposit_cents += 20     (coin inserted)           │
//! │  credit(100)       → deposit_cents += 100                              │
//! │  debit_all(cost)   → deposit_cents = 0, returns balance - cost         │
//! │  reset()           → deposit_cents = 0       (coin return lever)       │
//! │                                                                         │
//! │  There is no partial decrement. A successful purchase always returns   │
//! │  the whole unspent remainder as change, so debit and reset share the   │
//! │  same "set to zero" update.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use vendo_core::BuyerAccount;

/// How many times the debit compare-and-swap re-reads before giving up.
///
/// A retry only happens when a concurrent credit lands between the read
/// and the guarded update, so in practice one attempt is enough.
const MAX_DEBIT_ATTEMPTS: u32 = 8;

/// Outcome of a debit attempt.
///
/// Like `ReserveOutcome`, these are expected domain conditions reported as
/// data; `DbError` stays reserved for storage failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebitOutcome {
    /// Balance covered the cost and was zeroed; the remainder is owed to
    /// the buyer as change.
    Debited { change_cents: i64 },
    /// No account row with that id.
    NotFound,
    /// Balance is short by this many cents. Nothing was mutated.
    Insufficient { shortfall: i64 },
}

/// Repository for buyer account operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    /// Creates a new AccountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AccountRepository { pool }
    }

    /// Inserts an account row.
    pub async fn insert(&self, account: &BuyerAccount) -> DbResult<()> {
        debug!(id = %account.id, "Inserting account");

        sqlx::query(
            r#"
            INSERT INTO accounts (id, deposit_cents, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&account.id)
        .bind(account.deposit_cents)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Creates a fresh account with a zero balance and returns it.
    pub async fn create(&self) -> DbResult<BuyerAccount> {
        let now = Utc::now();
        let account = BuyerAccount {
            id: generate_account_id(),
            deposit_cents: 0,
            created_at: now,
            updated_at: now,
        };
        self.insert(&account).await?;
        Ok(account)
    }

    /// Gets an account by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<BuyerAccount>> {
        let account = sqlx::query_as::<_, BuyerAccount>(
            r#"
            SELECT id, deposit_cents, created_at, updated_at
            FROM accounts
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Adds an amount to the deposited balance.
    ///
    /// The caller is responsible for only crediting valid coin values;
    /// this layer applies whatever increment it is given in one atomic
    /// UPDATE.
    pub async fn credit(&self, id: &str, amount_cents: i64) -> DbResult<()> {
        debug!(id = %id, amount = %amount_cents, "Crediting account");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET deposit_cents = deposit_cents + ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(amount_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Account", id));
        }

        Ok(())
    }

    /// Sets the deposited balance to zero unconditionally.
    ///
    /// Used for the buyer's coin-return lever and shared by the debit path
    /// as its terminal update.
    pub async fn reset(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Resetting account balance");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET deposit_cents = 0,
                updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Account", id));
        }

        Ok(())
    }

    /// Atomically charges `cost_cents` against the full balance.
    ///
    /// ## How It Works
    /// Compare-and-swap: read the balance, check sufficiency, then zero it
    /// with the observed value as a guard:
    ///
    /// ```sql
    /// UPDATE accounts SET deposit_cents = 0
    /// WHERE id = ? AND deposit_cents = ?observed
    /// ```
    ///
    /// If a concurrent credit changed the balance between read and write,
    /// zero rows match and the loop re-reads. A concurrent debit zeroes
    /// the balance first, and the re-read then reports the shortfall. A
    /// balance can therefore never be spent twice.
    ///
    /// ## Guarantees
    /// - Insufficient balance applies no mutation at all.
    /// - The zeroing is the same single UPDATE used by [`reset`](Self::reset);
    ///   no partially decremented balance is ever observable.
    pub async fn debit_all(&self, id: &str, cost_cents: i64) -> DbResult<DebitOutcome> {
        debug!(id = %id, cost = %cost_cents, "Debiting account");

        for _ in 0..MAX_DEBIT_ATTEMPTS {
            let balance: Option<i64> =
                sqlx::query_scalar("SELECT deposit_cents FROM accounts WHERE id = ?1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?;

            let Some(balance) = balance else {
                return Ok(DebitOutcome::NotFound);
            };

            let remainder = balance - cost_cents;
            if remainder < 0 {
                return Ok(DebitOutcome::Insufficient {
                    shortfall: -remainder,
                });
            }

            let now = Utc::now();
            let result = sqlx::query(
                r#"
                UPDATE accounts
                SET deposit_cents = 0,
                    updated_at = ?3
                WHERE id = ?1 AND deposit_cents = ?2
                "#,
            )
            .bind(id)
            .bind(balance)
            .bind(now)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 1 {
                debug!(id = %id, change = %remainder, "Account debited");
                return Ok(DebitOutcome::Debited {
                    change_cents: remainder,
                });
            }

            // Lost the race to a concurrent balance change; re-read.
        }

        Err(DbError::TransactionFailed(format!(
            "balance of account {} contended beyond retry budget",
            id
        )))
    }
}

/// Helper to generate a new account ID.
pub fn generate_account_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
