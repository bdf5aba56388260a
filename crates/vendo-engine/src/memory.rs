//! In-memory stock and ledger implementations.
//!
//! Used as test doubles for the orchestrator and as a storage-free backend
//! for demos. Atomicity is a lock held across the check and the mutation,
//! which gives the same observable guarantees as the conditional SQL
//! updates: no negative stock, no double-spent balance.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{LedgerError, StockError};
use crate::ledger::BalanceLedger;
use crate::stock::{Reservation, StockReservation};
use vendo_core::Denomination;

// =============================================================================
// In-memory Stock
// =============================================================================

#[derive(Debug, Clone)]
struct SlotState {
    name: String,
    cost_cents: i64,
    available: i64,
}

/// In-memory stock reservation component.
#[derive(Debug, Clone, Default)]
pub struct MemoryStock {
    slots: Arc<RwLock<HashMap<String, SlotState>>>,
}

impl MemoryStock {
    /// Creates an empty stock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a product slot.
    pub fn add_product(&self, id: &str, name: &str, cost_cents: i64, available: i64) {
        self.slots.write().unwrap().insert(
            id.to_string(),
            SlotState {
                name: name.to_string(),
                cost_cents,
                available,
            },
        );
    }

    /// Current availability of a slot, if it exists.
    pub fn available(&self, id: &str) -> Option<i64> {
        self.slots.read().unwrap().get(id).map(|s| s.available)
    }
}

#[async_trait]
impl StockReservation for MemoryStock {
    async fn reserve(&self, product_id: &str, quantity: i64) -> Result<Reservation, StockError> {
        let mut slots = self.slots.write().unwrap();

        let slot = slots
            .get_mut(product_id)
            .ok_or_else(|| StockError::NotFound(product_id.to_string()))?;

        if slot.available < quantity {
            return Err(StockError::Insufficient {
                available: slot.available,
            });
        }

        slot.available -= quantity;

        Ok(Reservation {
            total_cost_cents: slot.cost_cents * quantity,
            product_name: slot.name.clone(),
        })
    }

    async fn release(&self, product_id: &str, quantity: i64) -> Result<(), StockError> {
        let mut slots = self.slots.write().unwrap();

        let slot = slots
            .get_mut(product_id)
            .ok_or_else(|| StockError::NotFound(product_id.to_string()))?;

        slot.available += quantity;
        Ok(())
    }
}

// =============================================================================
// In-memory Ledger
// =============================================================================

/// In-memory balance ledger component.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    balances: Arc<RwLock<HashMap<String, i64>>>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an account with a zero balance.
    pub fn open_account(&self, buyer_id: &str) {
        self.balances
            .write()
            .unwrap()
            .entry(buyer_id.to_string())
            .or_insert(0);
    }

    /// Opens an account with a preset balance (test setup helper).
    pub fn open_account_with(&self, buyer_id: &str, balance_cents: i64) {
        self.balances
            .write()
            .unwrap()
            .insert(buyer_id.to_string(), balance_cents);
    }
}

#[async_trait]
impl BalanceLedger for MemoryLedger {
    async fn credit(&self, buyer_id: &str, coin: Denomination) -> Result<(), LedgerError> {
        let mut balances = self.balances.write().unwrap();

        let balance = balances
            .get_mut(buyer_id)
            .ok_or_else(|| LedgerError::AccountNotFound(buyer_id.to_string()))?;

        *balance += coin.cents();
        Ok(())
    }

    async fn debit(&self, buyer_id: &str, cost_cents: i64) -> Result<i64, LedgerError> {
        let mut balances = self.balances.write().unwrap();

        let balance = balances
            .get_mut(buyer_id)
            .ok_or_else(|| LedgerError::AccountNotFound(buyer_id.to_string()))?;

        let remainder = *balance - cost_cents;
        if remainder < 0 {
            return Err(LedgerError::Insufficient {
                shortfall: -remainder,
            });
        }

        *balance = 0;
        Ok(remainder)
    }

    async fn reset(&self, buyer_id: &str) -> Result<(), LedgerError> {
        let mut balances = self.balances.write().unwrap();

        let balance = balances
            .get_mut(buyer_id)
            .ok_or_else(|| LedgerError::AccountNotFound(buyer_id.to_string()))?;

        *balance = 0;
        Ok(())
    }

    async fn balance(&self, buyer_id: &str) -> Result<i64, LedgerError> {
        self.balances
            .read()
            .unwrap()
            .get(buyer_id)
            .copied()
            .ok_or_else(|| LedgerError::AccountNotFound(buyer_id.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_stock_reserve_and_release() {
        let stock = MemoryStock::new();
        stock.add_product("p-1", "Trail Mix", 145, 2);

        let reservation = stock.reserve("p-1", 2).await.unwrap();
        assert_eq!(reservation.total_cost_cents, 290);
        assert_eq!(reservation.product_name, "Trail Mix");
        assert_eq!(stock.available("p-1"), Some(0));

        stock.release("p-1", 2).await.unwrap();
        assert_eq!(stock.available("p-1"), Some(2));
    }

    #[tokio::test]
    async fn test_memory_stock_failures() {
        let stock = MemoryStock::new();
        stock.add_product("p-1", "Trail Mix", 145, 1);

        assert!(matches!(
            stock.reserve("ghost", 1).await.unwrap_err(),
            StockError::NotFound(_)
        ));
        assert!(matches!(
            stock.reserve("p-1", 2).await.unwrap_err(),
            StockError::Insufficient { available: 1 }
        ));
        // Failed attempts left the slot untouched
        assert_eq!(stock.available("p-1"), Some(1));
    }

    #[tokio::test]
    async fn test_memory_ledger_roundtrip() {
        let ledger = MemoryLedger::new();
        ledger.open_account("b-1");

        ledger.credit("b-1", Denomination::Hundred).await.unwrap();
        ledger.credit("b-1", Denomination::Ten).await.unwrap();
        assert_eq!(ledger.balance("b-1").await.unwrap(), 110);

        let change = ledger.debit("b-1", 95).await.unwrap();
        assert_eq!(change, 15);
        assert_eq!(ledger.balance("b-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_memory_ledger_insufficient() {
        let ledger = MemoryLedger::new();
        ledger.open_account_with("b-1", 30);

        assert!(matches!(
            ledger.debit("b-1", 50).await.unwrap_err(),
            LedgerError::Insufficient { shortfall: 20 }
        ));
        assert_eq!(ledger.balance("b-1").await.unwrap(), 30);
    }

    #[tokio::test]
    async fn test_memory_ledger_unknown_account() {
        let ledger = MemoryLedger::new();
        assert!(matches!(
            ledger.credit("ghost", Denomination::Five).await.unwrap_err(),
            LedgerError::AccountNotFound(_)
        ));
    }
}
