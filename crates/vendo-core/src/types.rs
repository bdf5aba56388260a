//! # Domain Types
//!
//! Core domain types used throughout Vendo.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  BuyerAccount   │   │ PurchaseReceipt │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  total_cost     │       │
//! │  │  seller_id      │   │  deposit_cents  │   │  product_name   │       │
//! │  │  name           │   │                 │   │  amount, change │       │
//! │  │  cost_cents     │   │  (persisted)    │   │  (ephemeral)    │       │
//! │  │  amount_avail.  │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Products and accounts are persisted rows; the receipt is created per
//! purchase and discarded after the response is handed to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{Denomination, Money};

// =============================================================================
// Product
// =============================================================================

/// A product slot in the vending machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// The seller who owns this product. Only this seller may update or
    /// delete the row. Opaque to this crate; identity lives elsewhere.
    pub seller_id: String,

    /// Display name shown on the receipt.
    pub name: String,

    /// Cost per unit in cents. Positive and a multiple of 5, so change
    /// is always payable in coins.
    pub cost_cents: i64,

    /// Units currently in the machine. Never negative.
    pub amount_available: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit cost as a Money type.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// Total cost of `quantity` units.
    #[inline]
    pub fn total_cost(&self, quantity: i64) -> Money {
        self.cost().multiply_quantity(quantity)
    }

    /// Checks whether `quantity` units can be dispensed right now.
    #[inline]
    pub fn in_stock(&self, quantity: i64) -> bool {
        self.amount_available >= quantity
    }
}

// =============================================================================
// Buyer Account
// =============================================================================

/// A buyer's deposited balance.
///
/// The balance only ever changes in two ways: a coin credit (one of the
/// accepted denominations) or a full zero-out (reset / debit). That keeps
/// it a sum of coin values at all times, which is what makes exact change
/// possible.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BuyerAccount {
    /// Unique identifier (UUID v4). Opaque to this crate.
    pub id: String,

    /// Deposited balance in cents. Never negative.
    pub deposit_cents: i64,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl BuyerAccount {
    /// Returns the deposited balance as Money.
    #[inline]
    pub fn deposit(&self) -> Money {
        Money::from_cents(self.deposit_cents)
    }
}

// =============================================================================
// Purchase Receipt
// =============================================================================

/// The result of a successful purchase.
///
/// Ephemeral: built per request, serialized to the caller, never stored.
///
/// ## Serialized Shape
/// ```json
/// {
///   "totalCost": 130,
///   "productName": "Sparkling Water",
///   "purchasedAmount": 2,
///   "change": [50, 5]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    /// Total amount charged, in cents.
    #[serde(rename = "totalCost")]
    pub total_cost_cents: i64,

    /// Product name at time of purchase.
    pub product_name: String,

    /// Units dispensed.
    pub purchased_amount: i64,

    /// Coins returned to the buyer, largest first.
    pub change: Vec<Denomination>,
}

impl PurchaseReceipt {
    /// Sum of the returned coins.
    pub fn change_total(&self) -> Money {
        self.change
            .iter()
            .fold(Money::zero(), |acc, coin| acc + coin.as_money())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(cost_cents: i64, amount_available: i64) -> Product {
        Product {
            id: "p-1".to_string(),
            seller_id: "s-1".to_string(),
            name: "Trail Mix".to_string(),
            cost_cents,
            amount_available,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_product_total_cost() {
        let p = product(65, 10);
        assert_eq!(p.cost().cents(), 65);
        assert_eq!(p.total_cost(3).cents(), 195);
    }

    #[test]
    fn test_product_in_stock() {
        let p = product(65, 2);
        assert!(p.in_stock(1));
        assert!(p.in_stock(2));
        assert!(!p.in_stock(3));
    }

    #[test]
    fn test_receipt_serialization_shape() {
        let receipt = PurchaseReceipt {
            total_cost_cents: 130,
            product_name: "Sparkling Water".to_string(),
            purchased_amount: 2,
            change: vec![Denomination::Fifty, Denomination::Five],
        };

        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["totalCost"], 130);
        assert_eq!(json["productName"], "Sparkling Water");
        assert_eq!(json["purchasedAmount"], 2);
        assert_eq!(json["change"], serde_json::json!([50, 5]));
    }

    #[test]
    fn test_receipt_change_total() {
        let receipt = PurchaseReceipt {
            total_cost_cents: 10,
            product_name: "Gum".to_string(),
            purchased_amount: 1,
            change: vec![Denomination::Twenty, Denomination::Ten, Denomination::Five],
        };
        assert_eq!(receipt.change_total().cents(), 35);
    }
}
