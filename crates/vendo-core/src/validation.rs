//! # Validation Module
//!
//! Business rule validation for caller input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Surrounding service                                          │
//! │  ├── Request shape, authentication, role checks                        │
//! │  └── Rejects garbage before it reaches the engine                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (business rules)                                 │
//! │  ├── Cost must be a positive multiple of 5                             │
//! │  ├── Quantities positive, stock amounts non-negative                   │
//! │  └── Coins restricted to the accepted denominations                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── CHECK / NOT NULL constraints as the last line of defense          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Denomination;
use crate::MAX_PRODUCT_NAME_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most [`MAX_PRODUCT_NAME_LEN`] characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > MAX_PRODUCT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_PRODUCT_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a product cost in cents.
///
/// ## Rules
/// - Must be positive
/// - Must be a multiple of 5, otherwise a buyer could be owed change the
///   machine physically cannot pay out
pub fn validate_cost(cost_cents: i64) -> ValidationResult<()> {
    if cost_cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "cost".to_string(),
        });
    }

    if cost_cents % 5 != 0 {
        return Err(ValidationError::NotMultipleOfFive { cents: cost_cents });
    }

    Ok(())
}

/// Validates a purchase quantity.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a stock amount for product creation or update.
pub fn validate_stock_amount(amount: i64) -> ValidationResult<()> {
    if amount < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "amountAvailable".to_string(),
        });
    }

    Ok(())
}

/// Validates a deposited coin, returning its typed denomination.
///
/// Thin wrapper over [`Denomination::try_from`] so callers validating raw
/// input read the same way as the other validators here.
pub fn validate_coin(cents: i64) -> ValidationResult<Denomination> {
    Denomination::try_from(cents)
}

// =============================================================================
// Unit Tests
// =============================================================================
