//! # Money Module
//!
//! Provides the `Money` type, the fixed coin `Denomination` set, and the
//! greedy change calculation.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every amount in the system is an i64 number of cents.                │
//! │    A machine that owes you 15 cents owes you exactly 15, not 14.999.   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Coin System
//! The machine accepts exactly five coins: 5, 10, 20, 50 and 100 cents.
//! Each denomination is a multiple of the next smaller one, which is what
//! makes the greedy change algorithm below provably optimal. That property
//! does NOT hold for arbitrary coin sets (try {1, 3, 4} and amount 6), so
//! the denomination list must never be extended without revisiting
//! [`change_breakdown`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::error::{CoreError, ValidationError};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative intermediate values (shortfalls)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use vendo_core::money::Money;
    ///
    /// let cost = Money::from_cents(125); // $1.25
    /// assert_eq!(cost.cents(), 125);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Checks whether the amount can be paid out with the machine's coins.
    ///
    /// Every denomination is a multiple of 5, so an amount is representable
    /// exactly when it is a non-negative multiple of 5.
    #[inline]
    pub const fn is_coin_representable(&self) -> bool {
        self.0 >= 0 && self.0 % 5 == 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use vendo_core::money::Money;
    ///
    /// let unit_cost = Money::from_cents(65);
    /// let total = unit_cost.multiply_quantity(3);
    /// assert_eq!(total.cents(), 195);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Money Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. Presentation formatting belongs to the
/// surrounding service.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Denominations
// =============================================================================

/// A coin the machine accepts.
///
/// The set is fixed: 5, 10, 20, 50 and 100 cent coins. Anything else is
/// rejected at the boundary via [`Denomination::try_from`].
///
/// ## Serialization
/// A denomination serializes as its plain coin value, so a change sequence
/// renders as `[100, 50, 20, 10, 5]` rather than `["Hundred", ...]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Denomination {
    Five = 5,
    Ten = 10,
    Twenty = 20,
    Fifty = 50,
    Hundred = 100,
}

impl Denomination {
    /// All denominations, largest first.
    ///
    /// The descending order is what the greedy change loop walks.
    pub const DESCENDING: [Denomination; 5] = [
        Denomination::Hundred,
        Denomination::Fifty,
        Denomination::Twenty,
        Denomination::Ten,
        Denomination::Five,
    ];

    /// Returns the coin value in cents.
    #[inline]
    pub const fn cents(self) -> i64 {
        self as i64
    }

    /// Returns the coin value as Money.
    #[inline]
    pub const fn as_money(self) -> Money {
        Money::from_cents(self.cents())
    }
}

impl From<Denomination> for i64 {
    fn from(coin: Denomination) -> Self {
        coin.cents()
    }
}

impl TryFrom<i64> for Denomination {
    type Error = ValidationError;

    fn try_from(cents: i64) -> Result<Self, Self::Error> {
        match cents {
            5 => Ok(Denomination::Five),
            10 => Ok(Denomination::Ten),
            20 => Ok(Denomination::Twenty),
            50 => Ok(Denomination::Fifty),
            100 => Ok(Denomination::Hundred),
            _ => Err(ValidationError::NotADenomination { cents }),
        }
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}c", self.cents())
    }
}

// =============================================================================
// Change Calculation
// =============================================================================

/// Decomposes an amount into the minimal sequence of coins, largest first.
///
/// ## Algorithm
/// Greedy: repeatedly subtract the largest denomination that still fits.
/// The set {5, 10, 20, 50, 100} is a canonical coin system (like Euro
/// coinage), so the greedy pick is always part of an optimal solution.
/// This does NOT hold for arbitrary coin sets; the tests verify
/// minimality exhaustively for all amounts up to 1000 rather than
/// assuming it.
///
/// ## Edge Cases
/// - `0` produces an empty sequence (nothing to give back).
/// - An amount that is not a non-negative multiple of 5 is an invariant
///   violation upstream (balances are sums of coins, costs are multiples
///   of 5). It returns [`CoreError::UnrepresentableChange`] instead of
///   silently keeping the remainder.
///
/// ## Example
/// ```rust
/// use vendo_core::money::{change_breakdown, Denomination, Money};
///
/// let coins = change_breakdown(Money::from_cents(185)).unwrap();
/// assert_eq!(
///     coins,
///     vec![
///         Denomination::Hundred,
///         Denomination::Fifty,
///         Denomination::Twenty,
///         Denomination::Ten,
///         Denomination::Five,
///     ]
/// );
/// ```
pub fn change_breakdown(amount: Money) -> Result<Vec<Denomination>, CoreError> {
    if !amount.is_coin_representable() {
        return Err(CoreError::UnrepresentableChange {
            cents: amount.cents(),
        });
    }

    let mut remaining = amount.cents();
    let mut coins = Vec::new();

    for coin in Denomination::DESCENDING {
        while remaining >= coin.cents() {
            coins.push(coin);
            remaining -= coin.cents();
        }
    }

    // remaining is 0 here for every multiple of 5: the smallest coin is 5.
    debug_assert_eq!(remaining, 0);

    Ok(coins)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(125);
        assert_eq!(money.cents(), 125);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(125)), "$1.25");
        assert_eq!(format!("{}", Money::from_cents(5)), "$0.05");
        assert_eq!(format!("{}", Money::from_cents(-50)), "-$0.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(100);
        let b = Money::from_cents(45);

        assert_eq!((a + b).cents(), 145);
        assert_eq!((a - b).cents(), 55);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 300);

        let mut acc = Money::zero();
        acc += Money::from_cents(20);
        acc -= Money::from_cents(5);
        assert_eq!(acc.cents(), 15);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_cents(5).is_positive());
        assert!(Money::from_cents(-5).is_negative());
    }

    #[test]
    fn test_coin_representable() {
        assert!(Money::from_cents(0).is_coin_representable());
        assert!(Money::from_cents(5).is_coin_representable());
        assert!(Money::from_cents(185).is_coin_representable());
        assert!(!Money::from_cents(3).is_coin_representable());
        assert!(!Money::from_cents(-5).is_coin_representable());
    }

    #[test]
    fn test_denomination_try_from() {
        assert_eq!(Denomination::try_from(5).unwrap(), Denomination::Five);
        assert_eq!(Denomination::try_from(100).unwrap(), Denomination::Hundred);
        assert!(matches!(
            Denomination::try_from(7),
            Err(ValidationError::NotADenomination { cents: 7 })
        ));
        assert!(Denomination::try_from(0).is_err());
        assert!(Denomination::try_from(-5).is_err());
    }

    #[test]
    fn test_denomination_serializes_as_value() {
        let coins = vec![Denomination::Hundred, Denomination::Five];
        let json = serde_json::to_string(&coins).unwrap();
        assert_eq!(json, "[100,5]");

        let parsed: Vec<Denomination> = serde_json::from_str("[50,20]").unwrap();
        assert_eq!(parsed, vec![Denomination::Fifty, Denomination::Twenty]);

        let bad: Result<Denomination, _> = serde_json::from_str("7");
        assert!(bad.is_err());
    }

    #[test]
    fn test_change_zero_is_empty() {
        assert_eq!(change_breakdown(Money::zero()).unwrap(), vec![]);
    }

    #[test]
    fn test_change_single_coin() {
        assert_eq!(
            change_breakdown(Money::from_cents(10)).unwrap(),
            vec![Denomination::Ten]
        );
    }

    #[test]
    fn test_change_one_of_each() {
        assert_eq!(
            change_breakdown(Money::from_cents(185)).unwrap(),
            vec![
                Denomination::Hundred,
                Denomination::Fifty,
                Denomination::Twenty,
                Denomination::Ten,
                Denomination::Five,
            ]
        );
    }

    #[test]
    fn test_change_repeats_large_coins() {
        assert_eq!(
            change_breakdown(Money::from_cents(240)).unwrap(),
            vec![
                Denomination::Hundred,
                Denomination::Hundred,
                Denomination::Twenty,
                Denomination::Twenty,
            ]
        );
    }

    #[test]
    fn test_change_rejects_non_multiples_of_five() {
        assert!(matches!(
            change_breakdown(Money::from_cents(3)),
            Err(CoreError::UnrepresentableChange { cents: 3 })
        ));
        assert!(matches!(
            change_breakdown(Money::from_cents(101)),
            Err(CoreError::UnrepresentableChange { cents: 101 })
        ));
        assert!(change_breakdown(Money::from_cents(-5)).is_err());
    }

    /// Minimal coin count for the canonical set, checked against a
    /// straightforward dynamic program for every amount up to 1000.
    #[test]
    fn test_change_is_minimal_exhaustive() {
        const COINS: [i64; 5] = [5, 10, 20, 50, 100];

        // dp[a] = fewest coins that sum to a, for multiples of 5
        let mut dp = vec![usize::MAX; 1001];
        dp[0] = 0;
        for a in 1..=1000usize {
            for c in COINS {
                let c = c as usize;
                if a >= c && dp[a - c] != usize::MAX {
                    dp[a] = dp[a].min(dp[a - c] + 1);
                }
            }
        }

        for a in (0..=1000).step_by(5) {
            let coins = change_breakdown(Money::from_cents(a as i64)).unwrap();

            // Sums to the amount
            let sum: i64 = coins.iter().map(|c| c.cents()).sum();
            assert_eq!(sum, a as i64);

            // Non-increasing order, largest first
            assert!(coins.windows(2).all(|w| w[0] >= w[1]));

            // Fewest coins possible
            assert_eq!(coins.len(), dp[a], "amount {}", a);
        }
    }
}
