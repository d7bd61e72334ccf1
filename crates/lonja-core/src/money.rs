//! # Money Module
//!
//! Provides the `Money` and `Percent` types for handling monetary values
//! and percentage rates safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  WHY NOT INTEGER CENTS?                                                 │
//! │    Discounts and taxes are percentages of a line amount, so the        │
//! │    intermediate values are routinely sub-cent:                         │
//! │      27.00 × 21% = 5.67   (fine)                                       │
//! │      26.99 × 21% = 5.6679 (must NOT round until display)               │
//! │    Rounding between steps compounds across an order's lines.           │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 Decimal                                          │
//! │    Exact arithmetic end to end; rounding happens exactly once,         │
//! │    at the display boundary (2 decimal places).                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use lonja_core::money::{Money, Percent};
//! use rust_decimal::Decimal;
//!
//! let unit_price = Money::new(Decimal::new(1099, 2)); // €10.99
//! let line = unit_price * 3;                          // €32.97
//!
//! let iva = Percent::from(21);
//! let tax = iva.of(line); // exact: 32.97 × 0.21 = 6.9237
//!
//! assert_eq!(format!("{}", line + tax), "€39.89"); // rounded at display
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// Decimal places shown at the display boundary (euro cents).
pub const DISPLAY_DECIMALS: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in euros as an exact decimal.
///
/// ## Design Decisions
/// - **Decimal (signed)**: Allows negative values for deltas and corrections
/// - **Single field tuple struct**: Zero-cost abstraction over `Decimal`
/// - **Never rounded internally**: `rounded()` / `Display` are the only
///   places a value is brought to 2 decimal places
///
/// ## Where Money Flows
/// ```text
/// Product.price ──► DraftLine.unit_price ──► LinePricing ──► OrderTotals
///                                                 │
///                                                 └──► "€10.99" in the UI
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(#[ts(as = "String")] Decimal);

impl Money {
    /// Creates a Money value from a decimal amount in euros.
    ///
    /// ## Example
    /// ```rust
    /// use lonja_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let price = Money::new(Decimal::new(1099, 2)); // €10.99
    /// assert_eq!(price.amount(), Decimal::new(1099, 2));
    /// ```
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Returns the inner decimal amount, unrounded.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is strictly positive.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is strictly negative.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Rounds to display precision (2 decimal places, midpoint away
    /// from zero).
    ///
    /// ## When To Use
    /// Only at display or reporting boundaries. Totals must be aggregated
    /// from unrounded values, otherwise per-line rounding drifts away from
    /// `subtotal − discount + tax`.
    ///
    /// ## Example
    /// ```rust
    /// use lonja_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let exact = Money::new(Decimal::new(56679, 4)); // 5.6679
    /// assert_eq!(exact.rounded().amount(), Decimal::new(567, 2));
    /// ```
    pub fn rounded(&self) -> Self {
        Money(
            self.0
                .round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use lonja_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let unit_price = Money::new(Decimal::new(299, 2)); // €2.99
    /// let gross = unit_price.multiply_quantity(3);
    /// assert_eq!(gross.amount(), Decimal::new(897, 2)); // €8.97
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * Decimal::from(qty))
    }
}

/// Percentage rate (e.g. a 21% IVA or a 10% discount).
///
/// Stored as the human-entered figure: `Percent::from(21)` means 21%,
/// not 0.21. Values above 100 are representable on purpose; whether they
/// are accepted is a validation concern, not an arithmetic one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Percent(#[ts(as = "String")] Decimal);

impl Percent {
    /// Creates a percentage from a decimal figure (21 = 21%).
    #[inline]
    pub const fn new(value: Decimal) -> Self {
        Percent(value)
    }

    /// Returns the inner decimal figure.
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percent(Decimal::ZERO)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the rate is negative (invalid for this domain, but
    /// representable so validation can report it).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Applies this percentage to an amount: `amount × rate / 100`.
    ///
    /// The multiplication runs before the division so the division by 100
    /// is a pure scale shift and the result stays exact.
    ///
    /// ## Example
    /// ```rust
    /// use lonja_core::money::{Money, Percent};
    /// use rust_decimal::Decimal;
    ///
    /// let base = Money::new(Decimal::from(27));
    /// let tax = Percent::from(21).of(base);
    /// assert_eq!(tax.amount(), Decimal::new(567, 2)); // 5.67
    /// ```
    pub fn of(&self, amount: Money) -> Money {
        Money(amount.0 * self.0 / Decimal::ONE_HUNDRED)
    }
}

impl From<i64> for Percent {
    fn from(value: i64) -> Self {
        Percent(Decimal::from(value))
    }
}

impl From<Decimal> for Percent {
    fn from(value: Decimal) -> Self {
        Percent(value)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format,
/// rounded to euro cents.
///
/// ## Note
/// This matches the dashboard's formatting (`€10.99`). Localized display
/// belongs in the frontend; this is for logs, tests and the seed tool.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.rounded().0;
        let sign = if rounded.is_sign_negative() { "-" } else { "" };
        write!(f, "{}{}{:.2}", sign, crate::CURRENCY_SYMBOL, rounded.abs())
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Default percentage is zero.
impl Default for Percent {
    fn default() -> Self {
        Percent::zero()
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

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

/// Summation, for aggregating line amounts.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// SQLite Integration (feature = "sqlx")
// =============================================================================
// Money and Percent are stored as TEXT columns holding the canonical
// decimal string, so persisted values round-trip the core's unrounded
// arithmetic exactly. sqlx has no built-in Decimal support for SQLite,
// hence the manual impls.

#[cfg(feature = "sqlx")]
mod sqlx_impls {
    use super::{Money, Percent};
    use rust_decimal::Decimal;
    use sqlx::encode::IsNull;
    use sqlx::error::BoxDynError;
    use sqlx::sqlite::{Sqlite, SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef};
    use sqlx::{Decode, Encode, Type};
    use std::borrow::Cow;
    use std::str::FromStr;

    impl Type<Sqlite> for Money {
        fn type_info() -> SqliteTypeInfo {
            <&str as Type<Sqlite>>::type_info()
        }

        fn compatible(ty: &SqliteTypeInfo) -> bool {
            <&str as Type<Sqlite>>::compatible(ty)
        }
    }

    impl<'q> Encode<'q, Sqlite> for Money {
        fn encode_by_ref(
            &self,
            buf: &mut Vec<SqliteArgumentValue<'q>>,
        ) -> Result<IsNull, BoxDynError> {
            buf.push(SqliteArgumentValue::Text(Cow::Owned(self.0.to_string())));
            Ok(IsNull::No)
        }
    }

    impl<'r> Decode<'r, Sqlite> for Money {
        fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
            let text = <&str as Decode<Sqlite>>::decode(value)?;
            Ok(Money(Decimal::from_str(text)?))
        }
    }

    impl Type<Sqlite> for Percent {
        fn type_info() -> SqliteTypeInfo {
            <&str as Type<Sqlite>>::type_info()
        }

        fn compatible(ty: &SqliteTypeInfo) -> bool {
            <&str as Type<Sqlite>>::compatible(ty)
        }
    }

    impl<'q> Encode<'q, Sqlite> for Percent {
        fn encode_by_ref(
            &self,
            buf: &mut Vec<SqliteArgumentValue<'q>>,
        ) -> Result<IsNull, BoxDynError> {
            buf.push(SqliteArgumentValue::Text(Cow::Owned(self.0.to_string())));
            Ok(IsNull::No)
        }
    }

    impl<'r> Decode<'r, Sqlite> for Percent {
        fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
            let text = <&str as Decode<Sqlite>>::decode(value)?;
            Ok(Percent(Decimal::from_str(text)?))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn money(cents: i64) -> Money {
        Money::new(Decimal::new(cents, 2))
    }

    #[test]
    fn test_new_and_amount() {
        let m = money(1099);
        assert_eq!(m.amount(), Decimal::new(1099, 2));
        assert!(!m.is_zero());
        assert!(m.is_positive());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", money(1099)), "€10.99");
        assert_eq!(format!("{}", money(500)), "€5.00");
        assert_eq!(format!("{}", money(-550)), "-€5.50");
        assert_eq!(format!("{}", Money::zero()), "€0.00");
        // Whole-number decimals still render two places
        assert_eq!(format!("{}", Money::new(Decimal::from(27))), "€27.00");
    }

    #[test]
    fn test_display_rounds_at_boundary_only() {
        // 5.6679 carries full precision internally, shows as 5.67
        let exact = Money::new(Decimal::new(56679, 4));
        assert_eq!(format!("{}", exact), "€5.67");
        assert_eq!(exact.amount(), Decimal::new(56679, 4));
    }

    #[test]
    fn test_rounding_midpoint_away_from_zero() {
        // 2.345 → 2.35 (away from zero, not banker's 2.34)
        let m = Money::new(Decimal::new(2345, 3));
        assert_eq!(m.rounded().amount(), Decimal::new(235, 2));

        let neg = Money::new(Decimal::new(-2345, 3));
        assert_eq!(neg.rounded().amount(), Decimal::new(-235, 2));
    }

    #[test]
    fn test_arithmetic() {
        let a = money(1000);
        let b = money(500);

        assert_eq!(a + b, money(1500));
        assert_eq!(a - b, money(500));
        assert_eq!(a * 3, money(3000));

        let mut acc = Money::zero();
        acc += a;
        acc += b;
        assert_eq!(acc, money(1500));
        acc -= b;
        assert_eq!(acc, money(1000));
    }

    #[test]
    fn test_sum() {
        let total: Money = vec![money(100), money(250), money(50)].into_iter().sum();
        assert_eq!(total, money(400));
    }

    #[test]
    fn test_decimal_addition_is_exact() {
        // The classic float failure case: 0.1 + 0.2 == 0.3 exactly
        let sum = Money::new(Decimal::new(1, 1)) + Money::new(Decimal::new(2, 1));
        assert_eq!(sum.amount(), Decimal::new(3, 1));
    }

    #[test]
    fn test_percent_of() {
        // 21% of 27.00 = 5.67
        let base = Money::new(Decimal::from(27));
        assert_eq!(Percent::from(21).of(base), money(567));

        // 10% of 30.00 = 3.00
        let gross = Money::new(Decimal::from(30));
        assert_eq!(Percent::from(10).of(gross), money(300));

        // 0% of anything is zero
        assert_eq!(Percent::zero().of(gross), Money::zero());
    }

    #[test]
    fn test_percent_of_keeps_sub_cent_precision() {
        // 21% of 26.99 = 5.6679, not 5.67
        let base = money(2699);
        let tax = Percent::from(21).of(base);
        assert_eq!(tax.amount(), Decimal::new(56679, 4));
    }

    #[test]
    fn test_percent_over_100_is_representable() {
        // Arithmetic stays permissive; rejection is validation's job
        let gross = Money::new(Decimal::from(10));
        let discount = Percent::from(150).of(gross);
        assert_eq!(discount, Money::new(Decimal::from(15)));
    }

    #[test]
    fn test_percent_display() {
        assert_eq!(format!("{}", Percent::from(21)), "21%");
        assert_eq!(
            format!("{}", Percent::new(Decimal::new(825, 2))),
            "8.25%"
        );
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = money(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs(), money(100));
    }
}
