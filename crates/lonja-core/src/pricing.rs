//! # Pricing Module
//!
//! Pure calculation of line amounts and order totals. Every total shown
//! anywhere (draft screen, persisted orders, seed output) comes from this
//! one algorithm, so the numbers can never disagree between surfaces.
//!
//! ## The Line Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  subtotal        = quantity × unit_price                    │
//! │  discount_amount = subtotal × discount_percent / 100        │
//! │  taxable_base    = subtotal − discount_amount               │
//! │  tax_amount      = taxable_base × tax_percent / 100         │
//! │  line_total      = taxable_base + tax_amount                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//! Tax applies to the discounted base, never the raw subtotal. No step
//! rounds; display rounding happens once, at the formatting boundary.
//!
//! ## Aggregation
//! An order's totals are the component-wise sums of its lines. Summing
//! unrounded components keeps `subtotal − discount + tax == total` exact
//! for any number of lines.

use crate::money::{Money, Percent};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Line Pricing
// =============================================================================

/// The derived amounts for a single order line.
///
/// Produced by [`price_line`]; the fields are exact (unrounded) decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LinePricing {
    /// Gross amount before discount: `quantity × unit_price`.
    pub subtotal: Money,
    /// Discount amount deducted from the subtotal.
    pub discount_amount: Money,
    /// Tax amount, computed on the discounted base.
    pub tax_amount: Money,
    /// Payable amount for the line: `subtotal − discount + tax`.
    pub line_total: Money,
}

impl LinePricing {
    /// The amount tax was computed on: `subtotal − discount_amount`.
    pub fn taxable_base(&self) -> Money {
        self.subtotal - self.discount_amount
    }

    /// Rounds every component to display precision.
    pub fn rounded(&self) -> Self {
        LinePricing {
            subtotal: self.subtotal.rounded(),
            discount_amount: self.discount_amount.rounded(),
            tax_amount: self.tax_amount.rounded(),
            line_total: self.line_total.rounded(),
        }
    }
}

/// Computes the amounts for one order line.
///
/// This is a total function: any quantity and any percentages produce a
/// result. Range rules (positive quantity, non-negative rates) live in
/// the validation layer so callers can show field-level messages instead
/// of arithmetic surprises.
///
/// ## Example
/// ```rust
/// use lonja_core::money::{Money, Percent};
/// use lonja_core::pricing::price_line;
/// use rust_decimal::Decimal;
///
/// // 3 × €10.00, 10% discount, 21% tax
/// let line = price_line(
///     3,
///     Money::new(Decimal::from(10)),
///     Percent::from(10),
///     Percent::from(21),
/// );
/// assert_eq!(format!("{}", line.subtotal), "€30.00");
/// assert_eq!(format!("{}", line.discount_amount), "€3.00");
/// assert_eq!(format!("{}", line.tax_amount), "€5.67");
/// assert_eq!(format!("{}", line.line_total), "€32.67");
/// ```
pub fn price_line(
    quantity: i64,
    unit_price: Money,
    discount_percent: Percent,
    tax_percent: Percent,
) -> LinePricing {
    let subtotal = unit_price * quantity;
    let discount_amount = discount_percent.of(subtotal);
    let taxable_base = subtotal - discount_amount;
    let tax_amount = tax_percent.of(taxable_base);
    let line_total = taxable_base + tax_amount;

    LinePricing {
        subtotal,
        discount_amount,
        tax_amount,
        line_total,
    }
}

// =============================================================================
// Order Totals
// =============================================================================

/// Aggregated totals for a whole order.
///
/// Each component is the sum of the corresponding line component, so the
/// order-level identity `subtotal − discount_amount + tax_amount == total`
/// holds exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderTotals {
    /// Sum of line subtotals (gross, before discounts).
    pub subtotal: Money,
    /// Sum of line discount amounts.
    pub discount_amount: Money,
    /// Sum of line tax amounts.
    pub tax_amount: Money,
    /// Sum of line totals. This is the order's payable amount.
    pub total: Money,
}

impl OrderTotals {
    /// All-zero totals, the result for an empty order.
    pub fn zero() -> Self {
        OrderTotals {
            subtotal: Money::zero(),
            discount_amount: Money::zero(),
            tax_amount: Money::zero(),
            total: Money::zero(),
        }
    }

    /// Sums line pricings into order totals.
    ///
    /// Component-wise addition, so the result does not depend on line
    /// order and an empty input yields [`OrderTotals::zero`].
    pub fn aggregate<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = LinePricing>,
    {
        let mut totals = OrderTotals::zero();
        for line in lines {
            totals.subtotal += line.subtotal;
            totals.discount_amount += line.discount_amount;
            totals.tax_amount += line.tax_amount;
            totals.total += line.line_total;
        }
        totals
    }

    /// Rounds every component to display precision.
    pub fn rounded(&self) -> Self {
        OrderTotals {
            subtotal: self.subtotal.rounded(),
            discount_amount: self.discount_amount.rounded(),
            tax_amount: self.tax_amount.rounded(),
            total: self.total.rounded(),
        }
    }
}

impl Default for OrderTotals {
    fn default() -> Self {
        OrderTotals::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn money(cents: i64) -> Money {
        Money::new(Decimal::new(cents, 2))
    }

    fn pct(value: i64) -> Percent {
        Percent::from(value)
    }

    #[test]
    fn test_line_with_discount_and_tax() {
        // 3 × €10.00, 10% discount, 21% tax
        let line = price_line(3, money(1000), pct(10), pct(21));

        assert_eq!(line.subtotal, money(3000));
        assert_eq!(line.discount_amount, money(300));
        assert_eq!(line.taxable_base(), money(2700));
        assert_eq!(line.tax_amount, money(567));
        assert_eq!(line.line_total, money(3267));
    }

    #[test]
    fn test_tax_applies_after_discount() {
        // 1 × €100.00, 50% discount, 10% tax: tax is 10% of 50, not of 100
        let line = price_line(1, money(10000), pct(50), pct(10));

        assert_eq!(line.discount_amount, money(5000));
        assert_eq!(line.tax_amount, money(500));
        assert_eq!(line.line_total, money(5500));
    }

    #[test]
    fn test_zero_rates() {
        let line = price_line(4, money(250), Percent::zero(), Percent::zero());

        assert_eq!(line.subtotal, money(1000));
        assert_eq!(line.discount_amount, Money::zero());
        assert_eq!(line.tax_amount, Money::zero());
        assert_eq!(line.line_total, money(1000));
    }

    #[test]
    fn test_full_discount() {
        // 100% discount zeroes the base, so tax is zero too
        let line = price_line(2, money(1999), pct(100), pct(21));

        assert_eq!(line.subtotal, money(3998));
        assert_eq!(line.discount_amount, money(3998));
        assert_eq!(line.taxable_base(), Money::zero());
        assert_eq!(line.tax_amount, Money::zero());
        assert_eq!(line.line_total, Money::zero());
    }

    #[test]
    fn test_over_100_percent_discount_goes_negative() {
        // Permissive arithmetic: 150% discount yields a negative line
        let line = price_line(1, money(1000), pct(150), pct(21));

        assert_eq!(line.discount_amount, money(1500));
        assert_eq!(line.taxable_base(), money(-500));
        assert_eq!(line.tax_amount, money(-105));
        assert_eq!(line.line_total, money(-605));
    }

    #[test]
    fn test_no_intermediate_rounding() {
        // 1 × €26.99 at 21%: tax carries 5.6679, display shows 5.67
        let line = price_line(1, money(2699), Percent::zero(), pct(21));

        assert_eq!(line.tax_amount.amount(), Decimal::new(56679, 4));
        assert_eq!(line.rounded().tax_amount, money(567));
        // total keeps the exact tax, rounding only at the boundary
        assert_eq!(line.line_total.amount(), Decimal::new(326579, 4));
        assert_eq!(format!("{}", line.line_total), "€32.66");
    }

    #[test]
    fn test_aggregate_two_lines() {
        // Line A: 1 × €100.00, no discount, 21% tax → 121.00
        // Line B: 2 × €50.00, 50% discount, no tax →  50.00
        let a = price_line(1, money(10000), pct(0), pct(21));
        let b = price_line(2, money(5000), pct(50), pct(0));

        assert_eq!(a.line_total, money(12100));
        assert_eq!(b.line_total, money(5000));

        let totals = OrderTotals::aggregate([a, b]);
        assert_eq!(totals.subtotal, money(20000));
        assert_eq!(totals.discount_amount, money(5000));
        assert_eq!(totals.tax_amount, money(2100));
        assert_eq!(totals.total, money(17100));
    }

    #[test]
    fn test_aggregate_empty_is_zero() {
        let totals = OrderTotals::aggregate([]);
        assert_eq!(totals, OrderTotals::zero());
        assert!(totals.total.is_zero());
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let lines = vec![
            price_line(3, money(1099), pct(10), pct(21)),
            price_line(1, money(50000), pct(0), pct(4)),
            price_line(7, money(333), pct(25), pct(10)),
        ];
        let mut reversed = lines.clone();
        reversed.reverse();

        assert_eq!(
            OrderTotals::aggregate(lines.clone()),
            OrderTotals::aggregate(reversed)
        );
        // and recomputing from the same lines is stable
        assert_eq!(
            OrderTotals::aggregate(lines.clone()),
            OrderTotals::aggregate(lines)
        );
    }

    #[test]
    fn test_totals_identity_holds() {
        let lines = vec![
            price_line(2, money(2699), pct(15), pct(21)),
            price_line(5, money(101), pct(0), pct(10)),
            price_line(1, money(89999), pct(33), pct(4)),
        ];
        let t = OrderTotals::aggregate(lines);

        assert_eq!(t.subtotal - t.discount_amount + t.tax_amount, t.total);
    }

    #[test]
    fn test_single_line_order_matches_line() {
        let line = price_line(3, money(1000), pct(10), pct(21));
        let totals = OrderTotals::aggregate([line]);

        assert_eq!(totals.subtotal, line.subtotal);
        assert_eq!(totals.discount_amount, line.discount_amount);
        assert_eq!(totals.tax_amount, line.tax_amount);
        assert_eq!(totals.total, line.line_total);
    }
}
