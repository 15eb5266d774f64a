//! Monetary rounding.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a monetary amount to 2 decimal places, halves away from zero.
///
/// Only applied when assembling results; intermediate amounts keep full
/// precision.
///
/// # Examples
///
/// ```
/// use payroll_cost_engine::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
///
/// assert_eq!(round_money(dec("11140.625")), dec("11140.63"));
/// assert_eq!(round_money(dec("-0.005")), dec("-0.01"));
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats a monetary amount for audit output, always with two decimals.
pub(crate) fn money_str(amount: Decimal) -> String {
    format!("{:.2}", round_money(amount))
}

/// Formats a rate for audit output.
pub(crate) fn rate_str(rate: Decimal) -> String {
    rate.normalize().to_string()
}
