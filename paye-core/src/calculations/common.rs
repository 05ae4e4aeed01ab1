//! Common utility functions for payroll calculations.
//!
//! Shared rounding and formatting helpers used across the calculators.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places in the smallest currency unit.
pub const CURRENCY_DP: u32 = 2;

/// Number of months in a tax year.
pub const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Rounds a value to the smallest currency unit using round-half-to-even.
///
/// Applied once to final totals, never to intermediate per-bracket amounts,
/// so repeated summation cannot drift.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use paye_core::calculations::common::round_currency;
///
/// assert_eq!(round_currency(dec!(10.005)), dec!(10.00));
/// assert_eq!(round_currency(dec!(10.015)), dec!(10.02));
/// assert_eq!(round_currency(dec!(10.0151)), dec!(10.02));
/// ```
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointNearestEven)
}

/// Returns the maximum of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use paye_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(-200.00)), dec!(-100.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Formats an amount with comma thousands separators, keeping its scale.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use paye_core::calculations::common::format_amount;
///
/// assert_eq!(format_amount(dec!(3000000)), "3,000,000");
/// assert_eq!(format_amount(dec!(-1234.50)), "-1,234.50");
/// ```
pub fn format_amount(value: Decimal) -> String {
    let text = value.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(text.len() + text.len() / 3 + 1);
    if value.is_sign_negative() && !value.is_zero() {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}
