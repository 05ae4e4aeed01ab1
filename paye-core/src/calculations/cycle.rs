//! Pay-cycle conversion and year-to-date projection.
//!
//! Conversions go through a monthly amount using fixed factors:
//!
//! | From → To         | Factor          |
//! |-------------------|-----------------|
//! | monthly → annual  | × 12            |
//! | monthly → weekly  | ÷ 4.33          |
//! | weekly → monthly  | × 4.33          |
//! | annual → weekly   | ÷ 12, then ÷ 4.33 |
//!
//! 4.33 is the average number of weeks in a month, deliberately not 52/12.
//!
//! Year-to-date projection is linear: it assumes every month of the year
//! earns the same, and scales the full-year figures by the share of the year
//! worked.

use rust_decimal::Decimal;

use crate::calculations::common::{MONTHS_PER_YEAR, round_currency};
use crate::{ComputationResult, PayCycle, PeriodFigures, YtdProjection};

/// Average weeks per month.
pub const WEEKS_PER_MONTH: Decimal = Decimal::from_parts(433, 0, 0, false, 2);

/// Converts `amount` in `cycle` terms into a monthly amount.
pub fn to_monthly(
    amount: Decimal,
    cycle: PayCycle,
) -> Decimal {
    match cycle {
        PayCycle::Monthly => amount,
        PayCycle::Weekly => amount * WEEKS_PER_MONTH,
        PayCycle::Annual => amount / MONTHS_PER_YEAR,
    }
}

/// Converts a monthly amount into `cycle` terms.
pub fn from_monthly(
    amount: Decimal,
    cycle: PayCycle,
) -> Decimal {
    match cycle {
        PayCycle::Monthly => amount,
        PayCycle::Weekly => amount / WEEKS_PER_MONTH,
        PayCycle::Annual => amount * MONTHS_PER_YEAR,
    }
}

/// Converts `amount` between pay cycles. The result is not rounded.
///
/// ```
/// use rust_decimal_macros::dec;
/// use paye_core::PayCycle;
/// use paye_core::calculations::cycle::convert;
///
/// assert_eq!(convert(dec!(100000), PayCycle::Monthly, PayCycle::Annual), dec!(1200000));
/// assert_eq!(convert(dec!(1000), PayCycle::Weekly, PayCycle::Monthly), dec!(4330));
/// ```
pub fn convert(
    amount: Decimal,
    from: PayCycle,
    to: PayCycle,
) -> Decimal {
    if from == to {
        return amount;
    }
    from_monthly(to_monthly(amount, from), to)
}

/// Month-equivalents covered by `periods` of `cycle`, capped at a full year.
pub fn months_worked(
    periods: u32,
    cycle: PayCycle,
) -> Decimal {
    let periods = Decimal::from(periods);
    let months = match cycle {
        PayCycle::Monthly => periods,
        PayCycle::Weekly => periods / WEEKS_PER_MONTH,
        PayCycle::Annual => periods * MONTHS_PER_YEAR,
    };
    months.min(MONTHS_PER_YEAR)
}

/// Scales a full-year result down to the part of the year worked.
///
/// This is a linear projection of the annual figures, not a recomputation.
/// Year-to-date amounts are exactly `annual × fraction_of_year` and are left
/// unrounded; weekly fractions are not whole hundredths of a month.
pub fn project_ytd(
    result: &ComputationResult,
    periods_worked: u32,
    cycle: PayCycle,
) -> YtdProjection {
    let months = months_worked(periods_worked, cycle);
    let fraction_of_year = months / MONTHS_PER_YEAR;

    YtdProjection {
        periods_worked,
        cycle,
        months_worked: months,
        fraction_of_year,
        ytd_gross: result.annual_gross * fraction_of_year,
        ytd_tax: result.annual_tax * fraction_of_year,
        ytd_net: result.annual_net_pay * fraction_of_year,
        completion_percentage: round_currency(fraction_of_year * Decimal::ONE_HUNDRED),
        remaining_months: MONTHS_PER_YEAR - months,
    }
}

/// Expresses monthly gross, tax and net in `cycle` terms, rounded to the
/// currency unit.
pub fn period_figures(
    monthly_gross: Decimal,
    monthly_tax: Decimal,
    monthly_net: Decimal,
    cycle: PayCycle,
) -> PeriodFigures {
    let per_period = |amount: Decimal| round_currency(from_monthly(amount, cycle));

    PeriodFigures {
        cycle,
        gross: per_period(monthly_gross),
        tax: per_period(monthly_tax),
        net: per_period(monthly_net),
    }
}
