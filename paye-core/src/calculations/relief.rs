//! Rent relief.

use rust_decimal::Decimal;

use crate::Reliefs;

/// Relief granted for `annual_rent_paid`: the configured share of the rent,
/// never more than the cap.
///
/// ```
/// use rust_decimal_macros::dec;
/// use paye_core::calculations::relief::compute_rent_relief;
/// use paye_core::Reliefs;
///
/// let reliefs = Reliefs::default();
///
/// assert_eq!(compute_rent_relief(dec!(1000000), &reliefs), dec!(200000));
/// assert_eq!(compute_rent_relief(dec!(3000000), &reliefs), dec!(500000));
/// ```
pub fn compute_rent_relief(
    annual_rent_paid: Decimal,
    reliefs: &Reliefs,
) -> Decimal {
    (annual_rent_paid * reliefs.rent_relief).min(reliefs.rent_relief_cap)
}
