//! Progressive income tax over a bracket schedule.
//!
//! Income is allocated bracket by bracket in ascending order. The amount a
//! bracket absorbs is `min(max - min, income - min)`; the terminal unbounded
//! bracket absorbs whatever is left. Each bracket's tax is kept unrounded and
//! only the total is rounded to the currency unit (half to even).
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use paye_core::calculations::progressive::ProgressiveTax;
//! use paye_core::default_tax_brackets;
//!
//! let brackets = default_tax_brackets();
//! let result = ProgressiveTax::new(&brackets).calculate(dec!(5000000)).unwrap();
//!
//! // 15% of 2,200,000 + 18% of 2,000,000
//! assert_eq!(result.total_tax, dec!(690000.00));
//! assert_eq!(result.breakdown.len(), 3);
//! ```

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::calculations::common::round_currency;
use crate::calculations::schedule::{ScheduleError, validate_schedule};
use crate::{BracketTax, TaxBracket, TaxComputation};

/// Errors that can occur while computing progressive tax.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxError {
    /// Callers must clamp taxable income at zero before calling.
    #[error("taxable income must be non-negative, got {0}")]
    NegativeIncome(Decimal),

    /// The schedule breaks an invariant; computing would under- or over-tax.
    #[error("invalid tax bracket schedule: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    InvalidSchedule(Vec<ScheduleError>),

    /// Income was left over after walking every bracket.
    #[error("taxable income {income} only allocated up to {allocated}")]
    Unallocated { income: Decimal, allocated: Decimal },
}

/// Calculator for tax owed under a bracket schedule.
#[derive(Debug, Clone)]
pub struct ProgressiveTax<'a> {
    brackets: &'a [TaxBracket],
}

impl<'a> ProgressiveTax<'a> {
    /// Creates a calculator over `brackets`.
    ///
    /// The schedule is validated on every [`calculate`](Self::calculate)
    /// call, not here.
    pub fn new(brackets: &'a [TaxBracket]) -> Self {
        Self { brackets }
    }

    /// Computes total tax and the per-bracket breakdown for an annual
    /// taxable income.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError`] if:
    /// - `annual_taxable_income` is negative
    /// - the schedule fails validation
    /// - the income could not be fully allocated
    pub fn calculate(
        &self,
        annual_taxable_income: Decimal,
    ) -> Result<TaxComputation, TaxError> {
        validate_schedule(self.brackets).map_err(TaxError::InvalidSchedule)?;

        if annual_taxable_income < Decimal::ZERO {
            return Err(TaxError::NegativeIncome(annual_taxable_income));
        }

        if annual_taxable_income.is_zero() {
            return Ok(TaxComputation::default());
        }

        let mut allocated = Decimal::ZERO;
        let mut tax = Decimal::ZERO;
        let mut breakdown = Vec::new();

        for bracket in self.brackets {
            if allocated >= annual_taxable_income {
                break;
            }
            if annual_taxable_income <= bracket.min {
                continue;
            }

            let amount = self.amount_in_bracket(bracket, annual_taxable_income);
            if amount.is_zero() {
                continue;
            }

            let bracket_tax = amount * bracket.rate;
            allocated += amount;
            tax += bracket_tax;

            breakdown.push(BracketTax {
                label: bracket.label(),
                min: bracket.min,
                max: bracket.max,
                rate: bracket.rate,
                taxable_amount: amount,
                tax: bracket_tax,
            });
        }

        if allocated != annual_taxable_income {
            return Err(TaxError::Unallocated {
                income: annual_taxable_income,
                allocated,
            });
        }

        let total_tax = round_currency(tax);
        debug!(
            income = %annual_taxable_income,
            %total_tax,
            brackets_used = breakdown.len(),
            "progressive tax computed"
        );

        Ok(TaxComputation {
            taxable_income: annual_taxable_income,
            total_tax,
            breakdown,
        })
    }

    /// Portion of `income` that falls inside `bracket`.
    fn amount_in_bracket(
        &self,
        bracket: &TaxBracket,
        income: Decimal,
    ) -> Decimal {
        let above_min = income - bracket.min;
        let amount = match bracket.width() {
            Some(width) => width.min(above_min),
            None => above_min,
        };
        amount.max(Decimal::ZERO)
    }
}

/// Computes progressive tax for `annual_taxable_income` under `brackets`.
///
/// # Errors
///
/// See [`ProgressiveTax::calculate`].
pub fn compute_tax(
    annual_taxable_income: Decimal,
    brackets: &[TaxBracket],
) -> Result<TaxComputation, TaxError> {
    ProgressiveTax::new(brackets).calculate(annual_taxable_income)
}
