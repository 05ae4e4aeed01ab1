//! Statutory deductions and employer contributions.
//!
//! | Item              | Side     | Base                      |
//! |-------------------|----------|---------------------------|
//! | Pension           | employee | basic + housing + transport |
//! | Pension           | employer | basic + housing + transport |
//! | NHF               | employee | basic                     |
//! | NHIS              | employee | flat amount supplied      |
//! | Life assurance    | employee | flat amount supplied      |
//! | Gratuities        | employee | flat amount supplied      |
//! | NSITF             | employer | gross emolument           |
//! | ITF               | employer | gross emolument, 5+ staff |
//!
//! All amounts are monthly.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{AdditionalDeductions, DeductionBreakdown, SalaryComponents, StatutoryRates};

/// Minimum headcount from which the ITF levy applies.
pub const ITF_MIN_EMPLOYEES: u32 = 5;

/// Largest accepted monthly amount for a single salary or deduction field.
pub const MAX_MONTHLY_AMOUNT: Decimal = Decimal::from_parts(1_215_752_192, 23, 0, false, 0);

/// Errors raised for salary or deduction inputs that cannot be trusted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeductionError {
    #[error("{field} must be non-negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },

    #[error("{field} of {value} exceeds the maximum of {max}", max = MAX_MONTHLY_AMOUNT)]
    AmountTooLarge { field: &'static str, value: Decimal },

    #[error("employee count must be at least 1, got {0}")]
    InvalidEmployeeCount(u32),
}

/// Calculator for statutory deductions under a set of rates.
#[derive(Debug, Clone)]
pub struct StatutoryDeductions<'a> {
    rates: &'a StatutoryRates,
}

impl<'a> StatutoryDeductions<'a> {
    pub fn new(rates: &'a StatutoryRates) -> Self {
        Self { rates }
    }

    /// Computes the full monthly deduction breakdown.
    ///
    /// # Errors
    ///
    /// Returns [`DeductionError`] on the first negative or oversized amount,
    /// or a zero employee count. Inputs are never clamped.
    pub fn calculate(
        &self,
        salary: &SalaryComponents,
        extra: &AdditionalDeductions,
    ) -> Result<DeductionBreakdown, DeductionError> {
        validate_inputs(salary, extra)?;

        let gross_emolument = salary.gross();
        let pensionable_emoluments = salary.pensionable();

        let employee_pension = pensionable_emoluments * self.rates.employee_pension;
        let employer_pension = pensionable_emoluments * self.rates.employer_pension;
        let nhf = salary.basic * self.rates.nhf;
        let nsitf = gross_emolument * self.rates.nsitf;

        let itf_applicable = extra.employee_count >= ITF_MIN_EMPLOYEES;
        let itf = if itf_applicable {
            gross_emolument * self.rates.itf
        } else {
            Decimal::ZERO
        };

        let total_employee_deductions =
            employee_pension + nhf + extra.nhis + extra.life_assurance + extra.gratuities;
        let total_employer_contributions = employer_pension + nsitf + itf;

        Ok(DeductionBreakdown {
            gross_emolument,
            pensionable_emoluments,
            employee_pension,
            nhf,
            nhis: extra.nhis,
            life_assurance: extra.life_assurance,
            gratuities: extra.gratuities,
            total_employee_deductions,
            employer_pension,
            nsitf,
            itf,
            itf_applicable,
            total_employer_contributions,
        })
    }
}

/// Computes statutory deductions for `salary` under `rates`.
///
/// # Errors
///
/// See [`StatutoryDeductions::calculate`].
pub fn compute_deductions(
    salary: &SalaryComponents,
    rates: &StatutoryRates,
    extra: &AdditionalDeductions,
) -> Result<DeductionBreakdown, DeductionError> {
    StatutoryDeductions::new(rates).calculate(salary, extra)
}

/// Checks a single monthly amount against the accepted range.
pub(crate) fn check_amount(
    field: &'static str,
    value: Decimal,
) -> Result<(), DeductionError> {
    if value < Decimal::ZERO {
        return Err(DeductionError::NegativeAmount { field, value });
    }
    if value > MAX_MONTHLY_AMOUNT {
        return Err(DeductionError::AmountTooLarge { field, value });
    }
    Ok(())
}

fn validate_inputs(
    salary: &SalaryComponents,
    extra: &AdditionalDeductions,
) -> Result<(), DeductionError> {
    for (field, value) in salary.fields() {
        check_amount(field, value)?;
    }
    check_amount("nhis", extra.nhis)?;
    check_amount("life_assurance", extra.life_assurance)?;
    check_amount("gratuities", extra.gratuities)?;

    if extra.employee_count == 0 {
        return Err(DeductionError::InvalidEmployeeCount(extra.employee_count));
    }
    Ok(())
}
