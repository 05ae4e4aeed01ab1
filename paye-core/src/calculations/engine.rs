//! PAYE computation for a single employee.
//!
//! The engine always works in annual terms internally; the declared pay
//! cycle only changes how per-period figures are presented.
//!
//! # Computation Steps
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Monthly gross (sum of components); annual gross = × 12 |
//! | 2    | Statutory deductions (monthly) |
//! | 3    | Rent relief on annual rent paid |
//! | 4    | Total annual deductions = rent relief + 12 × (pension + NHF + NHIS) |
//! | 5    | Annual taxable income = annual gross − step 4, minimum 0 |
//! | 6    | Progressive tax on step 5 |
//! | 7    | Monthly tax = step 6 ÷ 12; net = gross − employee deductions − monthly tax, minimum 0 |
//! | 8    | Employer cost = gross + employer contributions |
//! | 9    | Optional year-to-date projection |
//!
//! Life assurance and gratuities reduce net pay but are not deducted before
//! tax; they are reported separately as annual figures.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use paye_core::calculations::engine::{EngineInput, PayeEngine};
//! use paye_core::{PayrollSettings, SalaryComponents};
//!
//! let settings = PayrollSettings::defaults(2025);
//! let input = EngineInput {
//!     salary: SalaryComponents {
//!         basic: dec!(100000),
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//!
//! let result = PayeEngine::new(&settings).compute(&input).unwrap();
//!
//! assert_eq!(result.annual_gross, dec!(1200000));
//! // 1,200,000 - 96,000 pension - 30,000 NHF = 1,074,000 taxable
//! assert_eq!(result.annual_taxable_income, dec!(1074000));
//! assert_eq!(result.annual_tax, dec!(41100.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::calculations::common::{MONTHS_PER_YEAR, max, round_currency};
use crate::calculations::cycle::{period_figures, project_ytd};
use crate::calculations::deductions::{DeductionError, StatutoryDeductions, check_amount};
use crate::calculations::progressive::{ProgressiveTax, TaxError};
use crate::calculations::relief::compute_rent_relief;
use crate::{
    AdditionalDeductions, ComputationResult, DeductionBreakdown, PayCycle, PayrollSettings,
    SalaryComponents, SettingsError,
};

/// Errors that can occur during a PAYE computation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Deduction(#[from] DeductionError),

    #[error(transparent)]
    Tax(#[from] TaxError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Everything the caller supplies for one computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineInput {
    /// Monthly salary components.
    pub salary: SalaryComponents,

    /// Rent paid over the whole year.
    pub annual_rent_paid: Decimal,

    /// Flat monthly deductions and the employer's headcount.
    pub additional: AdditionalDeductions,

    /// Cycle in which per-period figures are presented.
    pub cycle: PayCycle,

    /// Periods of `cycle` worked so far this year. A year-to-date projection
    /// is attached when this is below the cycle's periods per year.
    pub periods_worked: Option<u32>,
}

/// Computes PAYE results against one snapshot of settings.
#[derive(Debug, Clone)]
pub struct PayeEngine<'a> {
    settings: &'a PayrollSettings,
}

impl<'a> PayeEngine<'a> {
    pub fn new(settings: &'a PayrollSettings) -> Self {
        Self { settings }
    }

    /// Runs the full computation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if an input amount is invalid, a rate or relief
    /// is out of range, or the tax bracket schedule is broken. Nothing is
    /// recovered or clamped.
    pub fn compute(
        &self,
        input: &EngineInput,
    ) -> Result<ComputationResult, EngineError> {
        self.settings.validate_rates()?;
        check_amount("annual_rent_paid", input.annual_rent_paid)?;

        let deductions = StatutoryDeductions::new(&self.settings.statutory_rates)
            .calculate(&input.salary, &input.additional)?;

        let monthly_gross = deductions.gross_emolument;
        let annual_gross = self.annualize(monthly_gross);

        let rent_relief = compute_rent_relief(input.annual_rent_paid, &self.settings.reliefs);

        let annual_pension = self.annualize(deductions.employee_pension);
        let annual_nhf = self.annualize(deductions.nhf);
        let annual_nhis = self.annualize(deductions.nhis);
        let total_annual_deductions = rent_relief + annual_pension + annual_nhf + annual_nhis;

        let annual_taxable_income = self.taxable_income(annual_gross, total_annual_deductions);

        let tax = ProgressiveTax::new(&self.settings.tax_brackets).calculate(annual_taxable_income)?;
        let annual_tax = tax.total_tax;
        let monthly_tax = round_currency(annual_tax / MONTHS_PER_YEAR);

        let monthly_net_pay = self.net_pay(&deductions, monthly_tax);
        let annual_net_pay = self.annualize(monthly_net_pay);

        let employer_monthly_cost =
            round_currency(monthly_gross + deductions.total_employer_contributions);
        let employer_annual_cost = self.annualize(employer_monthly_cost);

        let per_period = period_figures(monthly_gross, monthly_tax, monthly_net_pay, input.cycle);

        debug!(
            tax_year = self.settings.tax_year,
            %annual_gross,
            %annual_taxable_income,
            %annual_tax,
            %monthly_net_pay,
            "PAYE computed"
        );

        let mut result = ComputationResult {
            tax_year: self.settings.tax_year,
            cycle: input.cycle,
            settings_source: self.settings.source,
            monthly_gross,
            annual_gross,
            annual_pension,
            annual_nhf,
            annual_nhis,
            rent_relief,
            total_annual_deductions,
            annual_life_assurance: self.annualize(deductions.life_assurance),
            annual_gratuities: self.annualize(deductions.gratuities),
            deductions,
            annual_taxable_income,
            tax,
            annual_tax,
            monthly_tax,
            monthly_net_pay,
            annual_net_pay,
            employer_monthly_cost,
            employer_annual_cost,
            per_period,
            ytd: None,
        };

        if let Some(periods) = input.periods_worked
            && periods < input.cycle.periods_per_year()
        {
            result.ytd = Some(project_ytd(&result, periods, input.cycle));
        }

        Ok(result)
    }

    fn annualize(
        &self,
        monthly: Decimal,
    ) -> Decimal {
        monthly * MONTHS_PER_YEAR
    }

    /// Annual taxable income, never negative.
    fn taxable_income(
        &self,
        annual_gross: Decimal,
        total_annual_deductions: Decimal,
    ) -> Decimal {
        max(annual_gross - total_annual_deductions, Decimal::ZERO)
    }

    /// Monthly take-home pay, never negative.
    fn net_pay(
        &self,
        deductions: &DeductionBreakdown,
        monthly_tax: Decimal,
    ) -> Decimal {
        let net =
            deductions.gross_emolument - deductions.total_employee_deductions - monthly_tax;
        round_currency(max(net, Decimal::ZERO))
    }
}

/// Computes PAYE for `input` under `settings`.
///
/// # Errors
///
/// See [`PayeEngine::compute`].
pub fn compute_paye(
    settings: &PayrollSettings,
    input: &EngineInput,
) -> Result<ComputationResult, EngineError> {
    PayeEngine::new(settings).compute(input)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::TaxBracket;
    use crate::calculations::schedule::ScheduleError;

    fn test_settings() -> PayrollSettings {
        PayrollSettings::defaults(2025)
    }

    fn test_input() -> EngineInput {
        EngineInput {
            salary: SalaryComponents {
                basic: dec!(250000),
                housing: dec!(100000),
                transport: dec!(50000),
                entertainment: dec!(20000),
                meal_subsidy: dec!(10000),
                medical: dec!(10000),
                benefits_in_kind: dec!(0),
            },
            annual_rent_paid: dec!(1200000),
            additional: AdditionalDeductions {
                nhis: dec!(5000),
                life_assurance: dec!(2000),
                gratuities: dec!(1000),
                employee_count: 10,
            },
            cycle: PayCycle::Monthly,
            periods_worked: None,
        }
    }

    // =========================================================================
    // helper tests
    // =========================================================================

    #[test]
    fn taxable_income_is_clamped_at_zero() {
        let settings = test_settings();
        let engine = PayeEngine::new(&settings);

        assert_eq!(engine.taxable_income(dec!(100), dec!(500)), dec!(0));
        assert_eq!(engine.taxable_income(dec!(500), dec!(100)), dec!(400));
    }

    #[test]
    fn net_pay_is_clamped_at_zero() {
        let settings = test_settings();
        let engine = PayeEngine::new(&settings);
        let deductions = DeductionBreakdown {
            gross_emolument: dec!(1000),
            total_employee_deductions: dec!(900),
            ..Default::default()
        };

        assert_eq!(engine.net_pay(&deductions, dec!(200)), dec!(0));
        assert_eq!(engine.net_pay(&deductions, dec!(50)), dec!(50));
    }

    // =========================================================================
    // compute (integration) tests
    // =========================================================================

    #[test]
    fn compute_standard_case() {
        let settings = test_settings();

        let result = compute_paye(&settings, &test_input()).unwrap();

        // Gross: 440,000 monthly
        assert_eq!(result.monthly_gross, dec!(440000));
        assert_eq!(result.annual_gross, dec!(5280000));
        // Pension: 8% of 400,000 = 32,000 → 384,000 a year
        assert_eq!(result.annual_pension, dec!(384000));
        // NHF: 2.5% of 250,000 = 6,250 → 75,000 a year
        assert_eq!(result.annual_nhf, dec!(75000));
        assert_eq!(result.annual_nhis, dec!(60000));
        // Rent relief: 20% of 1,200,000
        assert_eq!(result.rent_relief, dec!(240000));
        assert_eq!(result.total_annual_deductions, dec!(759000));
        // Taxable: 5,280,000 - 759,000 = 4,521,000
        assert_eq!(result.annual_taxable_income, dec!(4521000));
        // Tax: 330,000 + 18% of 1,521,000 = 330,000 + 273,780
        assert_eq!(result.annual_tax, dec!(603780));
        assert_eq!(result.monthly_tax, dec!(50315));
        // Net: 440,000 - (32,000 + 6,250 + 5,000 + 2,000 + 1,000) - 50,315
        assert_eq!(result.monthly_net_pay, dec!(343435));
        assert_eq!(result.annual_net_pay, dec!(4121220));
        assert_eq!(result.ytd, None);
    }

    #[test]
    fn compute_excludes_life_assurance_and_gratuities_from_taxable_income() {
        let settings = test_settings();
        let mut input = test_input();
        let baseline = compute_paye(&settings, &input).unwrap();
        input.additional.life_assurance = dec!(50000);
        input.additional.gratuities = dec!(50000);

        let result = compute_paye(&settings, &input).unwrap();

        assert_eq!(result.annual_taxable_income, baseline.annual_taxable_income);
        assert_eq!(result.annual_tax, baseline.annual_tax);
        assert_eq!(result.annual_life_assurance, dec!(600000));
        assert_eq!(result.annual_gratuities, dec!(600000));
        assert_eq!(
            result.monthly_net_pay,
            baseline.monthly_net_pay - dec!(97000)
        );
    }

    #[test]
    fn compute_employer_cost() {
        let settings = test_settings();

        let result = compute_paye(&settings, &test_input()).unwrap();

        // 10% of 400,000 + 1% of 440,000 NSITF + 1% of 440,000 ITF
        assert_eq!(result.deductions.total_employer_contributions, dec!(48800));
        assert_eq!(result.employer_monthly_cost, dec!(488800));
        assert_eq!(result.employer_annual_cost, dec!(5865600));
    }

    #[test]
    fn compute_low_income_pays_no_tax() {
        let settings = test_settings();
        let input = EngineInput {
            salary: SalaryComponents {
                basic: dec!(30000),
                ..Default::default()
            },
            ..Default::default()
        };

        let result = compute_paye(&settings, &input).unwrap();

        assert_eq!(result.annual_gross, dec!(360000));
        assert_eq!(result.annual_tax, dec!(0));
        assert_eq!(result.monthly_tax, dec!(0));
    }

    #[test]
    fn compute_deductions_larger_than_gross() {
        let settings = test_settings();
        let input = EngineInput {
            salary: SalaryComponents {
                basic: dec!(10000),
                ..Default::default()
            },
            additional: AdditionalDeductions {
                nhis: dec!(20000),
                ..Default::default()
            },
            ..Default::default()
        };

        let result = compute_paye(&settings, &input).unwrap();

        assert_eq!(result.annual_taxable_income, dec!(0));
        assert_eq!(result.monthly_net_pay, dec!(0));
    }

    #[test]
    fn compute_weekly_per_period_figures() {
        let settings = test_settings();
        let mut input = test_input();
        input.cycle = PayCycle::Weekly;

        let result = compute_paye(&settings, &input).unwrap();

        assert_eq!(result.per_period.cycle, PayCycle::Weekly);
        // 440,000 / 4.33
        assert_eq!(result.per_period.gross, dec!(101616.63));
        // Annual figures do not depend on the cycle
        assert_eq!(result.annual_tax, dec!(603780));
    }

    #[test]
    fn compute_attaches_ytd_for_partial_year() {
        let settings = test_settings();
        let mut input = test_input();
        input.periods_worked = Some(6);

        let result = compute_paye(&settings, &input).unwrap();
        let ytd = result.ytd.expect("partial year should project");

        assert_eq!(ytd.months_worked, dec!(6));
        assert_eq!(ytd.fraction_of_year, dec!(0.5));
        assert_eq!(ytd.ytd_gross, dec!(2640000));
        assert_eq!(ytd.ytd_tax, dec!(301890));
        assert_eq!(ytd.ytd_net, dec!(2060610));
        assert_eq!(ytd.completion_percentage, dec!(50));
        assert_eq!(ytd.remaining_months, dec!(6));
    }

    #[test]
    fn compute_skips_ytd_for_full_year() {
        let settings = test_settings();
        let mut input = test_input();
        input.periods_worked = Some(12);

        let result = compute_paye(&settings, &input).unwrap();

        assert_eq!(result.ytd, None);
    }

    #[test]
    fn compute_reports_settings_source() {
        let mut settings = test_settings();
        settings.source = crate::SettingsSource::Configured;

        let result = compute_paye(&settings, &test_input()).unwrap();

        assert_eq!(result.settings_source, crate::SettingsSource::Configured);
    }

    #[test]
    fn compute_rejects_negative_rent() {
        let settings = test_settings();
        let mut input = test_input();
        input.annual_rent_paid = dec!(-1);

        let result = compute_paye(&settings, &input);

        assert_eq!(
            result,
            Err(EngineError::Deduction(DeductionError::NegativeAmount {
                field: "annual_rent_paid",
                value: dec!(-1)
            }))
        );
    }

    #[test]
    fn compute_propagates_deduction_errors() {
        let settings = test_settings();
        let mut input = test_input();
        input.salary.housing = dec!(-5);

        let result = compute_paye(&settings, &input);

        assert!(matches!(
            result,
            Err(EngineError::Deduction(DeductionError::NegativeAmount {
                field: "housing",
                ..
            }))
        ));
    }

    #[test]
    fn compute_fails_on_broken_schedule() {
        let mut settings = test_settings();
        settings.tax_brackets = vec![TaxBracket::new(dec!(0), Some(dec!(1000)), dec!(0), "")];

        let result = compute_paye(&settings, &test_input());

        assert_eq!(
            result,
            Err(EngineError::Tax(TaxError::InvalidSchedule(vec![
                ScheduleError::MissingUnbounded
            ])))
        );
    }

    #[test]
    fn compute_rejects_zero_employee_count() {
        let settings = test_settings();
        let mut input = test_input();
        input.additional.employee_count = 0;

        let result = compute_paye(&settings, &input);

        assert_eq!(
            result,
            Err(EngineError::Deduction(DeductionError::InvalidEmployeeCount(0)))
        );
        assert_eq!(
            result.unwrap_err().to_string(),
            "employee count must be at least 1, got 0"
        );
    }

    #[test]
    fn compute_rejects_out_of_range_pension_rate() {
        let mut settings = test_settings();
        settings.statutory_rates.employee_pension = dec!(1.5);

        let result = compute_paye(&settings, &test_input());

        assert_eq!(
            result,
            Err(EngineError::Settings(SettingsError::InvalidRate {
                field: "employee_pension",
                value: dec!(1.5)
            }))
        );
    }

    #[test]
    fn compute_rejects_negative_rent_relief_rate() {
        let mut settings = test_settings();
        settings.reliefs.rent_relief = dec!(-3);

        let result = compute_paye(&settings, &test_input());

        assert!(matches!(
            result,
            Err(EngineError::Settings(SettingsError::InvalidRate {
                field: "rent_relief",
                ..
            }))
        ));
    }

    #[test]
    fn compute_rejects_huge_rate_without_overflow() {
        let mut settings = test_settings();
        settings.statutory_rates.nsitf = Decimal::MAX;

        let result = compute_paye(&settings, &test_input());

        assert!(matches!(
            result,
            Err(EngineError::Settings(SettingsError::InvalidRate { field: "nsitf", .. }))
        ));
    }

    #[test]
    fn compute_rejects_negative_relief_cap() {
        let mut settings = test_settings();
        settings.reliefs.rent_relief_cap = dec!(-1);

        let result = compute_paye(&settings, &test_input());

        assert_eq!(
            result,
            Err(EngineError::Settings(SettingsError::NegativeReliefCap(dec!(-1))))
        );
    }

    #[test]
    fn compute_is_idempotent() {
        let settings = test_settings();
        let input = test_input();

        let first = compute_paye(&settings, &input).unwrap();
        let second = compute_paye(&settings, &input).unwrap();

        assert_eq!(first, second);
    }
}
