use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::format_amount;
use crate::{PayCycle, SettingsSource};

/// Income allocated to one bracket and the tax it attracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketTax {
    pub label: String,
    pub min: Decimal,
    pub max: Option<Decimal>,
    pub rate: Decimal,
    pub taxable_amount: Decimal,
    /// Unrounded; only the total is rounded.
    pub tax: Decimal,
}

/// Output of the progressive tax calculator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxComputation {
    pub taxable_income: Decimal,
    pub total_tax: Decimal,
    pub breakdown: Vec<BracketTax>,
}

/// Monthly statutory deductions, employee and employer sides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionBreakdown {
    pub gross_emolument: Decimal,
    pub pensionable_emoluments: Decimal,

    // Employee side
    pub employee_pension: Decimal,
    pub nhf: Decimal,
    pub nhis: Decimal,
    pub life_assurance: Decimal,
    pub gratuities: Decimal,
    pub total_employee_deductions: Decimal,

    // Employer side
    pub employer_pension: Decimal,
    pub nsitf: Decimal,
    pub itf: Decimal,
    pub itf_applicable: bool,
    pub total_employer_contributions: Decimal,
}

/// Gross, tax and net expressed in the declared pay cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodFigures {
    pub cycle: PayCycle,
    pub gross: Decimal,
    pub tax: Decimal,
    pub net: Decimal,
}

/// Linear year-to-date share of a full-year result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YtdProjection {
    pub periods_worked: u32,
    pub cycle: PayCycle,
    pub months_worked: Decimal,
    pub fraction_of_year: Decimal,
    pub ytd_gross: Decimal,
    pub ytd_tax: Decimal,
    pub ytd_net: Decimal,
    pub completion_percentage: Decimal,
    pub remaining_months: Decimal,
}

/// Everything the engine derives for one employee and one set of settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationResult {
    pub tax_year: i32,
    pub cycle: PayCycle,
    pub settings_source: SettingsSource,

    pub monthly_gross: Decimal,
    pub annual_gross: Decimal,
    pub deductions: DeductionBreakdown,

    // Annualized figures feeding taxable income
    pub annual_pension: Decimal,
    pub annual_nhf: Decimal,
    pub annual_nhis: Decimal,
    pub rent_relief: Decimal,
    pub total_annual_deductions: Decimal,

    // Reported, but not deducted before tax
    pub annual_life_assurance: Decimal,
    pub annual_gratuities: Decimal,

    pub annual_taxable_income: Decimal,
    pub tax: TaxComputation,
    pub annual_tax: Decimal,
    pub monthly_tax: Decimal,

    pub monthly_net_pay: Decimal,
    pub annual_net_pay: Decimal,

    pub employer_monthly_cost: Decimal,
    pub employer_annual_cost: Decimal,

    pub per_period: PeriodFigures,
    pub ytd: Option<YtdProjection>,
}

fn money(value: Decimal) -> String {
    format_amount(value.round_dp(2))
}

impl fmt::Display for ComputationResult {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "PAYE computation, tax year {}", self.tax_year)?;
        match self.settings_source {
            SettingsSource::Configured => {}
            SettingsSource::Defaults => {
                writeln!(f, "  (settings unavailable: default schedule and rates in use)")?;
            }
            SettingsSource::DefaultRates => {
                writeln!(f, "  (settings unavailable: default rates and reliefs in use)")?;
            }
        }
        writeln!(f, "  Gross (monthly / annual):   {} / {}", money(self.monthly_gross), money(self.annual_gross))?;
        writeln!(f, "  Pension (employee):         {}", money(self.deductions.employee_pension))?;
        writeln!(f, "  NHF:                        {}", money(self.deductions.nhf))?;
        writeln!(f, "  NHIS:                       {}", money(self.deductions.nhis))?;
        writeln!(f, "  Life assurance:             {}", money(self.deductions.life_assurance))?;
        writeln!(f, "  Gratuities:                 {}", money(self.deductions.gratuities))?;
        writeln!(f, "  Rent relief (annual):       {}", money(self.rent_relief))?;
        writeln!(f, "  Taxable income (annual):    {}", money(self.annual_taxable_income))?;
        for row in &self.tax.breakdown {
            writeln!(f, "    {:<32} {:>16} -> {}", row.label, money(row.taxable_amount), money(row.tax))?;
        }
        writeln!(f, "  Tax (monthly / annual):     {} / {}", money(self.monthly_tax), money(self.annual_tax))?;
        writeln!(f, "  Net pay (monthly / annual): {} / {}", money(self.monthly_net_pay), money(self.annual_net_pay))?;
        writeln!(f, "  Employer cost (monthly):    {}", money(self.employer_monthly_cost))?;
        writeln!(
            f,
            "  Per {} period: gross {}, tax {}, net {}",
            self.per_period.cycle.as_str(),
            money(self.per_period.gross),
            money(self.per_period.tax),
            money(self.per_period.net)
        )?;
        if let Some(ytd) = &self.ytd {
            writeln!(
                f,
                "  Year to date ({}% complete): gross {}, tax {}, net {}",
                ytd.completion_percentage,
                money(ytd.ytd_gross),
                money(ytd.ytd_tax),
                money(ytd.ytd_net)
            )?;
        }
        Ok(())
    }
}
