use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Monthly salary components for one employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalaryComponents {
    pub basic: Decimal,
    pub housing: Decimal,
    pub transport: Decimal,
    pub entertainment: Decimal,
    pub meal_subsidy: Decimal,
    pub medical: Decimal,
    pub benefits_in_kind: Decimal,
}

impl SalaryComponents {
    /// Named view over every component, in declaration order.
    pub fn fields(&self) -> [(&'static str, Decimal); 7] {
        [
            ("basic", self.basic),
            ("housing", self.housing),
            ("transport", self.transport),
            ("entertainment", self.entertainment),
            ("meal_subsidy", self.meal_subsidy),
            ("medical", self.medical),
            ("benefits_in_kind", self.benefits_in_kind),
        ]
    }

    /// Sum of all components.
    pub fn gross(&self) -> Decimal {
        self.fields().iter().map(|(_, v)| *v).sum()
    }

    /// Base for pension contributions: basic + housing + transport.
    pub fn pensionable(&self) -> Decimal {
        self.basic + self.housing + self.transport
    }
}

/// Flat monthly deductions and employer facts supplied alongside the salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditionalDeductions {
    pub nhis: Decimal,
    pub life_assurance: Decimal,
    pub gratuities: Decimal,
    /// Headcount of the employing entity; ITF applies from 5 employees.
    pub employee_count: u32,
}

impl Default for AdditionalDeductions {
    fn default() -> Self {
        Self {
            nhis: Decimal::ZERO,
            life_assurance: Decimal::ZERO,
            gratuities: Decimal::ZERO,
            employee_count: 1,
        }
    }
}
