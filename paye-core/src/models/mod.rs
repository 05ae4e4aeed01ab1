mod computation;
mod pay_cycle;
mod salary;
mod settings;
mod tax_bracket;

pub use computation::{
    BracketTax, ComputationResult, DeductionBreakdown, PeriodFigures, TaxComputation,
    YtdProjection,
};
pub use pay_cycle::PayCycle;
pub use salary::{AdditionalDeductions, SalaryComponents};
pub use settings::{
    PartialReliefs, PartialSettings, PartialStatutoryRates, PayrollSettings, Reliefs,
    SettingsError, SettingsSource, StatutoryRates, default_tax_brackets,
};
pub use tax_bracket::TaxBracket;
