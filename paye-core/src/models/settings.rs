//! Payroll settings consumed by the engine.
//!
//! Settings arrive from an external store with any field possibly missing.
//! [`PartialSettings`] mirrors that shape; [`PayrollSettings::from_partial`]
//! fills the gaps from the documented defaults and validates the result, so
//! every calculator downstream works with fully populated values.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::TaxBracket;
use crate::calculations::schedule::{ScheduleError, validate_schedule};

/// Where a [`PayrollSettings`] value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsSource {
    /// Read from the settings store (possibly completed with defaults).
    #[default]
    Configured,
    /// The store was unavailable; the built-in defaults are in use.
    Defaults,
    /// The store was unavailable and a bracket schedule was supplied
    /// separately; statutory rates and reliefs are the built-in defaults.
    DefaultRates,
}

/// Errors raised when assembling settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid tax bracket schedule: {}", join_errors(.0))]
    InvalidSchedule(Vec<ScheduleError>),

    #[error("{field} must be between 0 and 1, got {value}")]
    InvalidRate { field: &'static str, value: Decimal },

    #[error("rent relief cap must be non-negative, got {0}")]
    NegativeReliefCap(Decimal),
}

fn join_errors(errors: &[ScheduleError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Statutory contribution rates, expressed as ratios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryRates {
    pub employee_pension: Decimal,
    pub employer_pension: Decimal,
    pub nhf: Decimal,
    /// Reference rate only; the NHIS deduction itself is a caller-supplied amount.
    pub nhis: Decimal,
    pub nsitf: Decimal,
    pub itf: Decimal,
}

impl Default for StatutoryRates {
    fn default() -> Self {
        Self {
            employee_pension: Decimal::new(8, 2),
            employer_pension: Decimal::new(10, 2),
            nhf: Decimal::new(25, 3),
            nhis: Decimal::new(5, 2),
            nsitf: Decimal::new(1, 2),
            itf: Decimal::new(1, 2),
        }
    }
}

impl StatutoryRates {
    fn fields(&self) -> [(&'static str, Decimal); 6] {
        [
            ("employee_pension", self.employee_pension),
            ("employer_pension", self.employer_pension),
            ("nhf", self.nhf),
            ("nhis", self.nhis),
            ("nsitf", self.nsitf),
            ("itf", self.itf),
        ]
    }
}

/// Relief rules applied before the progressive tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reliefs {
    /// Share of annual rent paid that is relieved.
    pub rent_relief: Decimal,
    /// Upper limit on the annual rent relief.
    pub rent_relief_cap: Decimal,
}

impl Default for Reliefs {
    fn default() -> Self {
        Self {
            rent_relief: Decimal::new(20, 2),
            rent_relief_cap: Decimal::new(500_000, 0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialStatutoryRates {
    pub employee_pension: Option<Decimal>,
    pub employer_pension: Option<Decimal>,
    pub nhf: Option<Decimal>,
    pub nhis: Option<Decimal>,
    pub nsitf: Option<Decimal>,
    pub itf: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialReliefs {
    pub rent_relief: Option<Decimal>,
    pub rent_relief_cap: Option<Decimal>,
}

/// Settings as stored, with every field optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialSettings {
    pub tax_year: Option<i32>,
    pub tax_brackets: Option<Vec<TaxBracket>>,
    pub statutory_rates: Option<PartialStatutoryRates>,
    pub reliefs: Option<PartialReliefs>,
}

/// Fully populated settings for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollSettings {
    pub tax_year: i32,
    pub tax_brackets: Vec<TaxBracket>,
    pub statutory_rates: StatutoryRates,
    pub reliefs: Reliefs,
    #[serde(skip)]
    pub source: SettingsSource,
}

/// The built-in progressive schedule.
pub fn default_tax_brackets() -> Vec<TaxBracket> {
    let band = |min: i64, max: Option<i64>, rate_pct: i64, description: &str| {
        TaxBracket::new(
            Decimal::from(min),
            max.map(Decimal::from),
            Decimal::new(rate_pct, 2),
            description,
        )
    };

    vec![
        band(0, Some(800_000), 0, "First 800,000 (tax free)"),
        band(800_000, Some(3_000_000), 15, "Next 2,200,000"),
        band(3_000_000, Some(12_000_000), 18, "Next 9,000,000"),
        band(12_000_000, Some(25_000_000), 21, "Next 13,000,000"),
        band(25_000_000, Some(50_000_000), 23, "Next 25,000,000"),
        band(50_000_000, None, 25, "Above 50,000,000"),
    ]
}

impl PayrollSettings {
    /// The documented fallback settings for `tax_year`.
    pub fn defaults(tax_year: i32) -> Self {
        Self {
            tax_year,
            tax_brackets: default_tax_brackets(),
            statutory_rates: StatutoryRates::default(),
            reliefs: Reliefs::default(),
            source: SettingsSource::Defaults,
        }
    }

    /// Completes `partial` from the defaults and validates the result.
    ///
    /// An absent or empty bracket list is replaced with
    /// [`default_tax_brackets`]; a present one must be a valid schedule.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the schedule, a rate, or the relief cap
    /// is invalid.
    pub fn from_partial(
        partial: PartialSettings,
        fallback_year: i32,
    ) -> Result<Self, SettingsError> {
        let base_rates = StatutoryRates::default();
        let rates = partial.statutory_rates.unwrap_or_default();
        let base_reliefs = Reliefs::default();
        let reliefs = partial.reliefs.unwrap_or_default();

        let tax_brackets = match partial.tax_brackets {
            Some(brackets) if !brackets.is_empty() => brackets,
            _ => default_tax_brackets(),
        };

        let settings = Self {
            tax_year: partial.tax_year.unwrap_or(fallback_year),
            tax_brackets,
            statutory_rates: StatutoryRates {
                employee_pension: rates.employee_pension.unwrap_or(base_rates.employee_pension),
                employer_pension: rates.employer_pension.unwrap_or(base_rates.employer_pension),
                nhf: rates.nhf.unwrap_or(base_rates.nhf),
                nhis: rates.nhis.unwrap_or(base_rates.nhis),
                nsitf: rates.nsitf.unwrap_or(base_rates.nsitf),
                itf: rates.itf.unwrap_or(base_rates.itf),
            },
            reliefs: Reliefs {
                rent_relief: reliefs.rent_relief.unwrap_or(base_reliefs.rent_relief),
                rent_relief_cap: reliefs
                    .rent_relief_cap
                    .unwrap_or(base_reliefs.rent_relief_cap),
            },
            source: SettingsSource::Configured,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Checks the schedule invariants, rate ranges and relief cap.
    ///
    /// # Errors
    ///
    /// Returns the first class of problem found as a [`SettingsError`].
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_schedule(&self.tax_brackets).map_err(SettingsError::InvalidSchedule)?;
        self.validate_rates()
    }

    /// Checks statutory rates and reliefs only, leaving the bracket schedule
    /// to the tax calculator.
    pub fn validate_rates(&self) -> Result<(), SettingsError> {
        for (field, value) in self.statutory_rates.fields() {
            if !is_ratio(value) {
                return Err(SettingsError::InvalidRate { field, value });
            }
        }
        if !is_ratio(self.reliefs.rent_relief) {
            return Err(SettingsError::InvalidRate {
                field: "rent_relief",
                value: self.reliefs.rent_relief,
            });
        }
        if self.reliefs.rent_relief_cap < Decimal::ZERO {
            return Err(SettingsError::NegativeReliefCap(self.reliefs.rent_relief_cap));
        }

        Ok(())
    }

    /// Replaces the bracket schedule, keeping rates and reliefs.
    ///
    /// Settings that were entirely defaults become
    /// [`SettingsSource::DefaultRates`], since the schedule no longer is.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidSchedule`] and leaves nothing changed
    /// if `brackets` is not a valid schedule.
    pub fn with_schedule(
        self,
        brackets: Vec<TaxBracket>,
    ) -> Result<Self, SettingsError> {
        validate_schedule(&brackets).map_err(SettingsError::InvalidSchedule)?;

        let source = match self.source {
            SettingsSource::Defaults => SettingsSource::DefaultRates,
            other => other,
        };
        Ok(Self {
            tax_brackets: brackets,
            source,
            ..self
        })
    }

    pub fn is_default(&self) -> bool {
        self.source == SettingsSource::Defaults
    }
}

fn is_ratio(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn defaults_match_documented_schedule() {
        let settings = PayrollSettings::defaults(2026);

        assert_eq!(settings.tax_brackets.len(), 6);
        assert_eq!(settings.tax_brackets[1].min, dec!(800000));
        assert_eq!(settings.tax_brackets[1].rate, dec!(0.15));
        assert_eq!(settings.tax_brackets[5].max, None);
        assert_eq!(settings.statutory_rates.nhf, dec!(0.025));
        assert_eq!(settings.reliefs.rent_relief_cap, dec!(500000));
        assert!(settings.is_default());
        assert_eq!(settings.validate(), Ok(()));
    }

    #[test]
    fn from_partial_fills_missing_fields() {
        let partial = PartialSettings {
            tax_year: Some(2026),
            tax_brackets: None,
            statutory_rates: Some(PartialStatutoryRates {
                employee_pension: Some(dec!(0.075)),
                ..Default::default()
            }),
            reliefs: None,
        };

        let settings = PayrollSettings::from_partial(partial, 2025).unwrap();

        assert_eq!(settings.tax_year, 2026);
        assert_eq!(settings.statutory_rates.employee_pension, dec!(0.075));
        assert_eq!(settings.statutory_rates.employer_pension, dec!(0.10));
        assert_eq!(settings.reliefs, Reliefs::default());
        assert_eq!(settings.tax_brackets, default_tax_brackets());
        assert_eq!(settings.source, SettingsSource::Configured);
    }

    #[test]
    fn from_partial_uses_fallback_year() {
        let settings = PayrollSettings::from_partial(PartialSettings::default(), 2024).unwrap();

        assert_eq!(settings.tax_year, 2024);
    }

    #[test]
    fn from_partial_treats_empty_schedule_as_missing() {
        let partial = PartialSettings {
            tax_brackets: Some(vec![]),
            ..Default::default()
        };

        let settings = PayrollSettings::from_partial(partial, 2025).unwrap();

        assert_eq!(settings.tax_brackets, default_tax_brackets());
    }

    #[test]
    fn from_partial_rejects_rate_above_one() {
        let partial = PartialSettings {
            statutory_rates: Some(PartialStatutoryRates {
                itf: Some(dec!(1.5)),
                ..Default::default()
            }),
            ..Default::default()
        };

        let result = PayrollSettings::from_partial(partial, 2025);

        assert_eq!(
            result,
            Err(SettingsError::InvalidRate {
                field: "itf",
                value: dec!(1.5)
            })
        );
    }

    #[test]
    fn from_partial_rejects_negative_cap() {
        let partial = PartialSettings {
            reliefs: Some(PartialReliefs {
                rent_relief: None,
                rent_relief_cap: Some(dec!(-1)),
            }),
            ..Default::default()
        };

        let result = PayrollSettings::from_partial(partial, 2025);

        assert_eq!(result, Err(SettingsError::NegativeReliefCap(dec!(-1))));
    }

    #[test]
    fn from_partial_rejects_broken_schedule() {
        let partial = PartialSettings {
            tax_brackets: Some(vec![
                TaxBracket::new(dec!(0), Some(dec!(1000)), dec!(0), ""),
                TaxBracket::new(dec!(1500), None, dec!(0.1), ""),
            ]),
            ..Default::default()
        };

        let result = PayrollSettings::from_partial(partial, 2025);

        assert!(matches!(result, Err(SettingsError::InvalidSchedule(_))));
    }

    #[test]
    fn with_schedule_marks_default_rates() {
        let brackets = vec![
            TaxBracket::new(dec!(0), Some(dec!(1000)), dec!(0), ""),
            TaxBracket::new(dec!(1000), None, dec!(0.1), ""),
        ];

        let settings = PayrollSettings::defaults(2025)
            .with_schedule(brackets.clone())
            .unwrap();

        assert_eq!(settings.source, SettingsSource::DefaultRates);
        assert!(!settings.is_default());
        assert_eq!(settings.tax_brackets, brackets);
        assert_eq!(settings.statutory_rates, StatutoryRates::default());
    }

    #[test]
    fn with_schedule_keeps_configured_source() {
        let configured =
            PayrollSettings::from_partial(PartialSettings::default(), 2025).unwrap();

        let settings = configured.with_schedule(default_tax_brackets()).unwrap();

        assert_eq!(settings.source, SettingsSource::Configured);
    }

    #[test]
    fn with_schedule_rejects_invalid_schedule() {
        let brackets = vec![TaxBracket::new(dec!(0), Some(dec!(1000)), dec!(0), "")];

        let result = PayrollSettings::defaults(2025).with_schedule(brackets);

        assert_eq!(
            result,
            Err(SettingsError::InvalidSchedule(vec![ScheduleError::MissingUnbounded]))
        );
    }
}
