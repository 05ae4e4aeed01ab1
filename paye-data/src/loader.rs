use std::collections::BTreeSet;
use std::io::Read;

use paye_core::calculations::schedule::{ScheduleError, validate_schedule};
use paye_core::store::MemorySettingsStore;
use paye_core::TaxBracket;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur when loading tax bracket data.
#[derive(Debug, Error)]
pub enum BracketLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("No brackets found for tax year {0}")]
    NoBracketsForYear(i32),

    #[error("Invalid schedule for tax year {tax_year}: {}", join(.errors))]
    InvalidSchedule {
        tax_year: i32,
        errors: Vec<ScheduleError>,
    },
}

fn join(errors: &[ScheduleError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<csv::Error> for BracketLoaderError {
    fn from(err: csv::Error) -> Self {
        BracketLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from a tax brackets CSV file.
///
/// - `tax_year`: The tax year the bracket belongs to (e.g., 2025)
/// - `min`: Lower bound of the bracket
/// - `max`: Upper bound of the bracket (empty for unbounded)
/// - `rate`: The marginal tax rate as a decimal (e.g., 0.15 for 15%)
/// - `description`: Optional label shown in tax breakdowns
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub tax_year: i32,
    pub min: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max: Option<Decimal>,
    pub rate: Decimal,
    #[serde(default)]
    pub description: String,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

impl From<&BracketRecord> for TaxBracket {
    fn from(record: &BracketRecord) -> Self {
        TaxBracket::new(record.min, record.max, record.rate, record.description.trim())
    }
}

/// Loader for tax bracket schedules from CSV files.
///
/// A file may hold schedules for several tax years; each year's rows form
/// one schedule and are validated independently.
pub struct BracketLoader;

impl BracketLoader {
    /// Parse bracket records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a byte slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, BracketLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Builds the validated schedule for `tax_year` from `records`.
    ///
    /// Rows are ordered by `min` before validation, so the file itself need
    /// not be sorted.
    pub fn into_schedule(
        records: &[BracketRecord],
        tax_year: i32,
    ) -> Result<Vec<TaxBracket>, BracketLoaderError> {
        let mut brackets: Vec<TaxBracket> = records
            .iter()
            .filter(|r| r.tax_year == tax_year)
            .map(TaxBracket::from)
            .collect();

        if brackets.is_empty() {
            return Err(BracketLoaderError::NoBracketsForYear(tax_year));
        }

        brackets.sort_by(|a, b| a.min.cmp(&b.min));

        let warnings = validate_schedule(&brackets)
            .map_err(|errors| BracketLoaderError::InvalidSchedule { tax_year, errors })?;
        for warning in warnings {
            warn!(tax_year, ?warning, "loaded schedule has a decreasing rate");
        }

        Ok(brackets)
    }

    /// Load every year's schedule from `records` into `store`.
    ///
    /// Each year replaces any schedule already stored for it, while keeping
    /// that year's other settings. Every year is validated before the store
    /// is touched, so a bad year leaves the store unchanged. Running the same
    /// load twice yields the same store contents. Returns the number of
    /// schedules loaded.
    pub fn load(
        store: &mut MemorySettingsStore,
        records: &[BracketRecord],
    ) -> Result<usize, BracketLoaderError> {
        let years: BTreeSet<i32> = records.iter().map(|r| r.tax_year).collect();

        let schedules = years
            .iter()
            .map(|&tax_year| Ok((tax_year, Self::into_schedule(records, tax_year)?)))
            .collect::<Result<Vec<_>, BracketLoaderError>>()?;

        let loaded = schedules.len();
        for (tax_year, brackets) in schedules {
            debug!(tax_year, brackets = brackets.len(), "loading schedule");

            let mut settings = store.get(tax_year).cloned().unwrap_or_default();
            settings.tax_year = Some(tax_year);
            settings.tax_brackets = Some(brackets);
            store.insert(tax_year, settings);
        }

        Ok(loaded)
    }
}
