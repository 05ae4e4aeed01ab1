use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{PartialSettings, PayrollSettings, SettingsError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("No settings stored for tax year {0}")]
    NotFound(i32),

    #[error("Settings store unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed settings: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Source of payroll settings, one record per tax year.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get_settings(&self, tax_year: i32) -> Result<PartialSettings, StoreError>;
    async fn list_tax_years(&self) -> Result<Vec<i32>, StoreError>;
}

/// In-process store, mostly useful for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    years: HashMap<i32, PartialSettings>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `settings` under `tax_year`, replacing any previous record.
    pub fn insert(
        &mut self,
        tax_year: i32,
        settings: PartialSettings,
    ) {
        self.years.insert(tax_year, settings);
    }

    pub fn get(&self, tax_year: i32) -> Option<&PartialSettings> {
        self.years.get(&tax_year)
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get_settings(&self, tax_year: i32) -> Result<PartialSettings, StoreError> {
        self.years
            .get(&tax_year)
            .cloned()
            .ok_or(StoreError::NotFound(tax_year))
    }

    async fn list_tax_years(&self) -> Result<Vec<i32>, StoreError> {
        let mut years: Vec<_> = self.years.keys().copied().collect();
        years.sort_unstable();
        Ok(years)
    }
}

/// Loads the settings for `tax_year`, falling back to the built-in defaults
/// when the store cannot supply them.
///
/// The returned settings carry [`SettingsSource::Defaults`](crate::SettingsSource::Defaults)
/// in that case so callers can warn the user; computation can still proceed.
///
/// # Errors
///
/// Settings that the store *did* return but that are invalid are not
/// replaced; the [`SettingsError`] is returned instead.
pub async fn resolve_settings(
    store: &dyn SettingsStore,
    tax_year: i32,
) -> Result<PayrollSettings, SettingsError> {
    match store.get_settings(tax_year).await {
        Ok(partial) => {
            debug!(tax_year, "settings loaded from store");
            PayrollSettings::from_partial(partial, tax_year)
        }
        Err(error) => {
            warn!(tax_year, %error, "settings unavailable, using default schedule and rates");
            Ok(PayrollSettings::defaults(tax_year))
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{PartialStatutoryRates, SettingsSource, TaxBracket};

    struct UnreachableStore;

    #[async_trait]
    impl SettingsStore for UnreachableStore {
        async fn get_settings(&self, _tax_year: i32) -> Result<PartialSettings, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        async fn list_tax_years(&self) -> Result<Vec<i32>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    fn store_with_2025() -> MemorySettingsStore {
        let mut store = MemorySettingsStore::new();
        store.insert(
            2025,
            PartialSettings {
                tax_year: Some(2025),
                statutory_rates: Some(PartialStatutoryRates {
                    nhf: Some(dec!(0.03)),
                    ..Default::default()
                }),
                ..Default::default()
            },
        );
        store
    }

    #[tokio::test]
    async fn memory_store_lists_years_sorted() {
        let mut store = store_with_2025();
        store.insert(2023, PartialSettings::default());

        assert_eq!(store.list_tax_years().await, Ok(vec![2023, 2025]));
    }

    #[tokio::test]
    async fn memory_store_missing_year_is_not_found() {
        let store = store_with_2025();

        assert_eq!(store.get_settings(2019).await, Err(StoreError::NotFound(2019)));
    }

    #[tokio::test]
    async fn resolve_uses_stored_settings() {
        let store = store_with_2025();

        let settings = resolve_settings(&store, 2025).await.unwrap();

        assert_eq!(settings.source, SettingsSource::Configured);
        assert_eq!(settings.statutory_rates.nhf, dec!(0.03));
        assert_eq!(settings.statutory_rates.itf, dec!(0.01));
    }

    #[tokio::test]
    async fn resolve_falls_back_for_missing_year() {
        let store = store_with_2025();

        let settings = resolve_settings(&store, 2030).await.unwrap();

        assert_eq!(settings, PayrollSettings::defaults(2030));
        assert!(settings.is_default());
    }

    #[tokio::test]
    async fn resolve_falls_back_when_store_unreachable() {
        let settings = resolve_settings(&UnreachableStore, 2025).await.unwrap();

        assert_eq!(settings.source, SettingsSource::Defaults);
    }

    #[tokio::test]
    async fn resolve_rejects_invalid_stored_schedule() {
        let mut store = MemorySettingsStore::new();
        store.insert(
            2025,
            PartialSettings {
                tax_brackets: Some(vec![TaxBracket::new(dec!(100), None, dec!(0.1), "")]),
                ..Default::default()
            },
        );

        let result = resolve_settings(&store, 2025).await;

        assert!(matches!(result, Err(SettingsError::InvalidSchedule(_))));
    }
}
