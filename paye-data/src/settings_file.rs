use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use paye_core::{PartialSettings, SettingsStore, StoreError};
use tracing::debug;

/// Settings store backed by a directory of TOML files, one per tax year.
///
/// `settings/2025.toml` holds the settings for tax year 2025. Every key is
/// optional; missing keys fall back to the built-in defaults when resolved.
///
/// ```toml
/// tax_year = 2025
///
/// [statutory_rates]
/// nhf = "0.025"
///
/// [[tax_brackets]]
/// min = "0"
/// max = "800000"
/// rate = "0"
/// description = "First 800,000"
/// ```
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    dir: PathBuf,
}

impl FileSettingsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, tax_year: i32) -> PathBuf {
        self.dir.join(format!("{tax_year}.toml"))
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn get_settings(&self, tax_year: i32) -> Result<PartialSettings, StoreError> {
        let path = self.path_for(tax_year);
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => StoreError::NotFound(tax_year),
                _ => StoreError::Unavailable(format!("{}: {err}", path.display())),
            })?;

        debug!(path = %path.display(), "read settings file");

        toml::from_str(&text)
            .map_err(|err| StoreError::Decode(format!("{}: {err}", path.display())))
    }

    async fn list_tax_years(&self) -> Result<Vec<i32>, StoreError> {
        let unavailable =
            |err: std::io::Error| StoreError::Unavailable(format!("{}: {err}", self.dir.display()));

        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(unavailable)?;
        let mut years = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(unavailable)? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "toml")
                && let Some(year) = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .and_then(|stem| stem.parse::<i32>().ok())
            {
                years.push(year);
            }
        }

        years.sort_unstable();
        Ok(years)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn fixture_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test-data/settings")
    }

    #[tokio::test]
    async fn reads_partial_settings_from_toml() {
        let store = FileSettingsStore::new(fixture_dir());

        let settings = store.get_settings(2025).await.unwrap();

        assert_eq!(settings.tax_year, Some(2025));
        let rates = settings.statutory_rates.unwrap();
        assert_eq!(rates.nhf, Some(dec!(0.025)));
        assert_eq!(rates.itf, None);
    }

    #[tokio::test]
    async fn missing_year_is_not_found() {
        let store = FileSettingsStore::new(fixture_dir());

        assert_eq!(store.get_settings(1999).await, Err(StoreError::NotFound(1999)));
    }

    #[tokio::test]
    async fn malformed_file_is_decode_error() {
        let store = FileSettingsStore::new(fixture_dir());

        let result = store.get_settings(2013).await;

        assert!(matches!(result, Err(StoreError::Decode(_))), "got {result:?}");
    }

    #[tokio::test]
    async fn lists_years_from_file_names() {
        let store = FileSettingsStore::new(fixture_dir());

        let years = store.list_tax_years().await.unwrap();

        assert_eq!(years, vec![2013, 2024, 2025]);
    }

    #[tokio::test]
    async fn listing_missing_dir_is_unavailable() {
        let store = FileSettingsStore::new(fixture_dir().join("does-not-exist"));

        assert!(matches!(
            store.list_tax_years().await,
            Err(StoreError::Unavailable(_))
        ));
    }
}
