use std::path::{Path, PathBuf};

use paye_core::store::MemorySettingsStore;
use paye_core::{PayrollSettings, SettingsError, SettingsStore, resolve_settings};
use thiserror::Error;
use tracing::{info, warn};

use crate::settings_file::FileSettingsStore;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("unknown settings backend '{0}' (expected 'file' or 'memory')")]
    Unknown(String),

    #[error("the file backend needs a settings directory")]
    MissingDirectory,

    #[error("a settings directory ({}) was given to the memory backend", .0.display())]
    UnusedDirectory(PathBuf),

    #[error("settings directory {}: {reason}", .dir.display())]
    BadDirectory { dir: PathBuf, reason: String },

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Where payroll settings are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsBackend {
    /// Nothing stored; every tax year resolves to the built-in defaults.
    Memory,
    /// A directory of `<year>.toml` files.
    File(PathBuf),
}

impl SettingsBackend {
    /// Picks a backend from a name and an optional settings directory.
    ///
    /// With no name, a directory selects `file` and its absence `memory`.
    pub fn select(
        name: Option<&str>,
        settings_dir: Option<&Path>,
    ) -> Result<Self, BackendError> {
        match (name, settings_dir) {
            (None | Some("file"), Some(dir)) => Ok(Self::File(dir.to_path_buf())),
            (Some("file"), None) => Err(BackendError::MissingDirectory),
            (None | Some("memory"), None) => Ok(Self::Memory),
            (Some("memory"), Some(dir)) => Err(BackendError::UnusedDirectory(dir.to_path_buf())),
            (Some(other), _) => Err(BackendError::Unknown(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File(_) => "file",
        }
    }

    /// Opens the store. A file backend's directory must already exist.
    pub async fn open(&self) -> Result<Box<dyn SettingsStore>, BackendError> {
        match self {
            Self::Memory => Ok(Box::new(MemorySettingsStore::new())),
            Self::File(dir) => {
                let bad = |reason: String| BackendError::BadDirectory {
                    dir: dir.clone(),
                    reason,
                };
                let metadata = tokio::fs::metadata(dir)
                    .await
                    .map_err(|err| bad(err.to_string()))?;
                if !metadata.is_dir() {
                    return Err(bad("not a directory".to_string()));
                }
                Ok(Box::new(FileSettingsStore::new(dir.clone())))
            }
        }
    }

    /// Opens the store and resolves the settings for `tax_year`.
    ///
    /// Falling back to the built-in defaults is expected for the memory
    /// backend and logged at `info`; for a file backend it means the year's
    /// file is missing or unreadable and is logged at `warn`.
    pub async fn load_settings(&self, tax_year: i32) -> Result<PayrollSettings, BackendError> {
        let store = self.open().await?;
        let settings = resolve_settings(store.as_ref(), tax_year).await?;

        if settings.is_default() {
            match self {
                Self::Memory => info!(tax_year, "no settings backend configured; using built-in defaults"),
                Self::File(dir) => warn!(
                    tax_year,
                    dir = %dir.display(),
                    "no usable settings file for this year; using built-in defaults"
                ),
            }
        }

        Ok(settings)
    }
}
