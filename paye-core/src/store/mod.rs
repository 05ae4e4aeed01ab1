pub mod settings_store;

pub use settings_store::{MemorySettingsStore, SettingsStore, StoreError, resolve_settings};
