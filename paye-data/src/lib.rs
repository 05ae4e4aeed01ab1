//! Data sources for the PAYE engine: CSV bracket schedules, per-year TOML
//! settings and command-line amount parsing.

pub mod amount;
pub mod backend;
pub mod loader;
pub mod settings_file;

pub use amount::{ParseAmountError, parse_amount};
pub use backend::{BackendError, SettingsBackend};
pub use loader::{BracketLoader, BracketLoaderError, BracketRecord};
pub use settings_file::FileSettingsStore;
