pub mod calculations;
pub mod models;
pub mod store;

pub use calculations::{EngineError, EngineInput, PayeEngine, compute_paye};
pub use models::*;
pub use store::{SettingsStore, StoreError, resolve_settings};
