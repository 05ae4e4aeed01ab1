//! PAYE calculation modules.
//!
//! Each calculator is a pure function of its inputs; [`engine`] composes them
//! into a single computation per employee.

pub mod common;
pub mod cycle;
pub mod deductions;
pub mod engine;
pub mod progressive;
pub mod relief;
pub mod schedule;

pub use cycle::{convert, project_ytd};
pub use deductions::{DeductionError, StatutoryDeductions, compute_deductions};
pub use engine::{EngineError, EngineInput, PayeEngine, compute_paye};
pub use progressive::{ProgressiveTax, TaxError, compute_tax};
pub use relief::compute_rent_relief;
pub use schedule::{
    BracketEdit, ScheduleError, ScheduleUpdate, ScheduleWarning, add_bracket, apply_edit,
    remove_bracket, validate_schedule,
};
