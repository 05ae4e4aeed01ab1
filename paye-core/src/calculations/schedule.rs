//! Tax bracket schedule validation and editing.
//!
//! A valid schedule partitions `[0, ∞)`:
//!
//! - the first bracket starts at 0;
//! - each bracket starts where the previous one ends (`next.min == prev.max`);
//! - every finite bracket has `max > min`;
//! - exactly one bracket is unbounded, and it is the last;
//! - every rate lies in `[0, 1]`.
//!
//! A rate lower than the preceding bracket's rate is allowed but reported as
//! a [`ScheduleWarning`].
//!
//! Editing operations never mutate their input. They return a new, fully
//! validated schedule or the list of errors that prevented the change.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use paye_core::calculations::schedule::{BracketEdit, apply_edit};
//! use paye_core::default_tax_brackets;
//!
//! let brackets = default_tax_brackets();
//! let update = apply_edit(&brackets, 1, BracketEdit::SetMax(Some(dec!(3500000)))).unwrap();
//!
//! assert_eq!(update.brackets[1].max, Some(dec!(3500000)));
//! assert_eq!(update.brackets[2].min, dec!(3500000));
//! assert_eq!(brackets[1].max, Some(dec!(3000000)));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::TaxBracket;

/// Width given to a bracket created by [`add_bracket`].
pub const NEW_BRACKET_WIDTH: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Rate step between a new bracket and its predecessor.
pub const NEW_BRACKET_RATE_STEP: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Smallest schedule size from which [`remove_bracket`] may remove.
pub const MIN_BRACKETS_FOR_REMOVAL: usize = 3;

/// A structural problem with a schedule or a rejected edit.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleError {
    #[error("schedule has no brackets")]
    Empty,

    #[error("bracket index {index} out of range for {len} brackets")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("bracket 0: first bracket must start at 0, got {min}")]
    FirstMinNotZero { min: Decimal },

    #[error("bracket {index}: gap after previous bracket (expected min {expected}, got {found})")]
    Gap {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    #[error("bracket {index}: overlaps previous bracket (expected min {expected}, got {found})")]
    Overlap {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    #[error("bracket {index}: max {max} must be greater than min {min}")]
    EmptyRange {
        index: usize,
        min: Decimal,
        max: Decimal,
    },

    #[error("bracket {index}: only the last bracket may be unbounded")]
    UnboundedNotLast { index: usize },

    #[error("last bracket must be unbounded")]
    MissingUnbounded,

    #[error("bracket {index}: rate must be between 0 and 1, got {rate}")]
    RateOutOfRange { index: usize, rate: Decimal },

    #[error("bracket {index}: min {min} must be greater than previous bracket's min {previous_min}")]
    MinNotAbovePrevious {
        index: usize,
        min: Decimal,
        previous_min: Decimal,
    },

    #[error("bracket {index}: min {min} must be less than max {max}")]
    MinNotBelowMax {
        index: usize,
        min: Decimal,
        max: Decimal,
    },

    #[error("bracket {index}: max {max} must be greater than min {min}")]
    MaxNotAboveMin {
        index: usize,
        max: Decimal,
        min: Decimal,
    },

    #[error("bracket {index}: max {max} must be less than next bracket's max {next_max}")]
    MaxNotBelowNext {
        index: usize,
        max: Decimal,
        next_max: Decimal,
    },

    #[error("bracket {index}: the last bracket must stay unbounded")]
    TerminalMustBeUnbounded { index: usize },

    #[error(
        "cannot remove a bracket from a schedule of {len}; at least {min} required",
        min = MIN_BRACKETS_FOR_REMOVAL
    )]
    TooFewBrackets { len: usize },
}

/// A non-fatal observation about a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleWarning {
    /// A bracket's rate is below the rate of the bracket before it.
    RateDecrease {
        index: usize,
        rate: Decimal,
        previous_rate: Decimal,
    },
}

/// One field change requested on a single bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BracketEdit {
    SetMin(Decimal),
    /// `None` requests an unbounded upper limit.
    SetMax(Option<Decimal>),
    SetRate(Decimal),
    SetDescription(String),
}

/// A validated schedule produced by an editing operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleUpdate {
    pub brackets: Vec<TaxBracket>,
    pub warnings: Vec<ScheduleWarning>,
}

/// Checks every schedule invariant, collecting all violations.
///
/// # Errors
///
/// Returns every [`ScheduleError`] found. On success the non-fatal warnings
/// are returned instead.
pub fn validate_schedule(brackets: &[TaxBracket]) -> Result<Vec<ScheduleWarning>, Vec<ScheduleError>> {
    let Some(first) = brackets.first() else {
        return Err(vec![ScheduleError::Empty]);
    };

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let last_index = brackets.len() - 1;

    if !first.min.is_zero() {
        errors.push(ScheduleError::FirstMinNotZero { min: first.min });
    }

    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
            errors.push(ScheduleError::RateOutOfRange {
                index,
                rate: bracket.rate,
            });
        }

        match bracket.max {
            Some(max) if max <= bracket.min => errors.push(ScheduleError::EmptyRange {
                index,
                min: bracket.min,
                max,
            }),
            None if index != last_index => {
                errors.push(ScheduleError::UnboundedNotLast { index });
            }
            _ => {}
        }
    }

    if brackets[last_index].max.is_some() {
        errors.push(ScheduleError::MissingUnbounded);
    }

    for (offset, pair) in brackets.windows(2).enumerate() {
        let (prev, next) = (&pair[0], &pair[1]);
        let index = offset + 1;

        if let Some(prev_max) = prev.max {
            if next.min > prev_max {
                errors.push(ScheduleError::Gap {
                    index,
                    expected: prev_max,
                    found: next.min,
                });
            } else if next.min < prev_max {
                errors.push(ScheduleError::Overlap {
                    index,
                    expected: prev_max,
                    found: next.min,
                });
            }
        }

        if next.rate < prev.rate {
            warnings.push(ScheduleWarning::RateDecrease {
                index,
                rate: next.rate,
                previous_rate: prev.rate,
            });
        }
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(errors)
    }
}

/// Applies a single field edit to the bracket at `index`.
///
/// Bound edits carry the neighbouring boundary along so the schedule stays
/// contiguous: a new `min` becomes the previous bracket's `max`, and a new
/// `max` becomes the next bracket's `min`.
///
/// # Errors
///
/// Returns the reasons the edit was rejected; `brackets` is never modified.
pub fn apply_edit(
    brackets: &[TaxBracket],
    index: usize,
    edit: BracketEdit,
) -> Result<ScheduleUpdate, Vec<ScheduleError>> {
    let len = brackets.len();
    if index >= len {
        return Err(vec![ScheduleError::IndexOutOfRange { index, len }]);
    }

    let mut updated = brackets.to_vec();
    let current = &brackets[index];
    let last_index = len - 1;

    match edit {
        BracketEdit::SetMin(min) => {
            if index == 0 {
                if !min.is_zero() {
                    return Err(vec![ScheduleError::FirstMinNotZero { min }]);
                }
            } else {
                let previous_min = brackets[index - 1].min;
                if min <= previous_min {
                    return Err(vec![ScheduleError::MinNotAbovePrevious {
                        index,
                        min,
                        previous_min,
                    }]);
                }
                if let Some(max) = current.max
                    && min >= max
                {
                    return Err(vec![ScheduleError::MinNotBelowMax { index, min, max }]);
                }
                updated[index - 1].max = Some(min);
            }
            updated[index].min = min;
        }
        BracketEdit::SetMax(None) => {
            if index != last_index {
                return Err(vec![ScheduleError::UnboundedNotLast { index }]);
            }
            updated[index].max = None;
        }
        BracketEdit::SetMax(Some(max)) => {
            if index == last_index {
                return Err(vec![ScheduleError::TerminalMustBeUnbounded { index }]);
            }
            if max <= current.min {
                return Err(vec![ScheduleError::MaxNotAboveMin {
                    index,
                    max,
                    min: current.min,
                }]);
            }
            if let Some(next_max) = brackets[index + 1].max
                && max >= next_max
            {
                return Err(vec![ScheduleError::MaxNotBelowNext {
                    index,
                    max,
                    next_max,
                }]);
            }
            updated[index].max = Some(max);
            updated[index + 1].min = max;
        }
        BracketEdit::SetRate(rate) => {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(vec![ScheduleError::RateOutOfRange { index, rate }]);
            }
            updated[index].rate = rate;
        }
        BracketEdit::SetDescription(description) => {
            updated[index].description = description;
        }
    }

    finish(updated)
}

/// Inserts a new finite bracket just before the terminal unbounded bracket.
///
/// The new bracket starts where the terminal bracket started, spans
/// [`NEW_BRACKET_WIDTH`], and takes the preceding bracket's rate plus
/// [`NEW_BRACKET_RATE_STEP`] (at most 1). The terminal bracket moves up.
///
/// # Errors
///
/// Returns [`ScheduleError`]s if the input schedule is empty, lacks a
/// terminal unbounded bracket, or is otherwise invalid.
pub fn add_bracket(brackets: &[TaxBracket]) -> Result<ScheduleUpdate, Vec<ScheduleError>> {
    let Some(terminal) = brackets.last() else {
        return Err(vec![ScheduleError::Empty]);
    };
    if terminal.max.is_some() {
        return Err(vec![ScheduleError::MissingUnbounded]);
    }

    let insert_at = brackets.len() - 1;
    let base_rate = if insert_at > 0 {
        brackets[insert_at - 1].rate
    } else {
        terminal.rate
    };
    let rate = (base_rate + NEW_BRACKET_RATE_STEP).min(Decimal::ONE);

    let min = terminal.min;
    let max = min + NEW_BRACKET_WIDTH;

    let mut updated = brackets.to_vec();
    updated[insert_at].min = max;
    updated.insert(insert_at, TaxBracket::new(min, Some(max), rate, String::new()));

    finish(updated)
}

/// Removes the bracket at `index`, keeping the schedule contiguous.
///
/// The removed range is absorbed by the previous bracket (or by the next one
/// when the first bracket is removed), and the new last bracket is always
/// unbounded.
///
/// # Errors
///
/// Returns [`ScheduleError::TooFewBrackets`] when fewer than
/// [`MIN_BRACKETS_FOR_REMOVAL`] brackets exist, or the validation errors of
/// the resulting schedule.
pub fn remove_bracket(
    brackets: &[TaxBracket],
    index: usize,
) -> Result<ScheduleUpdate, Vec<ScheduleError>> {
    let len = brackets.len();
    if len < MIN_BRACKETS_FOR_REMOVAL {
        return Err(vec![ScheduleError::TooFewBrackets { len }]);
    }
    if index >= len {
        return Err(vec![ScheduleError::IndexOutOfRange { index, len }]);
    }

    let mut updated = brackets.to_vec();
    let removed = updated.remove(index);

    if index == 0 {
        updated[0].min = Decimal::ZERO;
    } else if index < len - 1 {
        updated[index - 1].max = removed.max;
    }

    if let Some(last) = updated.last_mut() {
        last.max = None;
    }

    finish(updated)
}

fn finish(brackets: Vec<TaxBracket>) -> Result<ScheduleUpdate, Vec<ScheduleError>> {
    let warnings = validate_schedule(&brackets)?;
    for warning in &warnings {
        let ScheduleWarning::RateDecrease {
            index,
            rate,
            previous_rate,
        } = warning;
        warn!(index, %rate, %previous_rate, "bracket rate lower than preceding bracket");
    }
    Ok(ScheduleUpdate { brackets, warnings })
}
