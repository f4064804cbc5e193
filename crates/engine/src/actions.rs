//! Boundary actions on a grid state.
//!
//! Each handler takes the current `GridState` by value and returns the next
//! one together with a status. Nothing is kept between calls: the caller owns
//! the state for the lifetime of the editing session.
//!
//! - `AddRow` / `AddTable` resize the grid. No validation runs.
//! - `SetCell` parses and stores one input value.
//! - `Submit` validates; only when no error is found are the averages computed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::{self, AggregateReport};
use crate::cell::{CellParseError, CellValue};
use crate::cell_id::CellPos;
use crate::grid::{GridError, GridState};
use crate::validation::{self, ValidationError};

/// An action requested by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    AddRow,
    AddTable,
    SetCell { pos: CellPos, input: String },
    Submit,
}

/// Result of a handled action.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    /// Grid shape changed; derived values were cleared.
    Resized,
    /// A cell value changed; derived values were cleared.
    Edited,
    /// Validation passed and derived values were recomputed.
    Valid(AggregateReport),
    /// Validation failed. Derived values are unset.
    Invalid(Vec<ValidationError>),
}

impl Status {
    pub fn is_valid(&self) -> bool {
        matches!(self, Status::Valid(_))
    }

    pub fn errors(&self) -> &[ValidationError] {
        match self {
            Status::Invalid(errors) => errors,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub state: GridState,
    pub status: Status,
}

/// An action that could not be applied. The input state is not returned
/// modified in any way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("cell {pos}: {source}")]
    Input {
        pos: CellPos,
        #[source]
        source: CellParseError,
    },
}

/// Apply one action.
pub fn apply(state: GridState, action: Action) -> Result<ActionOutcome, ActionError> {
    match action {
        Action::AddRow => Ok(add_row(state)),
        Action::AddTable => Ok(add_table(state)),
        Action::SetCell { pos, input } => set_cell(state, pos, &input),
        Action::Submit => Ok(submit(state)),
    }
}

pub fn add_row(mut state: GridState) -> ActionOutcome {
    state.add_row();
    ActionOutcome { state, status: Status::Resized }
}

pub fn add_table(mut state: GridState) -> ActionOutcome {
    state.add_table();
    ActionOutcome { state, status: Status::Resized }
}

pub fn set_cell(mut state: GridState, pos: CellPos, input: &str) -> Result<ActionOutcome, ActionError> {
    let value = CellValue::from_input(input).map_err(|source| ActionError::Input { pos, source })?;
    state.set_cell(pos, value)?;
    Ok(ActionOutcome { state, status: Status::Edited })
}

/// Validate and, on success, aggregate.
pub fn submit(mut state: GridState) -> ActionOutcome {
    match validation::validate(&state) {
        Ok(()) => {
            let report = aggregate::aggregate(&mut state);
            log::info!("submission valid: {} rows aggregated", report.rows);
            ActionOutcome { state, status: Status::Valid(report) }
        }
        Err(errors) => {
            state.clear_totals();
            log::info!("submission rejected with {} errors", errors.len());
            ActionOutcome { state, status: Status::Invalid(errors) }
        }
    }
}
