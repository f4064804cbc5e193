pub mod actions;
pub mod aggregate;
pub mod cell;
pub mod cell_id;
pub mod grid;
pub mod range;
pub mod table;
pub mod validation;

#[cfg(test)]
pub mod harness;

pub use actions::{apply, Action, ActionError, ActionOutcome, Status};
pub use cell::{CellParseError, CellValue};
pub use cell_id::CellPos;
pub use grid::{Grid, GridError, GridState};
pub use table::{Row, RowTotals, Table, MONTH_COUNT, PART_COUNT, PART_SIZE};
pub use validation::{validate, CellIssue, ValidationError};
