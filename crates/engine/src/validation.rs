//! Submission validation.
//!
//! Runs the per-row span check over every row, then the grid-wide checks:
//!
//! 1. **Gaps**: inside each row, no unfilled cell may sit between the first
//!    and last filled cell.
//! 2. **Empty grid**: if every table is empty the submission fails with a
//!    single structural error and nothing else is reported.
//! 3. **Common period**: when each table has exactly one row, every table
//!    must cover the union of all tables' spans.
//!
//! Findings accumulate; the whole list is returned so a presentation layer
//! can mark every offending cell at once. Passes do not deduplicate against
//! each other, so one cell may appear twice with different reasons.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cell_id::CellPos;
use crate::grid::Grid;
use crate::range::{self, Span};

/// Why a cell was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellIssue {
    /// Unfilled cell between the first and last filled cell of its row.
    Gap,
    /// Unfilled cell inside the period the other tables report (single-row mode).
    OutsideCommonPeriod,
}

impl std::fmt::Display for CellIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gap => write!(f, "gap inside the filled period"),
            Self::OutsideCommonPeriod => write!(f, "missing value inside the common period"),
        }
    }
}

/// A validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// Grid-wide failure with no position. Only raised when every table is empty.
    #[error("fill in at least one table")]
    Structural,
    #[error("{pos}: {issue}")]
    Cell { pos: CellPos, issue: CellIssue },
}

impl ValidationError {
    fn gap(table: usize, row: usize, column: usize) -> Self {
        Self::Cell { pos: CellPos::new(table, row, column), issue: CellIssue::Gap }
    }

    fn outside_period(table: usize, column: usize) -> Self {
        Self::Cell {
            pos: CellPos::new(table, 0, column),
            issue: CellIssue::OutsideCommonPeriod,
        }
    }

    /// Position to attach the message to; `None` for structural errors.
    pub fn key(&self) -> Option<CellPos> {
        match self {
            Self::Structural => None,
            Self::Cell { pos, .. } => Some(*pos),
        }
    }

    /// Form-field path of the offending input, empty for structural errors.
    pub fn field_path(&self) -> String {
        self.key().map(|pos| pos.field_path()).unwrap_or_default()
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Structural)
    }
}

/// Per-table result of the row scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableScan {
    /// Union of the spans of the table's rows; `None` when the table is empty.
    pub span: Option<Span>,
}

impl TableScan {
    pub fn is_empty(&self) -> bool {
        self.span.is_none()
    }
}

/// Orchestrates the validation passes over a grid.
pub struct Validator<'a> {
    grid: &'a Grid,
}

impl<'a> Validator<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }

    /// Run every pass.
    ///
    /// # Returns
    /// - `Ok(())` if the grid may be aggregated.
    /// - `Err(errors)` with every finding otherwise.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let scans = self.scan_rows(&mut errors);

        let empty = count_empty(&scans);
        if empty == self.grid.table_count() {
            log::debug!("all {} tables empty", empty);
            return Err(vec![ValidationError::Structural]);
        }

        if self.grid.row_count() == 1 {
            self.check_common_period(&scans, &mut errors);
        }

        log::debug!(
            "validated {} tables x {} rows: {} errors",
            self.grid.table_count(),
            self.grid.row_count(),
            errors.len()
        );

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Span detection and gap check for every row of every table.
    pub fn scan_rows(&self, errors: &mut Vec<ValidationError>) -> Vec<TableScan> {
        self.grid
            .tables()
            .iter()
            .enumerate()
            .map(|(t, table)| {
                let mut table_span: Option<Span> = None;
                for (r, row) in table.rows.iter().enumerate() {
                    let Some(span) = range::detect_span(row.cells()) else {
                        continue;
                    };
                    errors.extend(
                        range::gaps(row.cells(), span)
                            .into_iter()
                            .map(|c| ValidationError::gap(t, r, c)),
                    );
                    table_span = Some(match table_span {
                        Some(s) => s.union(span),
                        None => span,
                    });
                }
                TableScan { span: table_span }
            })
            .collect()
    }

    /// Single-row mode: every table must be filled across the union of all spans.
    fn check_common_period(&self, scans: &[TableScan], errors: &mut Vec<ValidationError>) {
        let Some(window) = common_window(scans) else {
            return;
        };
        for (t, table) in self.grid.tables().iter().enumerate() {
            let Some(row) = table.rows.first() else {
                continue;
            };
            errors.extend(
                range::unfilled_within(row.cells(), window)
                    .into_iter()
                    .map(|c| ValidationError::outside_period(t, c)),
            );
        }
    }
}

/// Number of tables with no filled cell.
pub fn count_empty(scans: &[TableScan]) -> usize {
    scans.iter().filter(|s| s.is_empty()).count()
}

/// `min(first)` to `max(last)` over every non-empty table.
pub fn common_window(scans: &[TableScan]) -> Option<Span> {
    scans
        .iter()
        .filter_map(|s| s.span)
        .reduce(Span::union)
}

/// Validate a grid.
pub fn validate(grid: &Grid) -> Result<(), Vec<ValidationError>> {
    Validator::new(grid).validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::GridBuilder;

    fn cell(table: usize, row: usize, column: usize, issue: CellIssue) -> ValidationError {
        ValidationError::Cell { pos: CellPos::new(table, row, column), issue }
    }

    #[test]
    fn test_all_empty_is_single_structural_error() {
        let grid = GridBuilder::new(3, 2).build();
        assert_eq!(validate(&grid), Err(vec![ValidationError::Structural]));
    }

    #[test]
    fn test_contiguous_single_table_is_valid() {
        let grid = GridBuilder::new(1, 1).fill(0, 0, 0..=11, 1.0).build();
        assert_eq!(validate(&grid), Ok(()));
    }

    #[test]
    fn test_gap_in_row_reported() {
        let grid = GridBuilder::new(1, 1)
            .fill(0, 0, 0..=1, 1.0)
            .fill(0, 0, 4..=4, 1.0)
            .build();
        // One row per table, so the common-period pass reports the same cells again.
        assert_eq!(
            validate(&grid),
            Err(vec![
                cell(0, 0, 2, CellIssue::Gap),
                cell(0, 0, 3, CellIssue::Gap),
                cell(0, 0, 2, CellIssue::OutsideCommonPeriod),
                cell(0, 0, 3, CellIssue::OutsideCommonPeriod),
            ])
        );
    }

    #[test]
    fn test_multi_row_rows_checked_independently() {
        // Row 0 Jan-Mar, row 1 Jul-Dec: different spans are fine with several rows.
        let grid = GridBuilder::new(2, 2)
            .fill(0, 0, 0..=2, 1.0)
            .fill(0, 1, 6..=11, 1.0)
            .fill(1, 1, 3..=3, 1.0)
            .build();
        assert_eq!(validate(&grid), Ok(()));
    }

    #[test]
    fn test_multi_row_gap_in_second_row() {
        let grid = GridBuilder::new(1, 2)
            .fill(0, 0, 0..=11, 1.0)
            .fill(0, 1, 0..=0, 1.0)
            .fill(0, 1, 2..=2, 1.0)
            .build();
        assert_eq!(validate(&grid), Err(vec![cell(0, 1, 1, CellIssue::Gap)]));
    }

    #[test]
    fn test_single_row_mode_flags_shorter_table() {
        let grid = GridBuilder::new(2, 1)
            .fill(0, 0, 2..=5, 1.0)
            .fill(1, 0, 3..=4, 1.0)
            .build();
        assert_eq!(
            validate(&grid),
            Err(vec![
                cell(1, 0, 2, CellIssue::OutsideCommonPeriod),
                cell(1, 0, 5, CellIssue::OutsideCommonPeriod),
            ])
        );
    }

    #[test]
    fn test_single_row_mode_uses_union_of_spans() {
        // A covers 0..=3, B covers 6..=8: both must cover 0..=8.
        let grid = GridBuilder::new(2, 1)
            .fill(0, 0, 0..=3, 1.0)
            .fill(1, 0, 6..=8, 1.0)
            .build();
        let errors = validate(&grid).unwrap_err();
        let columns = |table: usize| -> Vec<usize> {
            errors
                .iter()
                .filter_map(ValidationError::key)
                .filter(|p| p.table == table)
                .map(|p| p.column)
                .collect()
        };
        assert_eq!(columns(0), vec![4, 5, 6, 7, 8]);
        assert_eq!(columns(1), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_single_row_mode_flags_empty_table() {
        let grid = GridBuilder::new(2, 1).fill(0, 0, 1..=2, 1.0).build();
        assert_eq!(
            validate(&grid),
            Err(vec![
                cell(1, 0, 1, CellIssue::OutsideCommonPeriod),
                cell(1, 0, 2, CellIssue::OutsideCommonPeriod),
            ])
        );
    }

    #[test]
    fn test_gap_reported_by_both_passes() {
        let grid = GridBuilder::new(1, 1)
            .fill(0, 0, 0..=0, 1.0)
            .fill(0, 0, 2..=2, 1.0)
            .build();
        assert_eq!(
            validate(&grid),
            Err(vec![
                cell(0, 0, 1, CellIssue::Gap),
                cell(0, 0, 1, CellIssue::OutsideCommonPeriod),
            ])
        );
    }

    #[test]
    fn test_multi_row_empty_table_is_allowed() {
        let grid = GridBuilder::new(2, 2).fill(0, 0, 0..=5, 1.0).build();
        assert_eq!(validate(&grid), Ok(()));
    }

    #[test]
    fn test_error_keys_and_paths() {
        let structural = ValidationError::Structural;
        assert_eq!(structural.key(), None);
        assert_eq!(structural.field_path(), "");
        assert!(structural.is_structural());

        let err = cell(1, 0, 3, CellIssue::Gap);
        assert_eq!(err.key(), Some(CellPos::new(1, 0, 3)));
        assert_eq!(err.field_path(), "tables][1][0][3");
        assert_eq!(err.to_string(), "Table2!R1:Apr: gap inside the filled period");
    }

    #[test]
    fn test_common_window() {
        let scans = [
            TableScan { span: Some(Span { first: 2, last: 5 }) },
            TableScan { span: None },
            TableScan { span: Some(Span { first: 3, last: 9 }) },
        ];
        assert_eq!(common_window(&scans), Some(Span { first: 2, last: 9 }));
        assert_eq!(count_empty(&scans), 1);
        assert_eq!(common_window(&[TableScan { span: None }]), None);
    }
}
