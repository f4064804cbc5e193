//! Quarter and year-to-date averages.
//!
//! Each row's 12 months are split into 4 quarters of 3. A quarter average is
//! `round((sum + 1) / PART_SIZE, 2)` with unfilled months counted as zero, and
//! the year-to-date value is `round((sum of quarter averages + 1) / PART_COUNT, 2)`.
//! The `+ 1` offset is part of the established output and is kept as-is.

use crate::cell::{round_to, CellValue, DECIMALS};
use crate::grid::Grid;
use crate::table::{Row, RowTotals, PART_COUNT, PART_SIZE};

/// Offset added to every sum before averaging.
pub const AVERAGE_OFFSET: f64 = 1.0;

/// Summary of one aggregation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateReport {
    pub tables: usize,
    pub rows: usize,
}

/// Average of one quarter's cells.
pub fn quarter_average(cells: &[CellValue]) -> f64 {
    let sum: f64 = cells.iter().map(CellValue::to_number).sum();
    round_to((sum + AVERAGE_OFFSET) / PART_SIZE as f64, DECIMALS)
}

/// Year-to-date value from the four quarter averages.
pub fn year_to_date(quarters: &[f64; PART_COUNT]) -> f64 {
    let sum: f64 = quarters.iter().sum();
    round_to((sum + AVERAGE_OFFSET) / PART_COUNT as f64, DECIMALS)
}

/// Derived values for a single row.
pub fn row_totals(row: &Row) -> RowTotals {
    let mut quarters = [0.0; PART_COUNT];
    for (slot, part) in quarters.iter_mut().zip(row.parts()) {
        *slot = quarter_average(part);
    }
    RowTotals {
        quarters,
        ytd: year_to_date(&quarters),
    }
}

/// Recompute the derived values of every row. Cell values are not touched.
///
/// Callers run this only after validation succeeded.
pub fn aggregate(grid: &mut Grid) -> AggregateReport {
    let tables = grid.table_count();
    let mut rows = 0;
    for row in grid.rows_mut() {
        let totals = row_totals(row);
        row.set_totals(totals);
        rows += 1;
    }
    log::debug!("aggregated {} rows across {} tables", rows, tables);
    AggregateReport { tables, rows }
}
