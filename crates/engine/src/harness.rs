//! Test helpers for building grids with a known fill pattern.

use std::ops::RangeInclusive;

use crate::cell::CellValue;
use crate::cell_id::CellPos;
use crate::grid::Grid;
use crate::table::MONTH_COUNT;

pub const TEST_YEAR: i32 = 2026;

/// A row's cells with the given `(column, value)` pairs filled.
pub fn cells_from(filled: &[(usize, f64)]) -> [CellValue; MONTH_COUNT] {
    let mut cells = [CellValue::Unfilled; MONTH_COUNT];
    for &(column, value) in filled {
        cells[column] = CellValue::Value(value);
    }
    cells
}

/// Builds a grid through the public resize and edit operations.
pub struct GridBuilder {
    grid: Grid,
}

impl GridBuilder {
    pub fn new(tables: usize, rows: usize) -> Self {
        let mut grid = Grid::new(TEST_YEAR);
        for _ in 1..rows {
            grid.add_row();
        }
        for _ in 1..tables {
            grid.add_table();
        }
        Self { grid }
    }

    pub fn set(mut self, table: usize, row: usize, column: usize, value: f64) -> Self {
        self.grid
            .set_cell(CellPos::new(table, row, column), CellValue::Value(value))
            .expect("cell inside test grid");
        self
    }

    pub fn fill(mut self, table: usize, row: usize, columns: RangeInclusive<usize>, value: f64) -> Self {
        for column in columns {
            self = self.set(table, row, column, value);
        }
        self
    }

    pub fn build(self) -> Grid {
        self.grid
    }
}
