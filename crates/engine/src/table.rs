use serde::{Deserialize, Serialize};

use super::cell::{round_to, CellValue, DECIMALS};

/// Number of parts (quarters) a row is divided into.
pub const PART_COUNT: usize = 4;

/// Number of month cells in each part.
pub const PART_SIZE: usize = 3;

/// Month cells per row.
pub const MONTH_COUNT: usize = PART_COUNT * PART_SIZE;

/// Derived averages for one row. Display-only, never user-editable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowTotals {
    pub quarters: [f64; PART_COUNT],
    pub ytd: f64,
}

/// One year of month entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub year: i32,
    cells: [CellValue; MONTH_COUNT],
    /// Set only by a successful submission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    totals: Option<RowTotals>,
}

impl Row {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            cells: [CellValue::Unfilled; MONTH_COUNT],
            totals: None,
        }
    }

    pub fn cells(&self) -> &[CellValue; MONTH_COUNT] {
        &self.cells
    }

    pub fn cell(&self, column: usize) -> Option<CellValue> {
        self.cells.get(column).copied()
    }

    /// Returns false if `column` is out of range.
    pub fn set_cell(&mut self, column: usize, value: CellValue) -> bool {
        match self.cells.get_mut(column) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// The cells of one quarter, in column order. `None` past the last quarter.
    pub fn part(&self, quarter: usize) -> Option<&[CellValue]> {
        let start = quarter.checked_mul(PART_SIZE)?;
        self.cells.get(start..start.checked_add(PART_SIZE)?)
    }

    /// Every quarter in order.
    pub fn parts(&self) -> impl Iterator<Item = &[CellValue]> {
        self.cells.chunks_exact(PART_SIZE)
    }

    pub fn is_empty(&self) -> bool {
        !self.cells.iter().any(CellValue::is_filled)
    }

    pub fn totals(&self) -> Option<&RowTotals> {
        self.totals.as_ref()
    }

    pub(crate) fn set_totals(&mut self, totals: RowTotals) {
        self.totals = Some(totals);
    }

    pub(crate) fn clear_totals(&mut self) {
        self.totals = None;
    }

    /// Round every stored value to `DECIMALS` places.
    pub(crate) fn round_cells(&mut self) {
        for cell in self.cells.iter_mut() {
            if let CellValue::Value(n) = *cell {
                *cell = CellValue::Value(round_to(n, DECIMALS));
            }
        }
    }
}

/// A captioned table of year rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// 1-based display number, used for the caption.
    pub number: usize,
    pub rows: Vec<Row>,
}

impl Table {
    /// A table whose rows copy the given year labels, with every cell unfilled.
    pub fn with_layout(number: usize, years: &[i32]) -> Self {
        Self {
            number,
            rows: years.iter().map(|&year| Row::new(year)).collect(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when every row is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Row::is_empty)
    }

    /// Caption text rendered from a template containing `{number}`.
    pub fn caption(&self, template: &str) -> String {
        template.replace("{number}", &self.number.to_string())
    }
}
