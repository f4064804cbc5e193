//! Cell addressing.
//!
//! A `CellPos` identifies one month cell across all tables of a grid.

use serde::{Deserialize, Serialize};

use crate::table::{MONTH_COUNT, PART_SIZE};

/// Position of a month cell: `Grid[table][row][column]`, all 0-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    pub table: usize,
    pub row: usize,
    pub column: usize,
}

impl CellPos {
    #[inline]
    pub fn new(table: usize, row: usize, column: usize) -> Self {
        Self { table, row, column }
    }

    /// Quarter (part) this column belongs to.
    #[inline]
    pub fn quarter(&self) -> usize {
        quarter_of(self.column)
    }

    /// Form-field path used by presentation layers to attach a message to an input.
    pub fn field_path(&self) -> String {
        format!("tables][{}][{}][{}", self.table, self.row, self.column)
    }
}

impl std::fmt::Display for CellPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Table{}!R{}:{}",
            self.table + 1,
            self.row + 1,
            month_label(self.column)
        )
    }
}

#[inline]
pub fn quarter_of(column: usize) -> usize {
    column / PART_SIZE
}

const MONTHS: [&str; MONTH_COUNT] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Short month name for a column, `"?"` past December.
pub fn month_label(column: usize) -> &'static str {
    MONTHS.get(column).copied().unwrap_or("?")
}

/// Column for a month given as a short name (`jan`, `Feb`) or a 1-based number.
pub fn parse_month(input: &str) -> Option<usize> {
    let input = input.trim();
    if let Ok(n) = input.parse::<usize>() {
        return (1..=MONTH_COUNT).contains(&n).then(|| n - 1);
    }
    MONTHS.iter().position(|m| m.eq_ignore_ascii_case(input))
}
