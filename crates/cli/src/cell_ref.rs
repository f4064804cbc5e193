//! Command-line cell references.
//!
//! Format: `TABLE:ROW:MONTH`, table and row 1-based, month as a short name or
//! a number 1-12. `2:1:mar` is the March cell of the first row of table 2.

use periodgrid_engine::cell_id::parse_month;
use periodgrid_engine::CellPos;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellRefError {
    #[error("expected TABLE:ROW:MONTH, got '{0}'")]
    Shape(String),
    #[error("'{0}' is not a 1-based index")]
    Index(String),
    #[error("'{0}' is not a month (jan..dec or 1..12)")]
    Month(String),
}

pub fn parse(input: &str) -> Result<CellPos, CellRefError> {
    let parts: Vec<&str> = input.split(':').collect();
    let [table, row, month] = parts.as_slice() else {
        return Err(CellRefError::Shape(input.to_string()));
    };

    let table = one_based(table)?;
    let row = one_based(row)?;
    let column = parse_month(month).ok_or_else(|| CellRefError::Month(month.to_string()))?;
    Ok(CellPos::new(table, row, column))
}

fn one_based(s: &str) -> Result<usize, CellRefError> {
    match s.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(CellRefError::Index(s.to_string())),
    }
}
