use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate;
use crate::cell::CellValue;
use crate::cell_id::CellPos;
use crate::table::{Row, Table, MONTH_COUNT};
use crate::validation;

/// Shape or addressing problem with a grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid must contain at least one table")]
    NoTables,
    #[error("tables must contain at least one row")]
    NoRows,
    #[error("table {table} has {found} rows, expected {expected}")]
    RowCountMismatch { table: usize, expected: usize, found: usize },
    #[error("cell {pos} is outside the grid")]
    OutOfBounds { pos: CellPos },
}

/// All tables of one editing session.
///
/// Every table holds the same number of rows and every row holds exactly
/// `MONTH_COUNT` cells. The serialized form is the `GridState` handed to and
/// returned from each action; deserializing re-checks the shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridRepr")]
pub struct Grid {
    tables: Vec<Table>,
}

/// Serializable grid value passed through action handlers.
pub type GridState = Grid;

#[derive(Deserialize)]
struct GridRepr {
    tables: Vec<Table>,
}

impl TryFrom<GridRepr> for Grid {
    type Error = GridError;

    fn try_from(repr: GridRepr) -> Result<Self, Self::Error> {
        Grid::from_tables(repr.tables)
    }
}

impl Grid {
    /// A fresh grid: one table with one row labelled `year`.
    pub fn new(year: i32) -> Self {
        Self {
            tables: vec![Table::with_layout(1, &[year])],
        }
    }

    /// Build a grid from existing tables, checking the shape invariants.
    ///
    /// Loaded values are rounded and tables renumbered 1..n. Incoming totals
    /// are never kept as given: they are recomputed when the grid validates
    /// and dropped otherwise.
    pub fn from_tables(mut tables: Vec<Table>) -> Result<Self, GridError> {
        let first = tables.first().ok_or(GridError::NoTables)?;
        let expected = first.row_count();
        if expected == 0 {
            return Err(GridError::NoRows);
        }
        for (index, table) in tables.iter().enumerate() {
            if table.row_count() != expected {
                return Err(GridError::RowCountMismatch {
                    table: index,
                    expected,
                    found: table.row_count(),
                });
            }
        }

        for (index, table) in tables.iter_mut().enumerate() {
            if table.number != index + 1 {
                log::debug!("renumbering table {} as {}", table.number, index + 1);
                table.number = index + 1;
            }
            for row in table.rows.iter_mut() {
                row.round_cells();
            }
        }

        let mut grid = Self { tables };
        if grid.rows().any(|(_, _, row)| row.totals().is_some()) {
            if validation::validate(&grid).is_ok() {
                aggregate::aggregate(&mut grid);
            } else {
                log::warn!("dropping totals from a grid that does not validate");
                grid.clear_totals();
            }
        }
        Ok(grid)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn row_count(&self) -> usize {
        self.tables.first().map(Table::row_count).unwrap_or(0)
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, index: usize) -> Option<&Table> {
        self.tables.get(index)
    }

    /// Year labels of the current row layout, row 0 first.
    pub fn years(&self) -> Vec<i32> {
        self.tables
            .first()
            .map(|t| t.rows.iter().map(|r| r.year).collect())
            .unwrap_or_default()
    }

    pub fn cell(&self, pos: CellPos) -> Option<CellValue> {
        self.tables
            .get(pos.table)?
            .rows
            .get(pos.row)?
            .cell(pos.column)
    }

    pub fn set_cell(&mut self, pos: CellPos, value: CellValue) -> Result<(), GridError> {
        let row = self
            .tables
            .get_mut(pos.table)
            .and_then(|t| t.rows.get_mut(pos.row))
            .ok_or(GridError::OutOfBounds { pos })?;
        if !row.set_cell(pos.column, value) {
            return Err(GridError::OutOfBounds { pos });
        }
        self.clear_totals();
        Ok(())
    }

    /// Append one row (one year earlier than the current last row) to every table.
    pub fn add_row(&mut self) {
        let year = self
            .years()
            .last()
            .map(|y| y - 1)
            .unwrap_or_default();
        for table in &mut self.tables {
            table.rows.push(Row::new(year));
        }
        self.clear_totals();
        log::info!("added row for {} ({} rows)", year, self.row_count());
    }

    /// Append one table with the current row layout and no values.
    pub fn add_table(&mut self) {
        let number = self.tables.len() + 1;
        let table = Table::with_layout(number, &self.years());
        self.tables.push(table);
        self.clear_totals();
        log::info!("added table #{}", number);
    }

    /// Rows of every table, in table then row order.
    pub fn rows(&self) -> impl Iterator<Item = (usize, usize, &Row)> {
        self.tables.iter().enumerate().flat_map(|(t, table)| {
            table.rows.iter().enumerate().map(move |(r, row)| (t, r, row))
        })
    }

    pub(crate) fn rows_mut(&mut self) -> impl Iterator<Item = &mut Row> {
        self.tables.iter_mut().flat_map(|t| t.rows.iter_mut())
    }

    /// Drop all derived averages.
    pub fn clear_totals(&mut self) {
        for row in self.rows_mut() {
            row.clear_totals();
        }
    }

    /// True once a successful submission has populated every row's totals.
    pub fn has_totals(&self) -> bool {
        self.rows().all(|(_, _, row)| row.totals().is_some())
    }

    pub fn filled_count(&self) -> usize {
        self.rows()
            .map(|(_, _, row)| row.cells().iter().filter(|c| c.is_filled()).count())
            .sum()
    }

    pub fn cell_count(&self) -> usize {
        self.table_count() * self.row_count() * MONTH_COUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_shape() {
        let grid = Grid::new(2026);
        assert_eq!(grid.table_count(), 1);
        assert_eq!(grid.row_count(), 1);
        assert_eq!(grid.years(), vec![2026]);
        assert_eq!(grid.cell_count(), 12);
        assert!(!grid.has_totals());
    }

    #[test]
    fn test_add_row_extends_every_table() {
        let mut grid = Grid::new(2026);
        grid.add_table();
        grid.add_row();
        grid.add_row();
        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.years(), vec![2026, 2025, 2024]);
        for table in grid.tables() {
            assert_eq!(table.row_count(), 3);
        }
    }

    #[test]
    fn test_add_table_clones_layout() {
        let mut grid = Grid::new(2026);
        grid.add_row();
        grid.set_cell(CellPos::new(0, 1, 4), CellValue::Value(9.0)).unwrap();
        grid.add_table();

        let added = grid.table(1).unwrap();
        assert_eq!(added.number, 2);
        assert_eq!(added.row_count(), 2);
        assert_eq!(added.rows[1].year, 2025);
        assert!(added.is_empty());
        assert_eq!(grid.cell(CellPos::new(0, 1, 4)), Some(CellValue::Value(9.0)));
    }

    #[test]
    fn test_set_cell_out_of_bounds() {
        let mut grid = Grid::new(2026);
        for pos in [CellPos::new(1, 0, 0), CellPos::new(0, 1, 0), CellPos::new(0, 0, 12)] {
            assert_eq!(
                grid.set_cell(pos, CellValue::Value(1.0)),
                Err(GridError::OutOfBounds { pos })
            );
        }
    }

    #[test]
    fn test_from_tables_rejects_ragged_shape() {
        assert_eq!(Grid::from_tables(vec![]), Err(GridError::NoTables));
        assert_eq!(
            Grid::from_tables(vec![Table::with_layout(1, &[])]),
            Err(GridError::NoRows)
        );
        let tables = vec![
            Table::with_layout(1, &[2026, 2025]),
            Table::with_layout(2, &[2026]),
        ];
        assert_eq!(
            Grid::from_tables(tables),
            Err(GridError::RowCountMismatch { table: 1, expected: 2, found: 1 })
        );
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let mut grid = Grid::new(2026);
        grid.add_table();
        grid.set_cell(CellPos::new(1, 0, 2), CellValue::Value(3.5)).unwrap();

        let json = serde_json::to_string(&grid).unwrap();
        let back: GridState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn test_state_rejects_wrong_cell_count() {
        let json = r#"{"tables":[{"number":1,"rows":[{"year":2026,"cells":[null,null]}]}]}"#;
        assert!(serde_json::from_str::<GridState>(json).is_err());
    }

    #[test]
    fn test_state_rejects_ragged_tables() {
        let row = format!(r#"{{"year":2026,"cells":[{}]}}"#, vec!["null"; 12].join(","));
        let json = format!(
            r#"{{"tables":[{{"number":1,"rows":[{row},{row}]}},{{"number":2,"rows":[{row}]}}]}}"#
        );
        let err = serde_json::from_str::<GridState>(&json).unwrap_err();
        assert!(err.to_string().contains("table 1 has 1 rows"));
    }

    fn state_json(cells: &str, totals: &str) -> String {
        format!(
            r#"{{"tables":[{{"number":1,"rows":[{{"year":2026,"cells":[{cells}],"totals":{totals}}}]}}]}}"#
        )
    }

    #[test]
    fn test_loaded_totals_dropped_when_grid_invalid() {
        // Gap at February.
        let cells = "1.0,null,2.0,null,null,null,null,null,null,null,null,null";
        let json = state_json(cells, r#"{"quarters":[99.0,0.0,0.0,0.0],"ytd":42.0}"#);
        let grid: GridState = serde_json::from_str(&json).unwrap();
        assert!(grid.tables()[0].rows[0].totals().is_none());
        assert!(!grid.has_totals());
    }

    #[test]
    fn test_loaded_totals_recomputed_when_grid_valid() {
        let cells = "3.0,null,null,null,null,null,null,null,null,null,null,null";
        let json = state_json(cells, r#"{"quarters":[99.0,0.0,0.0,0.0],"ytd":42.0}"#);
        let grid: GridState = serde_json::from_str(&json).unwrap();
        let totals = grid.tables()[0].rows[0].totals().unwrap();
        assert_eq!(totals.quarters, [1.33, 0.33, 0.33, 0.33]);
        assert_eq!(totals.ytd, 0.83);
    }

    #[test]
    fn test_loaded_values_are_rounded() {
        let cells = "1.23456,2.005,null,null,null,null,null,null,null,null,null,null";
        let json = format!(r#"{{"tables":[{{"number":1,"rows":[{{"year":2026,"cells":[{cells}]}}]}}]}}"#);
        let grid: GridState = serde_json::from_str(&json).unwrap();
        assert_eq!(grid.cell(CellPos::new(0, 0, 0)), Some(CellValue::Value(1.23)));
        assert_eq!(grid.cell(CellPos::new(0, 0, 1)), Some(CellValue::Value(2.01)));
    }

    #[test]
    fn test_loaded_tables_renumbered() {
        let tables = vec![
            Table::with_layout(4, &[2026]),
            Table::with_layout(4, &[2026]),
            Table::with_layout(1, &[2026]),
        ];
        let grid = Grid::from_tables(tables).unwrap();
        let numbers: Vec<usize> = grid.tables().iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }
}
