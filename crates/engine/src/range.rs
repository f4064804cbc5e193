//! Filled-span detection for a single row.
//!
//! A row is valid when its filled cells form one unbroken run. The span runs
//! from the first filled column to the last; any unfilled column strictly
//! inside it is a gap.

use crate::cell::CellValue;

/// Inclusive column range between the first and last filled cell of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub first: usize,
    pub last: usize,
}

impl Span {
    /// Widen to cover `other` as well.
    pub fn union(self, other: Span) -> Span {
        Span {
            first: self.first.min(other.first),
            last: self.last.max(other.last),
        }
    }
}

/// Locate the filled span of a row. `None` means the row is empty.
///
/// The backward scan stops at `first`, which is already known to be filled,
/// so each cell is visited at most once.
pub fn detect_span(cells: &[CellValue]) -> Option<Span> {
    let first = cells.iter().position(CellValue::is_filled)?;
    let last = (first..cells.len())
        .rev()
        .find(|&column| cells[column].is_filled())
        .unwrap_or(first);
    Some(Span { first, last })
}

/// Unfilled columns strictly between `span.first` and `span.last`.
pub fn gaps(cells: &[CellValue], span: Span) -> Vec<usize> {
    if span.first == span.last {
        return Vec::new();
    }
    (span.first + 1..span.last)
        .filter(|&column| !cells[column].is_filled())
        .collect()
}

/// Unfilled columns anywhere inside `window`, bounds included.
pub fn unfilled_within(cells: &[CellValue], window: Span) -> Vec<usize> {
    (window.first..=window.last.min(cells.len().saturating_sub(1)))
        .filter(|&column| !cells[column].is_filled())
        .collect()
}
