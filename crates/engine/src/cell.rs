use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of decimal places kept for entered values and derived averages.
pub const DECIMALS: i32 = 2;

/// Above 2^53 every f64 is already a whole number.
const SNAP_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Contents of one month cell.
///
/// Serialized as `null` when unfilled and as a plain number otherwise, so a
/// `GridState` reads naturally as JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum CellValue {
    #[default]
    Unfilled,
    Value(f64),
}

/// Rejected cell input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellParseError {
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("'{0}' is not a finite number")]
    NotFinite(String),
}

impl From<Option<f64>> for CellValue {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(n) => CellValue::Value(n),
            None => CellValue::Unfilled,
        }
    }
}

impl From<CellValue> for Option<f64> {
    fn from(value: CellValue) -> Self {
        value.as_number()
    }
}

impl CellValue {
    /// Parse user input. Empty (or whitespace-only) input clears the cell.
    pub fn from_input(input: &str) -> Result<Self, CellParseError> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Ok(CellValue::Unfilled);
        }

        let num: f64 = trimmed
            .parse()
            .map_err(|_| CellParseError::NotANumber(trimmed.to_string()))?;
        let rounded = round_to(num, DECIMALS);
        if !rounded.is_finite() {
            return Err(CellParseError::NotFinite(trimmed.to_string()));
        }

        Ok(CellValue::Value(rounded))
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, CellValue::Value(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Value(n) => Some(*n),
            CellValue::Unfilled => None,
        }
    }

    /// Numeric contribution to a sum: unfilled cells count as zero.
    pub fn to_number(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }

    pub fn raw_display(&self) -> String {
        match self {
            CellValue::Unfilled => String::new(),
            CellValue::Value(n) => format_number(*n),
        }
    }
}

/// Render a value the way an input field would echo it back.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        let s = format!("{:.*}", DECIMALS as usize, n);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Round half away from zero to `decimals` places.
///
/// The scaled value is first snapped to 9 places so that inputs such as
/// `1.005`, stored as `1.00499999...`, round the way their decimal text reads.
/// Values too large to carry a fraction are returned unchanged.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    if !scaled.is_finite() || scaled.abs() >= SNAP_LIMIT {
        return value;
    }
    let snapped = (scaled * 1e9).round() / 1e9;
    snapped.round() / factor
}
