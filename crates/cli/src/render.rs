//! Plain-text rendering of a grid.
//!
//! One block per table: the caption, a header row, then one line per year.
//! Each quarter's three months are followed by the quarter average, and the
//! year-to-date value closes the line. Derived columns stay blank until a
//! successful submission has filled them.

use periodgrid_engine::cell::DECIMALS;
use periodgrid_engine::cell_id::month_label;
use periodgrid_engine::{Grid, Row, MONTH_COUNT, PART_COUNT, PART_SIZE};

const GAP: &str = "  ";

pub fn render_grid(grid: &Grid, caption_template: &str) -> String {
    grid.tables()
        .iter()
        .map(|table| {
            let mut lines = vec![header()];
            lines.extend(table.rows.iter().map(row_fields));
            format!("{}\n{}", table.caption(caption_template), layout(&lines))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn header() -> Vec<String> {
    let mut fields = vec!["Year".to_string()];
    for quarter in 0..PART_COUNT {
        for column in quarter * PART_SIZE..(quarter + 1) * PART_SIZE {
            fields.push(month_label(column).to_string());
        }
        fields.push(format!("Q{}", quarter + 1));
    }
    fields.push("YTD".to_string());
    fields
}

fn row_fields(row: &Row) -> Vec<String> {
    let totals = row.totals();
    let derived = |value: Option<f64>| {
        value
            .map(|v| format!("{:.*}", DECIMALS as usize, v))
            .unwrap_or_default()
    };

    let mut fields = Vec::with_capacity(MONTH_COUNT + PART_COUNT + 2);
    fields.push(row.year.to_string());
    for (quarter, part) in row.parts().enumerate() {
        fields.extend(part.iter().map(|cell| cell.raw_display()));
        fields.push(derived(totals.map(|t| t.quarters[quarter])));
    }
    fields.push(derived(totals.map(|t| t.ytd)));
    fields
}

/// Right-align every column to its widest field.
fn layout(lines: &[Vec<String>]) -> String {
    let columns = lines.first().map_or(0, Vec::len);
    let widths: Vec<usize> = (0..columns)
        .map(|c| lines.iter().map(|l| l[c].chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    for line in lines {
        let padded: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(field, &width)| format!("{:>width$}", field, width = width))
            .collect();
        out.push_str(padded.join(GAP).trim_end());
        out.push('\n');
    }
    out
}
