//! Temperature series from the wide-format table.
//!
//! Layout: row 0 is `label, Jan, Feb, ..., Dec`; each later row is one metric,
//! identified by its column-0 label. Exactly one row is consumed.

use tracing::warn;

use crate::domain::{MONTH_NAMES, TimePoint, month_number};
use crate::io::table::Grid;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MonthHeaderError {
    #[error("month header has {found} cells, expected a label plus 12 months")]
    TooShort { found: usize },
    #[error("month header column {column} is '{found}', expected '{expected}'")]
    OutOfOrder {
        column: usize,
        found: String,
        expected: &'static str,
    },
}

/// Check that header cells `1..=12` name the months in calendar order.
///
/// Short (`Jan`) and full (`January`) names are accepted, case-insensitively.
pub fn validate_month_header<S: AsRef<str>>(header: &[S]) -> Result<(), MonthHeaderError> {
    if header.len() < 13 {
        return Err(MonthHeaderError::TooShort {
            found: header.len(),
        });
    }
    for (offset, &expected) in MONTH_NAMES.iter().enumerate() {
        let column = offset + 1;
        let cell = header[column].as_ref().trim();
        if month_number(cell) != Some(column as u32) {
            return Err(MonthHeaderError::OutOfOrder {
                column,
                found: cell.to_string(),
                expected,
            });
        }
    }
    Ok(())
}

/// Extract the 12-point series for the row labeled `label`.
///
/// Returns an empty series when the grid is empty, the header is not a
/// calendar-ordered month row, or no row carries the label. Value cells that
/// do not parse as finite numbers become `0`.
pub fn extract_temperature_series(grid: &Grid, label: &str) -> Vec<TimePoint> {
    let Some(header) = grid.rows.first() else {
        return Vec::new();
    };

    if let Err(e) = validate_month_header(header.as_slice()) {
        warn!(error = %e, "temperature table header rejected");
        return Vec::new();
    }

    let label = label.trim();
    let Some(row) = grid
        .rows
        .iter()
        .find(|row| row.first().map(|c| c.trim()) == Some(label))
    else {
        return Vec::new();
    };

    // Header order is authoritative; keys keep the header's own spelling.
    (1..=12)
        .map(|idx| {
            let value = row.get(idx).map(|c| parse_cell(c)).unwrap_or(0.0);
            TimePoint::new(header[idx].trim(), value)
        })
        .collect()
}

fn parse_cell(cell: &str) -> f64 {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
