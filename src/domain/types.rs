//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - produced fresh by each pipeline run (nothing here is persisted)
//! - returned over HTTP as JSON
//! - exported to CSV/JSON from the CLI

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::months::month_name;

pub const DEFAULT_TEMPERATURE_SOURCE: &str = "Temperatures.csv";
pub const DEFAULT_RAINFALL_SOURCE: &str = "Rainfall.csv";
pub const DEFAULT_SATELLITE_SOURCE: &str = "liwa-HLSS30-020-results.csv";

/// Column-0 label of the daily-average row in the wide temperature table.
pub const DEFAULT_TEMPERATURE_LABEL: &str = "DBAvg (C)";
/// Measure code of monthly rainfall totals in the climate-indicator table.
pub const DEFAULT_RAINFALL_MEASURE: &str = "RAIN_TOTAL";
pub const DEFAULT_DATE_COLUMN: &str = "Date";
pub const DEFAULT_BAND_COLUMN: &str = "HLSS30_020_B08";

/// One labeled point of a uniform series (e.g. `Jan -> 20.3`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub key: String,
    pub value: f64,
}

impl TimePoint {
    pub fn new(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Calendar year + month grouping key, rendered as `YYYY-MM`.
///
/// Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Build a key; `None` unless `month` is in `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// Continuous time coordinate used by the trend fit: `year + (month - 1) / 12`.
    pub fn coordinate(self) -> f64 {
        f64::from(self.year) + f64::from(self.month - 1) / 12.0
    }

    pub fn month_name(self) -> &'static str {
        month_name(self.month).unwrap_or("?")
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A normalized row of the long-format climate-indicator table.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSample {
    /// Upper-cased measure code (`RAIN_TOTAL`, ...). Empty when neither column exists.
    pub measure_code: String,
    /// Raw time period string, normally `YYYY-MM`. Empty when neither column exists.
    pub year_month: String,
    /// `None` when the value cell is absent, empty, non-numeric or non-finite.
    pub value: Option<f64>,
}

/// A raw satellite observation: date-like string + band value string.
#[derive(Debug, Clone, PartialEq)]
pub struct BloomSample {
    pub date: String,
    pub raw_value: String,
}

impl BloomSample {
    pub fn new(date: impl Into<String>, raw_value: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            raw_value: raw_value.into(),
        }
    }
}

/// A row-level issue encountered while normalizing a table.
///
/// Issues are informational: the offending row is dropped or defaulted and the
/// surrounding aggregation continues.
#[derive(Debug, Clone, PartialEq)]
pub struct RowIssue {
    pub line: usize,
    pub message: String,
}

/// Which independent dashboard series a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Temperature,
    Rainfall,
    Bloom,
}

impl SeriesKind {
    pub fn label(self) -> &'static str {
        match self {
            SeriesKind::Temperature => "temperature",
            SeriesKind::Rainfall => "rainfall",
            SeriesKind::Bloom => "bloom intensity",
        }
    }
}

/// Where a delivered series came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "origin", content = "reason")]
pub enum SeriesOrigin {
    Computed,
    Fallback(String),
}

impl SeriesOrigin {
    pub fn is_fallback(&self) -> bool {
        matches!(self, SeriesOrigin::Fallback(_))
    }
}

/// A series ready for delivery, tagged with its origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveredSeries {
    pub kind: SeriesKind,
    pub points: Vec<TimePoint>,
    pub origin: SeriesOrigin,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment defaults).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Base directory for source strings that are not URLs.
    pub data_dir: PathBuf,
    pub temperature_source: String,
    pub rainfall_source: String,
    pub satellite_source: String,

    pub temperature_label: String,
    pub rainfall_measure: String,
    pub date_column: String,
    pub band_column: String,

    pub forecast_target: YearMonth,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            temperature_source: DEFAULT_TEMPERATURE_SOURCE.to_string(),
            rainfall_source: DEFAULT_RAINFALL_SOURCE.to_string(),
            satellite_source: DEFAULT_SATELLITE_SOURCE.to_string(),
            temperature_label: DEFAULT_TEMPERATURE_LABEL.to_string(),
            rainfall_measure: DEFAULT_RAINFALL_MEASURE.to_string(),
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            band_column: DEFAULT_BAND_COLUMN.to_string(),
            forecast_target: YearMonth { year: 2026, month: 1 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_month_displays_zero_padded() {
        let ym = YearMonth::new(2024, 3).unwrap();
        assert_eq!(ym.to_string(), "2024-03");
        assert!(YearMonth::new(2024, 13).is_none());
        assert!(YearMonth::new(2024, 0).is_none());
    }

    #[test]
    fn year_month_orders_chronologically() {
        let a = YearMonth::new(2023, 12).unwrap();
        let b = YearMonth::new(2024, 1).unwrap();
        assert!(a < b);
    }

    #[test]
    fn coordinate_adds_fractional_month() {
        let ym = YearMonth::new(2026, 7).unwrap();
        assert!((ym.coordinate() - (2026.0 + 6.0 / 12.0)).abs() < 1e-12);
    }
}
