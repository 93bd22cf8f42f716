//! Climate-indicator normalization.
//!
//! The long-format indicator export comes in two header spellings (machine
//! codes and human labels). Every record is mapped onto one canonical
//! [`IndicatorSample`]; validity filtering is left to the consumers.

use crate::domain::{IndicatorSample, RowIssue};
use crate::io::table::{Record, RecordTable};

/// Accepted spellings of the measure-code column, in priority order.
pub const MEASURE_COLUMNS: [&str; 2] = ["CLIMATE_INDIC", "Climate Indicators"];
/// Accepted spellings of the time-period column (`YYYY-MM`).
pub const PERIOD_COLUMNS: [&str; 2] = ["TIME_PERIOD", "Time period"];
/// Accepted spellings of the observation-value column.
pub const VALUE_COLUMNS: [&str; 2] = ["OBS_VALUE", "Observation value"];

/// Normalizer output: one sample per input record, plus flags for records
/// where a canonical field had no column at all.
#[derive(Debug, Clone, Default)]
pub struct NormalizedIndicators {
    pub samples: Vec<IndicatorSample>,
    pub issues: Vec<RowIssue>,
}

/// Map every record of the indicator table onto an [`IndicatorSample`].
pub fn normalize_indicators(table: &RecordTable) -> NormalizedIndicators {
    let mut out = NormalizedIndicators {
        samples: Vec::with_capacity(table.len()),
        issues: Vec::new(),
    };

    for record in table.records() {
        let (sample, missing) = normalize_record(&record);
        if !missing.is_empty() {
            out.issues.push(RowIssue {
                line: record.line(),
                message: format!("no column for: {}", missing.join(", ")),
            });
        }
        out.samples.push(sample);
    }

    out
}

fn normalize_record(record: &Record<'_>) -> (IndicatorSample, Vec<&'static str>) {
    let mut missing = Vec::new();

    let measure = record.get_any(&MEASURE_COLUMNS);
    if measure.is_none() {
        missing.push("measure code");
    }
    let period = record.get_any(&PERIOD_COLUMNS);
    if period.is_none() {
        missing.push("time period");
    }
    let value = record.get_any(&VALUE_COLUMNS);
    if value.is_none() {
        missing.push("value");
    }

    let sample = IndicatorSample {
        measure_code: measure.unwrap_or("").trim().to_uppercase(),
        year_month: period.unwrap_or("").trim().to_string(),
        value: value.and_then(parse_value),
    };
    (sample, missing)
}

fn parse_value(cell: &str) -> Option<f64> {
    let v = cell.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::table::parse_records;

    #[test]
    fn both_header_spellings_normalize_identically() {
        let coded = parse_records("CLIMATE_INDIC,TIME_PERIOD,OBS_VALUE\nrain_total,2020-01,12.5\n");
        let labeled = parse_records(
            "Climate Indicators,Time period,Observation value\nRAIN_TOTAL,2020-01,12.5\n",
        );

        let a = normalize_indicators(&coded);
        let b = normalize_indicators(&labeled);
        assert_eq!(a.samples, b.samples);
        assert_eq!(a.samples[0].measure_code, "RAIN_TOTAL");
        assert_eq!(a.samples[0].value, Some(12.5));
        assert!(a.issues.is_empty());
    }

    #[test]
    fn unparsable_value_is_absent() {
        let table = parse_records("CLIMATE_INDIC,TIME_PERIOD,OBS_VALUE\nRAIN_TOTAL,2020-01,abc\nRAIN_TOTAL,2020-02,\n");
        let out = normalize_indicators(&table);
        assert_eq!(out.samples.len(), 2);
        assert_eq!(out.samples[0].value, None);
        assert_eq!(out.samples[1].value, None);
    }

    #[test]
    fn records_without_columns_are_kept_and_flagged() {
        let table = parse_records("Station,OBS_VALUE\nLiwa,3\n");
        let out = normalize_indicators(&table);
        assert_eq!(out.samples.len(), 1);
        assert_eq!(out.samples[0].measure_code, "");
        assert_eq!(out.samples[0].year_month, "");
        assert_eq!(out.samples[0].value, Some(3.0));
        assert_eq!(out.issues.len(), 1);
        assert!(out.issues[0].message.contains("measure code"));
        assert!(out.issues[0].message.contains("time period"));
    }
}
