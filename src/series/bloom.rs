//! Two-level bloom-intensity aggregation over point-sampled satellite data.
//!
//! Stage 1 averages raw band values per calendar year-month. Stage 2 averages
//! those year-month intensities per calendar month (ignoring the year), giving
//! the monthly histogram. Stage 1 also feeds the linear trend forecast.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::{BloomSample, MONTH_NAMES, TimePoint, YearMonth};
use crate::io::table::RecordTable;
use crate::math::ols::{LinearTrend, RegressionError};

/// Mean band value of one calendar year-month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearMonthIntensity {
    pub year: i32,
    pub month: u32,
    pub intensity: f64,
}

/// Mean of the year-month intensities that fall in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthIntensity {
    pub month: u32,
    pub avg_intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloomAggregate {
    /// Chronological.
    pub by_year_month: Vec<YearMonthIntensity>,
    /// Always 12 entries, months 1..=12.
    pub by_month: Vec<MonthIntensity>,
}

impl BloomAggregate {
    /// The `by_month` stage as a named monthly series.
    pub fn monthly_series(&self) -> Vec<TimePoint> {
        self.by_month
            .iter()
            .zip(MONTH_NAMES.iter())
            .map(|(m, name)| TimePoint::new(*name, m.avg_intensity))
            .collect()
    }
}

/// Trend forecast of the year-month intensities.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BloomForecast {
    pub target: YearMonth,
    pub predicted_intensity: f64,
    pub slope: f64,
    pub intercept: f64,
    pub n_points: usize,
}

/// Shown when there is no year-month group to fit.
pub const NO_BLOOM_DATA: &str = "No valid bloom data to predict.";

/// User-facing reason a bloom forecast could not be produced.
pub fn infeasible_reason(err: RegressionError) -> String {
    match err {
        RegressionError::NoPoints => NO_BLOOM_DATA.to_string(),
        other => other.to_string(),
    }
}

/// Pull `(date, band value)` pairs out of a satellite table.
///
/// Records with an absent or empty date or value cell are skipped; all other
/// columns are ignored.
pub fn bloom_samples_from_records(table: &RecordTable, date_column: &str, band_column: &str) -> Vec<BloomSample> {
    table
        .records()
        .filter_map(|record| {
            let date = record.get(date_column)?.trim();
            let value = record.get(band_column)?.trim();
            if date.is_empty() || value.is_empty() {
                return None;
            }
            Some(BloomSample::new(date, value))
        })
        .collect()
}

/// Parse a date-like string into its calendar date.
///
/// Accepts RFC 3339 timestamps, ISO dates (with optional time), `YYYY/MM/DD`
/// and US-style `MM/DD/YYYY`.
pub fn parse_sample_date(s: &str) -> Option<NaiveDate> {
    const DATE_FMTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    const DATETIME_FMTS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Run both aggregation stages.
///
/// Samples with an unparsable date, a non-numeric value or a negative value
/// are discarded before grouping.
pub fn aggregate_bloom(samples: &[BloomSample]) -> BloomAggregate {
    let mut groups: BTreeMap<YearMonth, Vec<f64>> = BTreeMap::new();
    for sample in samples {
        let Some(date) = parse_sample_date(&sample.date) else {
            continue;
        };
        let Some(value) = parse_band_value(&sample.raw_value) else {
            continue;
        };
        let Some(key) = YearMonth::new(date.year(), date.month()) else {
            continue;
        };
        groups.entry(key).or_default().push(value);
    }

    let by_year_month: Vec<YearMonthIntensity> = groups
        .into_iter()
        .map(|(key, values)| YearMonthIntensity {
            year: key.year,
            month: key.month,
            intensity: mean(&values),
        })
        .collect();

    let mut per_month: [Vec<f64>; 12] = Default::default();
    for entry in &by_year_month {
        per_month[(entry.month - 1) as usize].push(entry.intensity);
    }

    let by_month = per_month
        .iter()
        .zip(1u32..)
        .map(|(values, month)| MonthIntensity {
            month,
            avg_intensity: if values.is_empty() { 0.0 } else { mean(values) },
        })
        .collect();

    BloomAggregate {
        by_year_month,
        by_month,
    }
}

/// Fit the year-month intensities against `year + (month - 1) / 12` and
/// evaluate the trend at `target`.
pub fn forecast_bloom(by_year_month: &[YearMonthIntensity], target: YearMonth) -> Result<BloomForecast, RegressionError> {
    let points: Vec<(f64, f64)> = by_year_month
        .iter()
        .filter_map(|e| YearMonth::new(e.year, e.month).map(|ym| (ym.coordinate(), e.intensity)))
        .collect();

    let trend = LinearTrend::fit(&points)?;
    Ok(BloomForecast {
        target,
        predicted_intensity: trend.predict(target.coordinate()),
        slope: trend.slope,
        intercept: trend.intercept,
        n_points: points.len(),
    })
}

fn parse_band_value(s: &str) -> Option<f64> {
    let v = s.trim().parse::<f64>().ok()?;
    if v.is_finite() && v >= 0.0 { Some(v) } else { None }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;

    use super::*;
    use crate::io::table::parse_records;

    fn s(date: &str, value: &str) -> BloomSample {
        BloomSample::new(date, value)
    }

    #[test]
    fn two_stage_average_across_years() {
        let agg = aggregate_bloom(&[
            s("2024-01-05", "10"),
            s("2024-01-20", "20"),
            s("2025-01-10", "0"),
        ]);

        assert_eq!(
            agg.by_year_month,
            vec![
                YearMonthIntensity { year: 2024, month: 1, intensity: 15.0 },
                YearMonthIntensity { year: 2025, month: 1, intensity: 0.0 },
            ]
        );
        assert_eq!(agg.by_month.len(), 12);
        assert!((agg.by_month[0].avg_intensity - 7.5).abs() < 1e-12);
        assert!(agg.by_month[1..].iter().all(|m| m.avg_intensity == 0.0));
    }

    #[test]
    fn invalid_samples_are_discarded() {
        let agg = aggregate_bloom(&[
            s("2024-02-01", "4"),
            s("garbage", "10"),
            s("2024-02-03", "abc"),
            s("2024-02-04", "-1"),
            s("2024-02-05", "NaN"),
        ]);
        assert_eq!(agg.by_year_month.len(), 1);
        assert_eq!(agg.by_year_month[0].intensity, 4.0);
    }

    #[test]
    fn by_month_is_ordered_regardless_of_input_order() {
        let mut samples: Vec<BloomSample> = (1..=12)
            .flat_map(|m| (2020..2024).map(move |y| s(&format!("{y}-{m:02}-15"), &format!("{}", m * 100 + y % 7))))
            .collect();
        let expected = aggregate_bloom(&samples);

        let mut rng = StdRng::seed_from_u64(11);
        samples.shuffle(&mut rng);
        let agg = aggregate_bloom(&samples);

        let months: Vec<u32> = agg.by_month.iter().map(|m| m.month).collect();
        assert_eq!(months, (1..=12).collect::<Vec<u32>>());
        assert_eq!(agg, expected);
        assert_eq!(agg.monthly_series()[11].key, "Dec");
    }

    #[test]
    fn accepts_common_date_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        for input in [
            "2024-03-09",
            "2024/03/09",
            "03/09/2024",
            "2024-03-09T10:20:30Z",
            "2024-03-09T10:20:30",
            "2024-03-09 10:20:30.5",
        ] {
            assert_eq!(parse_sample_date(input), Some(expected), "{input}");
        }
        assert_eq!(parse_sample_date("2024-13-01"), None);
    }

    #[test]
    fn samples_come_from_named_columns_only() {
        let table = parse_records(
            "ID,Date,Latitude,HLSS30_020_B08\n1,2024-01-05,23.1,0.25\n2,,23.1,0.3\n3,2024-01-07,23.1,\n",
        );
        let samples = bloom_samples_from_records(&table, "Date", "HLSS30_020_B08");
        assert_eq!(samples, vec![s("2024-01-05", "0.25")]);
    }

    #[test]
    fn forecast_extrapolates_trend() {
        let by_year_month = vec![
            YearMonthIntensity { year: 2024, month: 1, intensity: 10.0 },
            YearMonthIntensity { year: 2025, month: 1, intensity: 20.0 },
        ];
        let target = YearMonth::new(2026, 1).unwrap();
        let forecast = forecast_bloom(&by_year_month, target).unwrap();
        assert!((forecast.predicted_intensity - 30.0).abs() < 1e-9);
        assert_eq!(forecast.n_points, 2);
    }

    #[test]
    fn forecast_without_data_is_infeasible() {
        let target = YearMonth::new(2026, 1).unwrap();
        assert_eq!(forecast_bloom(&[], target), Err(RegressionError::NoPoints));
        assert_eq!(infeasible_reason(RegressionError::NoPoints), NO_BLOOM_DATA);
        assert_eq!(
            infeasible_reason(RegressionError::ZeroVariance),
            RegressionError::ZeroVariance.to_string()
        );
    }
}
