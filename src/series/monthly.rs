//! Calendar-month aggregation of indicator samples.
//!
//! Samples from any number of years are bucketed by calendar month and each
//! bucket is reduced to its mean. The output always has 12 points, Jan..Dec.

use crate::domain::{IndicatorSample, MONTH_NAMES, TimePoint};

/// Per-month sample buckets, indexed `0..12` for Jan..Dec.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyBuckets {
    buckets: [Vec<f64>; 12],
    used: usize,
}

impl MonthlyBuckets {
    /// Bucket the samples whose measure code equals `measure_code` and whose
    /// value and month are usable. Everything else is dropped silently.
    pub fn from_samples(samples: &[IndicatorSample], measure_code: &str) -> Self {
        let mut out = Self::default();
        for sample in samples {
            if sample.measure_code != measure_code {
                continue;
            }
            let Some(value) = sample.value.filter(|v| v.is_finite()) else {
                continue;
            };
            let Some(month) = month_of_period(&sample.year_month) else {
                continue;
            };
            out.push(month, value);
        }
        out
    }

    /// Add one value to the bucket of 1-based `month`. Out-of-range months are ignored.
    pub fn push(&mut self, month: u32, value: f64) {
        let Some(bucket) = (month as usize)
            .checked_sub(1)
            .and_then(|idx| self.buckets.get_mut(idx))
        else {
            return;
        };
        bucket.push(value);
        self.used += 1;
    }

    /// Number of samples that landed in any bucket.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Samples of one month, with `[0.0]` standing in for an empty bucket.
    pub fn bucket(&self, month: u32) -> &[f64] {
        const EMPTY_DEFAULT: &[f64] = &[0.0];
        match (month as usize).checked_sub(1).and_then(|idx| self.buckets.get(idx)) {
            Some(values) if !values.is_empty() => values,
            _ => EMPTY_DEFAULT,
        }
    }

    /// Mean of every month (2 decimals), in calendar order.
    pub fn averages(&self) -> Vec<TimePoint> {
        MONTH_NAMES
            .iter()
            .zip(1u32..)
            .map(|(name, month)| {
                let values = self.bucket(month);
                let avg = values.iter().sum::<f64>() / values.len() as f64;
                TimePoint::new(*name, round2(avg))
            })
            .collect()
    }
}

/// Average the `measure_code` samples by calendar month.
pub fn aggregate_monthly(samples: &[IndicatorSample], measure_code: &str) -> Vec<TimePoint> {
    MonthlyBuckets::from_samples(samples, measure_code).averages()
}

/// Month component (1..=12) of a `YYYY-MM` period string.
///
/// The string must contain at least two dash-separated parts; the second one
/// must be an integer in range.
pub fn month_of_period(period: &str) -> Option<u32> {
    let token = period.split('-').nth(1)?.trim();
    let month = token.parse::<u32>().ok()?;
    (1..=12).contains(&month).then_some(month)
}

/// Round half away from zero to 2 decimal places.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
