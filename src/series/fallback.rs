//! Default series and the substitution policy.
//!
//! Temperature, rainfall and bloom intensity fall back independently: one
//! unusable source never replaces another series that computed fine.

use tracing::warn;

use crate::domain::{DeliveredSeries, MONTH_NAMES, SeriesKind, SeriesOrigin, TimePoint};
use crate::io::source::SourceError;

/// Abu Dhabi monthly mean dry-bulb temperature (°C), Jan..Dec.
pub const DEFAULT_TEMPERATURE: [f64; 12] = [
    20.3, 21.0, 23.7, 27.3, 31.1, 33.3, 35.2, 35.8, 34.1, 31.3, 27.0, 22.9,
];

/// Abu Dhabi monthly mean rainfall total (mm), Jan..Dec.
pub const DEFAULT_RAINFALL: [f64; 12] = [
    34.63, 8.34, 9.71, 2.82, 2.25, 0.0, 0.56, 0.0, 0.0, 22.15, 7.60, 2.37,
];

/// Tribulus omanense relative bloom intensity, Jan..Dec.
pub const DEFAULT_BLOOM_INTENSITY: [f64; 12] = [
    20.0, 45.0, 85.0, 95.0, 70.0, 30.0, 10.0, 5.0, 8.0, 15.0, 25.0, 30.0,
];

/// Why a computed series could not be delivered.
#[derive(Debug, thiserror::Error)]
pub enum SeriesUnavailable {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("{0}")]
    NoUsableData(String),
}

/// Substitutes a literal 12-point series per kind when a pipeline yields nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackPolicy {
    temperature: [f64; 12],
    rainfall: [f64; 12],
    bloom: [f64; 12],
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPERATURE, DEFAULT_RAINFALL, DEFAULT_BLOOM_INTENSITY)
    }
}

impl FallbackPolicy {
    pub fn new(temperature: [f64; 12], rainfall: [f64; 12], bloom: [f64; 12]) -> Self {
        Self {
            temperature,
            rainfall,
            bloom,
        }
    }

    /// The literal series used for `kind`.
    pub fn default_series(&self, kind: SeriesKind) -> Vec<TimePoint> {
        let values = match kind {
            SeriesKind::Temperature => &self.temperature,
            SeriesKind::Rainfall => &self.rainfall,
            SeriesKind::Bloom => &self.bloom,
        };
        MONTH_NAMES
            .iter()
            .zip(values.iter())
            .map(|(name, value)| TimePoint::new(*name, *value))
            .collect()
    }

    /// Deliver `computed` when it has points, otherwise the default for `kind`.
    pub fn resolve(&self, kind: SeriesKind, computed: Result<Vec<TimePoint>, SeriesUnavailable>) -> DeliveredSeries {
        let reason = match computed {
            Ok(points) if !points.is_empty() => {
                return DeliveredSeries {
                    kind,
                    points,
                    origin: SeriesOrigin::Computed,
                };
            }
            Ok(_) => "pipeline produced no points".to_string(),
            Err(e) => e.to_string(),
        };

        warn!(series = kind.label(), reason = %reason, "using default series");
        DeliveredSeries {
            kind,
            points: self.default_series(kind),
            origin: SeriesOrigin::Fallback(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn computed_series_pass_through() {
        let policy = FallbackPolicy::default();
        let points = vec![TimePoint::new("Jan", 1.0)];
        let delivered = policy.resolve(SeriesKind::Rainfall, Ok(points.clone()));
        assert_eq!(delivered.points, points);
        assert_eq!(delivered.origin, SeriesOrigin::Computed);
    }

    #[test]
    fn empty_and_failed_pipelines_fall_back() {
        let policy = FallbackPolicy::default();

        let empty = policy.resolve(SeriesKind::Temperature, Ok(Vec::new()));
        assert!(empty.origin.is_fallback());
        assert_eq!(empty.points[0], TimePoint::new("Jan", 20.3));
        assert_eq!(empty.points.len(), 12);

        let missing = policy.resolve(
            SeriesKind::Rainfall,
            Err(SourceError::Missing(PathBuf::from("Rainfall.csv")).into()),
        );
        assert!(missing.origin.is_fallback());
        assert_eq!(missing.points[9], TimePoint::new("Oct", 22.15));
    }

    #[test]
    fn injected_literals_are_used() {
        let policy = FallbackPolicy::new([1.0; 12], [2.0; 12], [3.0; 12]);
        let series = policy.default_series(SeriesKind::Bloom);
        assert!(series.iter().all(|p| p.value == 3.0));
        assert_eq!(series[11].key, "Dec");
    }
}
