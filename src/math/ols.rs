//! Ordinary least squares trend line.
//!
//! We fit a single-regressor model
//!
//! ```text
//! y = intercept + slope * x
//! ```
//!
//! with the closed form
//!
//! ```text
//! slope     = Σ(x - x̄)(y - ȳ) / Σ(x - x̄)²
//! intercept = ȳ - slope * x̄
//! ```
//!
//! Fitting refuses degenerate inputs instead of returning a meaningless model:
//! there is no sensible default prediction when the trend is undefined.
//! Prediction does not bound extrapolation distance.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegressionError {
    #[error("Cannot compute regression: no points.")]
    NoPoints,
    #[error("Cannot compute regression: all x values are identical.")]
    ZeroVariance,
    #[error("Cannot compute regression: non-finite input.")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    /// Fit `(x, y)` pairs.
    ///
    /// Fails on an empty input, on identical x values and on non-finite values.
    pub fn fit(points: &[(f64, f64)]) -> Result<Self, RegressionError> {
        let Some(&(x0, _)) = points.first() else {
            return Err(RegressionError::NoPoints);
        };
        if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(RegressionError::NonFinite);
        }
        // Compared directly: a mean of identical values can be off by an ulp.
        if points.iter().all(|&(x, _)| x == x0) {
            return Err(RegressionError::ZeroVariance);
        }

        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

        let mut num = 0.0;
        let mut den = 0.0;
        for &(x, y) in points {
            let dx = x - mean_x;
            num += dx * (y - mean_y);
            den += dx * dx;
        }
        if den == 0.0 {
            return Err(RegressionError::ZeroVariance);
        }

        let slope = num / den;
        Ok(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_line() {
        // y = 1 + 2x on x = [0,1,2]
        let trend = LinearTrend::fit(&[(0.0, 1.0), (1.0, 3.0), (2.0, 5.0)]).unwrap();
        assert!((trend.slope - 2.0).abs() < 1e-12);
        assert!((trend.intercept - 1.0).abs() < 1e-12);
        assert!((trend.predict(3.0) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn single_point_or_identical_x_is_infeasible() {
        assert_eq!(LinearTrend::fit(&[]), Err(RegressionError::NoPoints));
        assert_eq!(
            LinearTrend::fit(&[(5.0, 1.0), (5.0, 9.0)]),
            Err(RegressionError::ZeroVariance)
        );
        assert_eq!(LinearTrend::fit(&[(5.0, 1.0)]), Err(RegressionError::ZeroVariance));
    }

    #[test]
    fn error_text_is_domain_neutral() {
        assert_eq!(
            RegressionError::NoPoints.to_string(),
            "Cannot compute regression: no points."
        );
    }

    #[test]
    fn non_finite_input_is_rejected() {
        assert_eq!(
            LinearTrend::fit(&[(0.0, 1.0), (1.0, f64::NAN)]),
            Err(RegressionError::NonFinite)
        );
    }

    #[test]
    fn extrapolates_far_outside_sample() {
        let trend = LinearTrend::fit(&[(2020.0, 1.0), (2021.0, 2.0)]).unwrap();
        assert!((trend.predict(2120.0) - 101.0).abs() < 1e-6);
    }
}
