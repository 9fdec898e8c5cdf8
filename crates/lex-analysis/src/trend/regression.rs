//! Ordinary least squares against the row index.

use crate::utils::{Correlation, correlation};

/// Minimum number of observations for a fit with a defined p-value.
pub const MIN_OBSERVATIONS: usize = 3;

/// Result of a simple linear regression `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation between `x` and `y`.
    pub r: f64,
    /// Two-sided p-value for the null hypothesis `slope == 0`.
    pub p_value: f64,
}

/// Per-column regression failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegressionError {
    #[error("at least {required} observations required, got {actual}")]
    TooFewObservations { required: usize, actual: usize },

    #[error("regression produced a non-finite {0}")]
    NonFinite(&'static str),
}

/// Fit `values` against their index `0..n`.
///
/// A constant series fits with slope 0, r 0 and p 1.
pub fn fit_against_index(values: &[f64]) -> Result<LinearFit, RegressionError> {
    let n = values.len();
    if n < MIN_OBSERVATIONS {
        return Err(RegressionError::TooFewObservations {
            required: MIN_OBSERVATIONS,
            actual: n,
        });
    }

    let nf = n as f64;
    let mean_x = (nf - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / nf;

    if values.iter().all(|v| *v == values[0]) {
        return Ok(LinearFit {
            slope: 0.0,
            intercept: mean_y,
            r: 0.0,
            p_value: 1.0,
        });
    }

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }

    let slope = sxy / sxx;
    if !slope.is_finite() {
        return Err(RegressionError::NonFinite("slope"));
    }

    let index: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let Correlation { estimate, p_value } =
        correlation(&index, values).ok_or(RegressionError::NonFinite("correlation"))?;

    Ok(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
        r: estimate,
        p_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_increasing_line() {
        let fit = fit_against_index(&[10.0, 11.0, 12.0, 13.0, 14.0]).unwrap();
        assert!((fit.slope - 1.0).abs() < 1e-12);
        assert!((fit.intercept - 10.0).abs() < 1e-12);
        assert!((fit.r - 1.0).abs() < 1e-9);
        assert!(fit.p_value < 1e-6);
    }

    #[test]
    fn test_constant_series() {
        let fit = fit_against_index(&[3.0, 3.0, 3.0, 3.0]).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.r, 0.0);
        assert_eq!(fit.p_value, 1.0);
    }

    #[test]
    fn test_noisy_series_p_value() {
        // scipy.stats.linregress(range(6), [1, 3, 2, 5, 4, 6])
        let fit = fit_against_index(&[1.0, 3.0, 2.0, 5.0, 4.0, 6.0]).unwrap();
        assert!((fit.slope - 0.885_714_285_7).abs() < 1e-9);
        assert!((fit.r - 0.885_714_285_7).abs() < 1e-9);
        assert!((fit.p_value - 0.018_845).abs() < 1e-4);
    }

    #[test]
    fn test_too_few_observations() {
        let err = fit_against_index(&[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            RegressionError::TooFewObservations {
                required: 3,
                actual: 2
            }
        );
    }
}
