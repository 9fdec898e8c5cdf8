//! Shared utilities for the analysis components.
//!
//! This module contains the dtype predicates and the small numeric kernels
//! (quantiles, moments, correlation) that every engine builds on, so that all
//! components agree on the same definitions. Correlation tests go through
//! `anofox_statistics`.

use anofox_statistics::correlation::pearson;
use polars::prelude::*;
use statrs::statistics::Statistics as _;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a native date or datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

/// Check if a DataType holds text.
#[inline]
pub fn is_string_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String)
}

// =============================================================================
// Numeric Kernels
// =============================================================================

/// Drop missing and non-finite entries.
pub fn present_values(values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect()
}

/// Sort a slice of floats ascending. NaN-free input is assumed.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Quantile of an ascending slice using linear interpolation between order
/// statistics. Returns 0.0 for an empty slice.
pub fn quantile_sorted(values: &[f64], quantile: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let pos = quantile.clamp(0.0, 1.0) * (values.len() as f64 - 1.0);
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return values[lower];
    }
    let weight = pos - lower as f64;
    values[lower] + (values[upper] - values[lower]) * weight
}

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().mean())
    }
}

/// Sample standard deviation (n - 1). Zero when fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    values.iter().std_dev()
}

/// Population standard deviation (n). Zero for an empty slice.
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().population_std_dev()
}

/// Minimum number of complete pairs for a correlation test.
pub const MIN_CORRELATION_PAIRS: usize = 3;

/// Pearson estimate with its two-sided p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    pub estimate: f64,
    pub p_value: f64,
}

/// Pearson correlation of two equally long series.
///
/// Returns `None` with fewer than [`MIN_CORRELATION_PAIRS`] pairs, when either
/// side is constant, or when the test yields no finite estimate.
pub fn correlation(x: &[f64], y: &[f64]) -> Option<Correlation> {
    if x.len() != y.len() || x.len() < MIN_CORRELATION_PAIRS || is_constant(x) || is_constant(y)
    {
        return None;
    }

    let result = pearson(x, y, Some(0.95)).ok()?;
    if !result.estimate.is_finite() {
        return None;
    }
    let estimate = result.estimate.clamp(-1.0, 1.0);
    let p_value = if result.p_value.is_finite() {
        result.p_value.clamp(0.0, 1.0)
    } else if 1.0 - estimate * estimate <= f64::EPSILON {
        // Perfect fit: t is unbounded.
        0.0
    } else {
        return None;
    };

    Some(Correlation { estimate, p_value })
}

/// Pearson correlation over the rows where both inputs are present.
pub fn pairwise_correlation(x: &[Option<f64>], y: &[Option<f64>]) -> Option<Correlation> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => Some((*a, *b)),
            _ => None,
        })
        .unzip();
    correlation(&xs, &ys)
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Percentage of `part` over `total`, 0.0 when `total` is zero.
#[inline]
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

// =============================================================================
// Tests
// =============================================================================
