//! Descriptive statistics over a dataset.
//!
//! [`StatisticsEngine`] produces the shape, duplicate and memory figures of a
//! dataset, a describe-style summary of every numeric column, a frequency
//! summary of the leading categorical columns, a missing-data profile and a
//! pairwise correlation matrix.

use crate::config::AnalysisConfig;
use crate::dataset::DatasetView;
use crate::error::{Result, ResultExt};
use crate::utils::{
    mean, pairwise_correlation, percentage, present_values, quantile_sorted, sample_std, sorted,
};
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

// =============================================================================
// Report Types
// =============================================================================

/// Row and column counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shape {
    pub rows: usize,
    pub columns: usize,
}

/// Dataset-level figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicInfo {
    pub total_rows: usize,
    pub total_columns: usize,
    /// Estimated in-memory size in bytes.
    pub memory_usage: usize,
    /// Rows equal to an earlier row across all columns.
    pub duplicated_rows: usize,
    /// Storage dtype per column.
    pub data_types: BTreeMap<String, String>,
}

/// Describe-style summary of a numeric column over its non-missing values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; 0.0 with fewer than two values.
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// A value and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueFrequency {
    pub value: String,
    pub count: usize,
}

/// Frequency summary of a categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoricalSummary {
    pub unique_count: usize,
    pub top_values: Vec<ValueFrequency>,
    pub missing_count: usize,
}

/// Missing-data profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingnessReport {
    pub missing_counts: BTreeMap<String, usize>,
    /// Percentage of all rows, per column.
    pub missing_percentage: BTreeMap<String, f64>,
    pub complete_rows: usize,
    pub rows_with_missing: usize,
}

/// Pairwise Pearson correlations between numeric columns.
///
/// `values[i][j]` is the coefficient of `columns[i]` against `columns[j]`
/// over rows where both are present; `None` when undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

/// Output of [`StatisticsEngine::compute_basic_statistics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsReport {
    pub shape: Shape,
    pub basic_info: BasicInfo,
    pub numeric_summary: BTreeMap<String, NumericSummary>,
    pub categorical_summary: BTreeMap<String, CategoricalSummary>,
    pub missing_analysis: MissingnessReport,
    pub correlation_matrix: CorrelationMatrix,
}

// =============================================================================
// Engine
// =============================================================================

/// Computes basic statistics for a dataset.
#[derive(Debug, Clone)]
pub struct StatisticsEngine {
    categorical_column_limit: usize,
    top_value_count: usize,
}

impl Default for StatisticsEngine {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl StatisticsEngine {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            categorical_column_limit: config.categorical_column_limit,
            top_value_count: config.top_value_count,
        }
    }

    /// Compute the full statistics report.
    ///
    /// Absence of numeric or categorical columns yields empty sub-reports.
    pub fn compute_basic_statistics(&self, dataset: &DatasetView) -> Result<StatisticsReport> {
        let rows = dataset.row_count();
        let columns = dataset.column_count();

        let basic_info = BasicInfo {
            total_rows: rows,
            total_columns: columns,
            memory_usage: dataset.dataframe().estimated_size(),
            duplicated_rows: count_duplicated_rows(dataset.dataframe())?,
            data_types: dataset
                .schema()
                .iter()
                .map(|c| (c.name.clone(), c.dtype.clone()))
                .collect(),
        };

        let mut numeric_values = Vec::new();
        let mut numeric_summary = BTreeMap::new();
        for name in dataset.numeric_columns() {
            let values = dataset.numeric_values(name)?;
            match summarize_numeric(&values) {
                Some(summary) => {
                    numeric_summary.insert(name.to_string(), summary);
                    numeric_values.push((name.to_string(), values));
                }
                None => debug!("Skipping all-missing numeric column '{}'", name),
            }
        }

        let mut categorical_summary = BTreeMap::new();
        for name in dataset
            .categorical_columns()
            .into_iter()
            .take(self.categorical_column_limit)
        {
            let values = match dataset.string_values(name) {
                Ok(values) => values,
                Err(e) => {
                    debug!("Skipping categorical column '{}': {}", name, e);
                    continue;
                }
            };
            categorical_summary.insert(
                name.to_string(),
                summarize_categorical(&values, self.top_value_count),
            );
        }

        let report = StatisticsReport {
            shape: Shape { rows, columns },
            basic_info,
            numeric_summary,
            categorical_summary,
            missing_analysis: missingness(dataset)?,
            correlation_matrix: correlation_matrix(&numeric_values),
        };

        debug!(
            "Computed statistics for {} rows x {} columns ({} duplicated rows)",
            rows, columns, report.basic_info.duplicated_rows
        );
        Ok(report)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn count_duplicated_rows(df: &DataFrame) -> Result<usize> {
    if df.width() == 0 {
        return Ok(0);
    }
    let unique = df
        .unique::<&str, &str>(None, UniqueKeepStrategy::First, None)
        .context("Failed to deduplicate rows")?;
    Ok(df.height().saturating_sub(unique.height()))
}

/// Summarize a numeric column, or `None` when it has no present values.
pub(crate) fn summarize_numeric(values: &[Option<f64>]) -> Option<NumericSummary> {
    let present = present_values(values);
    let average = mean(&present)?;
    let sorted = sorted(&present);

    Some(NumericSummary {
        count: present.len(),
        mean: average,
        std: sample_std(&present),
        min: sorted[0],
        q1: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q3: quantile_sorted(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

/// Count occurrences and keep the `top` most frequent values, ordered by
/// count descending then value ascending.
pub(crate) fn top_values(values: &[Option<String>], top: usize) -> Vec<ValueFrequency> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values.iter().flatten() {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }

    let mut frequencies: Vec<ValueFrequency> = counts
        .into_iter()
        .map(|(value, count)| ValueFrequency {
            value: value.to_string(),
            count,
        })
        .collect();
    // Stable sort: equal counts stay in ascending value order.
    frequencies.sort_by(|a, b| b.count.cmp(&a.count));
    frequencies.truncate(top);
    frequencies
}

fn summarize_categorical(values: &[Option<String>], top: usize) -> CategoricalSummary {
    let missing_count = values.iter().filter(|v| v.is_none()).count();
    let unique_count = values
        .iter()
        .flatten()
        .collect::<std::collections::BTreeSet<_>>()
        .len();

    CategoricalSummary {
        unique_count,
        top_values: top_values(values, top),
        missing_count,
    }
}

fn missingness(dataset: &DatasetView) -> Result<MissingnessReport> {
    let rows = dataset.row_count();
    let mut row_has_missing = vec![false; rows];
    let mut missing_counts = BTreeMap::new();
    let mut missing_percentage = BTreeMap::new();

    for column in dataset.schema() {
        let mask = dataset.missing_mask(&column.name)?;
        let missing = mask.iter().filter(|m| **m).count();
        for (flag, is_missing) in row_has_missing.iter_mut().zip(&mask) {
            *flag |= *is_missing;
        }
        missing_counts.insert(column.name.clone(), missing);
        missing_percentage.insert(column.name.clone(), percentage(missing, rows));
    }

    let rows_with_missing = row_has_missing.iter().filter(|m| **m).count();
    Ok(MissingnessReport {
        missing_counts,
        missing_percentage,
        complete_rows: rows - rows_with_missing,
        rows_with_missing,
    })
}

fn correlation_matrix(columns: &[(String, Vec<Option<f64>>)]) -> CorrelationMatrix {
    let values = columns
        .iter()
        .map(|(_, x)| {
            columns
                .iter()
                .map(|(_, y)| pairwise_correlation(x, y).map(|c| c.estimate))
                .collect()
        })
        .collect();

    CorrelationMatrix {
        columns: columns.iter().map(|(name, _)| name.clone()).collect(),
        values,
    }
}
