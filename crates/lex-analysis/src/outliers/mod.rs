//! Outlier detection for numeric columns.
//!
//! Two independent rules are applied to every column:
//!
//! - **IQR method**: values outside `[Q1 - m·IQR, Q3 + m·IQR]`
//! - **Z-score method**: values whose population z-score exceeds the threshold
//!
//! Percentages are expressed over the dataset's total row count.

use crate::config::AnalysisConfig;
use crate::dataset::{ColumnKind, DatasetView};
use crate::error::Result;
use crate::utils::{mean, percentage, population_std, present_values, quantile_sorted, sample_std, sorted};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// IQR rule result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IqrOutliers {
    pub count: usize,
    pub percentage: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub q1: f64,
    pub q3: f64,
}

/// Z-score rule result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZScoreOutliers {
    pub count: usize,
    pub percentage: f64,
    pub threshold: f64,
}

/// Descriptive statistics of the column the rules were applied to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStatistics {
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Outlier findings for a single column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    pub iqr_method: IqrOutliers,
    pub zscore_method: ZScoreOutliers,
    pub statistics: ColumnStatistics,
}

/// Detects IQR and Z-score outliers.
#[derive(Debug, Clone)]
pub struct OutlierDetector {
    iqr_multiplier: f64,
    zscore_threshold: f64,
    column_limit: Option<usize>,
}

impl Default for OutlierDetector {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl OutlierDetector {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            iqr_multiplier: config.iqr_multiplier,
            zscore_threshold: config.zscore_threshold,
            column_limit: config.outlier_column_limit,
        }
    }

    /// Detect outliers in the given columns, or in every numeric column.
    ///
    /// A caller-supplied name that does not exist is an error. Columns that
    /// are not numeric or have no present values are skipped.
    pub fn detect_outliers(
        &self,
        dataset: &DatasetView,
        columns: Option<&[String]>,
    ) -> Result<BTreeMap<String, OutlierReport>> {
        let targets: Vec<String> = match columns {
            Some(names) => {
                for name in names {
                    dataset.require_column(name)?;
                }
                names.to_vec()
            }
            None => {
                let numeric = dataset.numeric_columns().into_iter().map(String::from);
                match self.column_limit {
                    Some(limit) => numeric.take(limit).collect(),
                    None => numeric.collect(),
                }
            }
        };

        let total_rows = dataset.row_count();
        let mut reports = BTreeMap::new();

        for name in targets {
            if dataset.kind_of(&name) != Some(ColumnKind::Numeric) {
                debug!("Skipping non-numeric column '{}' for outlier detection", name);
                continue;
            }

            let values = present_values(&dataset.numeric_values(&name)?);
            match self.analyze_values(&values, total_rows) {
                Some(report) => {
                    debug!(
                        "Column '{}': {} IQR outliers, {} z-score outliers",
                        name, report.iqr_method.count, report.zscore_method.count
                    );
                    reports.insert(name, report);
                }
                None => debug!("Skipping all-missing column '{}' for outlier detection", name),
            }
        }

        Ok(reports)
    }

    /// Apply both rules to the present values of one column.
    fn analyze_values(&self, values: &[f64], total_rows: usize) -> Option<OutlierReport> {
        let average = mean(values)?;
        let sorted = sorted(values);

        let q1 = quantile_sorted(&sorted, 0.25);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        let lower_bound = q1 - self.iqr_multiplier * iqr;
        let upper_bound = q3 + self.iqr_multiplier * iqr;
        let iqr_count = values
            .iter()
            .filter(|v| **v < lower_bound || **v > upper_bound)
            .count();

        // A constant column has no z-scores to speak of.
        let pop_std = population_std(values);
        let z_count = if pop_std > 0.0 {
            values
                .iter()
                .filter(|v| ((**v - average) / pop_std).abs() > self.zscore_threshold)
                .count()
        } else {
            0
        };

        Some(OutlierReport {
            iqr_method: IqrOutliers {
                count: iqr_count,
                percentage: percentage(iqr_count, total_rows),
                lower_bound,
                upper_bound,
                q1,
                q3,
            },
            zscore_method: ZScoreOutliers {
                count: z_count,
                percentage: percentage(z_count, total_rows),
                threshold: self.zscore_threshold,
            },
            statistics: ColumnStatistics {
                mean: average,
                median: quantile_sorted(&sorted, 0.5),
                std: sample_std(values),
                min: sorted[0],
                max: sorted[sorted.len() - 1],
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use polars::prelude::*;
    use proptest::prelude::*;

    fn view(df: DataFrame) -> DatasetView {
        DatasetView::new(df)
    }

    #[test]
    fn test_iqr_outlier_counted() {
        let df = df!["x" => [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0]].unwrap();
        let reports = OutlierDetector::default()
            .detect_outliers(&view(df), None)
            .unwrap();
        let report = &reports["x"];

        assert_eq!(report.iqr_method.count, 1);
        assert_eq!(report.iqr_method.percentage, 10.0);
        assert!(report.iqr_method.lower_bound <= report.iqr_method.q1);
        assert!(report.iqr_method.q3 <= report.iqr_method.upper_bound);
        assert_eq!(report.statistics.max, 100.0);
    }

    #[test]
    fn test_zscore_outlier() {
        let mut values = vec![10.0; 30];
        values.push(1000.0);
        let df = df!["x" => values].unwrap();
        let reports = OutlierDetector::default()
            .detect_outliers(&view(df), None)
            .unwrap();

        assert_eq!(reports["x"].zscore_method.count, 1);
        assert_eq!(reports["x"].zscore_method.threshold, 3.0);
    }

    #[test]
    fn test_zero_variance_has_no_zscore_outliers() {
        let df = df!["flat" => [7.0; 20]].unwrap();
        let reports = OutlierDetector::default()
            .detect_outliers(&view(df), None)
            .unwrap();
        let report = &reports["flat"];

        assert_eq!(report.zscore_method.count, 0);
        assert_eq!(report.iqr_method.count, 0);
        assert_eq!(report.statistics.std, 0.0);
    }

    #[test]
    fn test_skips_non_numeric_and_all_missing() {
        let df = df![
            "category" => ["a", "b", "c"],
            "empty" => [None::<f64>, None, None],
            "x" => [1.0, 2.0, 3.0],
        ]
        .unwrap();
        let names = vec!["category".to_string(), "empty".to_string(), "x".to_string()];
        let reports = OutlierDetector::default()
            .detect_outliers(&view(df), Some(&names))
            .unwrap();

        assert_eq!(reports.keys().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn test_unknown_column_is_an_error() {
        let df = df!["x" => [1.0, 2.0]].unwrap();
        let names = vec!["y".to_string()];
        let err = OutlierDetector::default()
            .detect_outliers(&view(df), Some(&names))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ColumnNotFound(_)));
    }

    #[test]
    fn test_column_limit() {
        let df = df!["a" => [1.0], "b" => [2.0], "c" => [3.0]].unwrap();
        let config = AnalysisConfig::builder()
            .outlier_column_limit(2)
            .build()
            .unwrap();
        let reports = OutlierDetector::from_config(&config)
            .detect_outliers(&view(df), None)
            .unwrap();
        assert_eq!(reports.len(), 2);
    }

    #[test]
    fn test_percentage_uses_total_rows() {
        let df = df!["x" => [Some(1.0), Some(1.0), Some(1.0), Some(50.0), None]].unwrap();
        let reports = OutlierDetector::default()
            .detect_outliers(&view(df), None)
            .unwrap();
        assert_eq!(reports["x"].iqr_method.count, 1);
        assert_eq!(reports["x"].iqr_method.percentage, 20.0);
    }

    proptest! {
        #[test]
        fn prop_iqr_bounds_are_ordered_and_exact(
            values in prop::collection::vec(-1.0e6f64..1.0e6, 1..200)
        ) {
            let expected = {
                let detector = OutlierDetector::default();
                detector.analyze_values(&values, values.len()).unwrap()
            };
            let iqr = &expected.iqr_method;

            prop_assert!(iqr.lower_bound <= iqr.q1);
            prop_assert!(iqr.q1 <= iqr.q3);
            prop_assert!(iqr.q3 <= iqr.upper_bound);

            let outside = values
                .iter()
                .filter(|v| **v < iqr.lower_bound || **v > iqr.upper_bound)
                .count();
            prop_assert_eq!(iqr.count, outside);
        }
    }
}
