//! Configuration types for the analysis pipeline.
//!
//! This module holds every numeric policy knob the analysis components use
//! (bounds, thresholds, caps, seeds), with a builder that validates them.

use crate::visualization::VisualizationMode;
use serde::{Deserialize, Serialize};

/// Configuration for the analysis components.
///
/// Use [`AnalysisConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use lex_analysis::config::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .n_clusters(4)
///     .zscore_threshold(2.5)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Maximum number of categorical columns summarized.
    /// Default: 10
    pub categorical_column_limit: usize,

    /// Number of most frequent values reported per categorical column.
    /// Default: 3
    pub top_value_count: usize,

    /// Maximum number of numeric columns scanned for outliers when the
    /// caller does not name them. `None` scans every numeric column.
    /// Default: None
    pub outlier_column_limit: Option<usize>,

    /// Whisker multiplier for the IQR method.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Absolute z-score above which a value is an outlier.
    /// Default: 3.0
    pub zscore_threshold: f64,

    /// Maximum number of value columns fitted by the trend analyzer.
    /// Default: 5
    pub trend_column_limit: usize,

    /// |r| above which a trend is tagged `strong`.
    /// Default: 0.7
    pub strong_correlation: f64,

    /// |r| above which a trend is tagged `moderate`.
    /// Default: 0.3
    pub moderate_correlation: f64,

    /// Requested number of clusters.
    /// Default: 3
    pub n_clusters: usize,

    /// Number of k-means initializations; the lowest inertia wins.
    /// Default: 10
    pub kmeans_n_init: usize,

    /// Maximum Lloyd iterations per initialization.
    /// Default: 300
    pub kmeans_max_iter: usize,

    /// Centroid shift below which k-means stops.
    /// Default: 1e-4
    pub kmeans_tolerance: f64,

    /// Seed for k-means initialization.
    /// Default: 42
    pub random_seed: u64,

    /// Maximum number of numeric columns in the combined box plot.
    /// Default: 4
    pub boxplot_column_limit: usize,

    /// Number of most frequent values shown in the pie chart.
    /// Default: 8
    pub pie_top_values: usize,

    /// Chart selection mode used by the pipeline.
    /// Default: All
    pub visualization_mode: VisualizationMode,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            categorical_column_limit: 10,
            top_value_count: 3,
            outlier_column_limit: None,
            iqr_multiplier: 1.5,
            zscore_threshold: 3.0,
            trend_column_limit: 5,
            strong_correlation: 0.7,
            moderate_correlation: 0.3,
            n_clusters: 3,
            kmeans_n_init: 10,
            kmeans_max_iter: 300,
            kmeans_tolerance: 1e-4,
            random_seed: 42,
            boxplot_column_limit: 4,
            pie_top_values: 8,
            visualization_mode: VisualizationMode::All,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let limits = [
            ("categorical_column_limit", self.categorical_column_limit),
            ("top_value_count", self.top_value_count),
            ("trend_column_limit", self.trend_column_limit),
            ("boxplot_column_limit", self.boxplot_column_limit),
            ("pie_top_values", self.pie_top_values),
            ("n_clusters", self.n_clusters),
            ("kmeans_n_init", self.kmeans_n_init),
            ("kmeans_max_iter", self.kmeans_max_iter),
        ];
        for (field, value) in limits {
            if value == 0 {
                return Err(ConfigValidationError::ZeroLimit(field.to_string()));
            }
        }

        if self.outlier_column_limit == Some(0) {
            return Err(ConfigValidationError::ZeroLimit(
                "outlier_column_limit".to_string(),
            ));
        }

        let positives = [
            ("iqr_multiplier", self.iqr_multiplier),
            ("zscore_threshold", self.zscore_threshold),
            ("kmeans_tolerance", self.kmeans_tolerance),
        ];
        for (field, value) in positives {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigValidationError::NotPositive {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if !(0.0 < self.moderate_correlation
            && self.moderate_correlation < self.strong_correlation
            && self.strong_correlation < 1.0)
        {
            return Err(ConfigValidationError::InvalidCorrelationThresholds {
                moderate: self.moderate_correlation,
                strong: self.strong_correlation,
            });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("'{0}' must be at least 1")]
    ZeroLimit(String),

    #[error("'{field}' must be a positive finite number, got {value}")]
    NotPositive { field: String, value: f64 },

    #[error(
        "Invalid correlation thresholds: moderate={moderate}, strong={strong} (need 0 < moderate < strong < 1)"
    )]
    InvalidCorrelationThresholds { moderate: f64, strong: f64 },
}

impl From<ConfigValidationError> for crate::error::AnalysisError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::AnalysisError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    categorical_column_limit: Option<usize>,
    top_value_count: Option<usize>,
    outlier_column_limit: Option<usize>,
    iqr_multiplier: Option<f64>,
    zscore_threshold: Option<f64>,
    trend_column_limit: Option<usize>,
    strong_correlation: Option<f64>,
    moderate_correlation: Option<f64>,
    n_clusters: Option<usize>,
    kmeans_n_init: Option<usize>,
    kmeans_max_iter: Option<usize>,
    kmeans_tolerance: Option<f64>,
    random_seed: Option<u64>,
    boxplot_column_limit: Option<usize>,
    pie_top_values: Option<usize>,
    visualization_mode: Option<VisualizationMode>,
}

impl AnalysisConfigBuilder {
    /// Set the maximum number of categorical columns summarized.
    pub fn categorical_column_limit(mut self, limit: usize) -> Self {
        self.categorical_column_limit = Some(limit);
        self
    }

    /// Set how many top values are reported per categorical column.
    pub fn top_value_count(mut self, count: usize) -> Self {
        self.top_value_count = Some(count);
        self
    }

    /// Cap the number of numeric columns scanned for outliers.
    pub fn outlier_column_limit(mut self, limit: usize) -> Self {
        self.outlier_column_limit = Some(limit);
        self
    }

    /// Set the IQR whisker multiplier.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set the absolute z-score threshold.
    pub fn zscore_threshold(mut self, threshold: f64) -> Self {
        self.zscore_threshold = Some(threshold);
        self
    }

    /// Set the maximum number of value columns fitted by the trend analyzer.
    pub fn trend_column_limit(mut self, limit: usize) -> Self {
        self.trend_column_limit = Some(limit);
        self
    }

    /// Set the |r| thresholds for `moderate` and `strong` trends.
    pub fn correlation_thresholds(mut self, moderate: f64, strong: f64) -> Self {
        self.moderate_correlation = Some(moderate);
        self.strong_correlation = Some(strong);
        self
    }

    /// Set the requested number of clusters.
    pub fn n_clusters(mut self, k: usize) -> Self {
        self.n_clusters = Some(k);
        self
    }

    /// Set the number of k-means initializations.
    pub fn kmeans_n_init(mut self, n_init: usize) -> Self {
        self.kmeans_n_init = Some(n_init);
        self
    }

    /// Set the maximum number of k-means iterations.
    pub fn kmeans_max_iter(mut self, max_iter: usize) -> Self {
        self.kmeans_max_iter = Some(max_iter);
        self
    }

    /// Set the k-means convergence tolerance.
    pub fn kmeans_tolerance(mut self, tolerance: f64) -> Self {
        self.kmeans_tolerance = Some(tolerance);
        self
    }

    /// Set the random seed for k-means initialization.
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Set the maximum number of columns in the box plot.
    pub fn boxplot_column_limit(mut self, limit: usize) -> Self {
        self.boxplot_column_limit = Some(limit);
        self
    }

    /// Set how many values the pie chart shows.
    pub fn pie_top_values(mut self, count: usize) -> Self {
        self.pie_top_values = Some(count);
        self
    }

    /// Set the chart selection mode.
    pub fn visualization_mode(mut self, mode: VisualizationMode) -> Self {
        self.visualization_mode = Some(mode);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            categorical_column_limit: self
                .categorical_column_limit
                .unwrap_or(defaults.categorical_column_limit),
            top_value_count: self.top_value_count.unwrap_or(defaults.top_value_count),
            outlier_column_limit: self.outlier_column_limit.or(defaults.outlier_column_limit),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(defaults.iqr_multiplier),
            zscore_threshold: self.zscore_threshold.unwrap_or(defaults.zscore_threshold),
            trend_column_limit: self.trend_column_limit.unwrap_or(defaults.trend_column_limit),
            strong_correlation: self.strong_correlation.unwrap_or(defaults.strong_correlation),
            moderate_correlation: self
                .moderate_correlation
                .unwrap_or(defaults.moderate_correlation),
            n_clusters: self.n_clusters.unwrap_or(defaults.n_clusters),
            kmeans_n_init: self.kmeans_n_init.unwrap_or(defaults.kmeans_n_init),
            kmeans_max_iter: self.kmeans_max_iter.unwrap_or(defaults.kmeans_max_iter),
            kmeans_tolerance: self.kmeans_tolerance.unwrap_or(defaults.kmeans_tolerance),
            random_seed: self.random_seed.unwrap_or(defaults.random_seed),
            boxplot_column_limit: self
                .boxplot_column_limit
                .unwrap_or(defaults.boxplot_column_limit),
            pie_top_values: self.pie_top_values.unwrap_or(defaults.pie_top_values),
            visualization_mode: self
                .visualization_mode
                .unwrap_or(defaults.visualization_mode),
        };

        config.validate()?;
        Ok(config)
    }
}
