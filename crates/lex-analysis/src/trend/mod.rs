//! Linear trend detection over a time column.
//!
//! The analyzer picks a time column (given or detected by name), orders a
//! private copy of the rows by timestamp and fits a least-squares line to each
//! numeric column against the row index.
//!
//! # Degradation
//!
//! - No usable time column: [`TrendOutcome::NoTrend`]
//! - A column that cannot be fitted: [`TrendEntry::Failed`] for that column only
//! - All-missing value columns: omitted

mod regression;
mod time_column;

pub use regression::{LinearFit, MIN_OBSERVATIONS, RegressionError, fit_against_index};
pub use time_column::{TIME_KEYWORDS, is_time_like_name};

use crate::config::AnalysisConfig;
use crate::dataset::{DatasetView, format_date};
use crate::error::Result;
use crate::utils::mean;
use serde::Serialize;
use std::collections::BTreeMap;
use time_column::{TimeColumn, detect_time_column, resolve_time_column};
use tracing::{debug, info, warn};

const MILLIS_PER_DAY: i64 = 86_400_000;

// =============================================================================
// Result Types
// =============================================================================

/// Sign of the fitted slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Bucketed magnitude of the correlation coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStrength {
    Weak,
    Moderate,
    Strong,
}

/// Per-column trend result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TrendEntry {
    Fitted {
        slope: f64,
        correlation: f64,
        p_value: f64,
        trend_direction: TrendDirection,
        strength: TrendStrength,
    },
    Failed {
        error: String,
    },
}

/// Span of the time column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    /// `YYYY-MM-DD`
    pub start: String,
    /// `YYYY-MM-DD`
    pub end: String,
    /// Whole days between start and end.
    pub duration_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub time_column: String,
    pub time_range: TimeRange,
    pub trends: BTreeMap<String, TrendEntry>,
}

/// Returned when the dataset has no usable time column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoTrendResult {
    pub reason: String,
}

/// Outcome of [`TrendAnalyzer::analyze_trend`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrendOutcome {
    Trend(TrendReport),
    NoTrend(NoTrendResult),
}

impl TrendOutcome {
    pub fn report(&self) -> Option<&TrendReport> {
        match self {
            Self::Trend(report) => Some(report),
            Self::NoTrend(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Trend(_))
    }
}

// =============================================================================
// Analyzer
// =============================================================================

/// Fits linear trends per numeric column.
#[derive(Debug, Clone)]
pub struct TrendAnalyzer {
    column_limit: usize,
    strong_correlation: f64,
    moderate_correlation: f64,
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl TrendAnalyzer {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            column_limit: config.trend_column_limit,
            strong_correlation: config.strong_correlation,
            moderate_correlation: config.moderate_correlation,
        }
    }

    /// Name of the column trend analysis would use when none is given.
    pub fn find_time_column(dataset: &DatasetView) -> Result<Option<String>> {
        Ok(detect_time_column(dataset)?.map(|column| column.name))
    }

    /// Analyze trends.
    ///
    /// # Arguments
    ///
    /// * `time_column` - Column to use as time axis; detected by name when `None`
    /// * `value_columns` - Numeric columns to fit; all numeric columns when `None`
    ///
    /// Caller-named columns that are absent or of the wrong kind are errors.
    pub fn analyze_trend(
        &self,
        dataset: &DatasetView,
        time_column: Option<&str>,
        value_columns: Option<&[String]>,
    ) -> Result<TrendOutcome> {
        let time = match time_column {
            Some(name) => resolve_time_column(dataset, name)?,
            None => match detect_time_column(dataset)? {
                Some(column) => column,
                None => {
                    info!("No usable time column found, skipping trend analysis");
                    return Ok(no_trend("No usable time column found"));
                }
            },
        };

        let candidates: Vec<String> = match value_columns {
            Some(names) => {
                for name in names {
                    dataset.require_numeric(name)?;
                }
                names.to_vec()
            }
            None => dataset
                .numeric_columns()
                .into_iter()
                .map(String::from)
                .collect(),
        };
        let targets: Vec<String> = candidates
            .into_iter()
            .filter(|name| *name != time.name)
            .take(self.column_limit)
            .collect();

        let order = sorted_row_order(&time);
        let (Some(first), Some(last)) = (order.first(), order.last()) else {
            return Ok(no_trend(&format!(
                "Time column '{}' has no values",
                time.name
            )));
        };
        let start = first.1;
        let end = last.1;

        let mut trends = BTreeMap::new();
        for name in targets {
            let raw = dataset.numeric_values(&name)?;
            let ordered: Vec<Option<f64>> = order.iter().map(|(row, _)| raw[*row]).collect();
            let present: Vec<f64> = ordered.iter().flatten().copied().collect();

            let Some(fill) = mean(&present) else {
                debug!("Skipping all-missing column '{}' for trend analysis", name);
                continue;
            };
            let filled: Vec<f64> = ordered.iter().map(|v| v.unwrap_or(fill)).collect();

            let entry = match fit_against_index(&filled) {
                Ok(fit) => self.classify(fit),
                Err(e) => {
                    warn!("Trend fit failed for column '{}': {}", name, e);
                    TrendEntry::Failed {
                        error: e.to_string(),
                    }
                }
            };
            trends.insert(name, entry);
        }

        Ok(TrendOutcome::Trend(TrendReport {
            time_column: time.name,
            time_range: TimeRange {
                start: format_date(start),
                end: format_date(end),
                duration_days: (end - start) / MILLIS_PER_DAY,
            },
            trends,
        }))
    }

    fn classify(&self, fit: LinearFit) -> TrendEntry {
        let trend_direction = if fit.slope > 0.0 {
            TrendDirection::Increasing
        } else if fit.slope < 0.0 {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        };

        let magnitude = fit.r.abs();
        let strength = if magnitude > self.strong_correlation {
            TrendStrength::Strong
        } else if magnitude > self.moderate_correlation {
            TrendStrength::Moderate
        } else {
            TrendStrength::Weak
        };

        TrendEntry::Fitted {
            slope: fit.slope,
            correlation: fit.r,
            p_value: fit.p_value,
            trend_direction,
            strength,
        }
    }
}

fn no_trend(reason: &str) -> TrendOutcome {
    TrendOutcome::NoTrend(NoTrendResult {
        reason: reason.to_string(),
    })
}

/// Row indices with a timestamp, stably sorted by timestamp.
fn sorted_row_order(time: &TimeColumn) -> Vec<(usize, i64)> {
    let mut order: Vec<(usize, i64)> = time
        .timestamps
        .iter()
        .enumerate()
        .filter_map(|(row, ts)| ts.map(|ts| (row, ts)))
        .collect();
    order.sort_by_key(|(_, ts)| *ts);
    order
}
