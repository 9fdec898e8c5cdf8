//! Narrative insight generation.
//!
//! The analysis core never writes prose itself. It condenses a
//! [`StatisticsReport`] into an [`InsightRequest`] and hands it to an
//! [`InsightProvider`]. Any failure degrades to a canned summary.

mod provider;

pub use provider::InsightProvider;

use crate::statistics::{Shape, StatisticsReport};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Columns listed in an insight request.
const MAX_LISTED_COLUMNS: usize = 10;
/// Numeric columns whose mean and std are included.
const MAX_NUMERIC_HIGHLIGHTS: usize = 5;

/// Mean and spread of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericHighlight {
    pub mean: f64,
    pub std: f64,
}

/// Structured input for an insight provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub shape: Shape,
    pub columns: Vec<String>,
    pub total_rows: usize,
    pub duplicated_rows: usize,
    /// Missing cells across the whole dataset.
    pub total_missing: usize,
    pub numeric_highlights: BTreeMap<String, NumericHighlight>,
}

impl InsightRequest {
    /// Condense a statistics report into provider input.
    ///
    /// `columns` is the dataset's column order; only the first ten are kept.
    pub fn from_statistics(
        report: &StatisticsReport,
        columns: &[&str],
        file_name: Option<&str>,
    ) -> Self {
        let numeric_highlights = report
            .numeric_summary
            .iter()
            .take(MAX_NUMERIC_HIGHLIGHTS)
            .map(|(name, summary)| {
                (
                    name.clone(),
                    NumericHighlight {
                        mean: summary.mean,
                        std: summary.std,
                    },
                )
            })
            .collect();

        Self {
            file_name: file_name.map(String::from),
            shape: report.shape,
            columns: columns
                .iter()
                .take(MAX_LISTED_COLUMNS)
                .map(|c| c.to_string())
                .collect(),
            total_rows: report.basic_info.total_rows,
            duplicated_rows: report.basic_info.duplicated_rows,
            total_missing: report.missing_analysis.missing_counts.values().sum(),
            numeric_highlights,
        }
    }

    /// Request carrying only the dataset's shape and column names.
    pub fn shape_only(shape: Shape, columns: &[&str], file_name: Option<&str>) -> Self {
        Self {
            file_name: file_name.map(String::from),
            shape,
            columns: columns
                .iter()
                .take(MAX_LISTED_COLUMNS)
                .map(|c| c.to_string())
                .collect(),
            total_rows: shape.rows,
            duplicated_rows: 0,
            total_missing: 0,
            numeric_highlights: BTreeMap::new(),
        }
    }
}

/// Summary used when no provider is configured or the provider fails.
pub fn fallback_insight(request: &InsightRequest) -> String {
    format!(
        "Automated insight is unavailable. The dataset contains {} records across {} columns.",
        request.total_rows, request.shape.columns
    )
}

/// Ask the provider for a narrative summary, never failing.
pub fn generate_insight(
    provider: Option<&dyn InsightProvider>,
    request: &InsightRequest,
    goal: &str,
) -> String {
    let Some(provider) = provider else {
        return fallback_insight(request);
    };

    match provider.summarize(request, goal) {
        Ok(text) if !text.trim().is_empty() => {
            info!("Insight generated by {}", provider.name());
            text
        }
        Ok(_) => {
            warn!("{} returned an empty insight, using fallback", provider.name());
            fallback_insight(request)
        }
        Err(e) => {
            warn!("{} failed to generate insight: {:#}", provider.name(), e);
            fallback_insight(request)
        }
    }
}
