//! Time column discovery.

use crate::dataset::{ColumnKind, DatasetView};
use crate::error::{AnalysisError, Result};
use tracing::debug;

/// Name fragments that mark a column as time-like (matched case-insensitively).
pub const TIME_KEYWORDS: [&str; 4] = ["date", "time", "时间", "日期"];

/// A time column converted to epoch milliseconds.
#[derive(Debug, Clone)]
pub(crate) struct TimeColumn {
    pub name: String,
    pub timestamps: Vec<Option<i64>>,
}

/// Whether a column name contains a time-like keyword.
pub fn is_time_like_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    TIME_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Find the first time-like column whose values fully convert to timestamps.
pub(crate) fn detect_time_column(dataset: &DatasetView) -> Result<Option<TimeColumn>> {
    for name in dataset.column_names() {
        if !is_time_like_name(name) {
            continue;
        }

        match dataset.timestamp_values(name)? {
            Some(timestamps) if timestamps.iter().any(Option::is_some) => {
                debug!("Using '{}' as time column", name);
                return Ok(Some(TimeColumn {
                    name: name.to_string(),
                    timestamps,
                }));
            }
            _ => debug!("Column '{}' looks time-like but does not convert", name),
        }
    }
    Ok(None)
}

/// Convert a caller-named time column.
pub(crate) fn resolve_time_column(dataset: &DatasetView, name: &str) -> Result<TimeColumn> {
    let actual = dataset.require_column(name)?;
    match dataset.timestamp_values(name)? {
        Some(timestamps) => Ok(TimeColumn {
            name: name.to_string(),
            timestamps,
        }),
        None => Err(AnalysisError::InvalidColumnKind {
            column: name.to_string(),
            expected: ColumnKind::DatetimeCandidate,
            actual,
        }),
    }
}
