//! Column kind classification.
//!
//! Every column is classified exactly once when a [`DatasetView`](super::DatasetView)
//! is built. Downstream components read the resulting kind instead of
//! inspecting dtypes themselves.

use super::temporal::looks_like_timestamp;
use crate::utils::{is_datetime_dtype, is_numeric_dtype, is_string_dtype};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of non-missing samples inspected when deciding whether a text
/// column holds timestamps.
const DATETIME_SAMPLE_SIZE: usize = 10;

/// The analytical kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Values are real numbers.
    Numeric,
    /// Values are discrete labels.
    Categorical,
    /// Values are dates or timestamps, natively or as parseable text.
    DatetimeCandidate,
}

impl ColumnKind {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::DatetimeCandidate => "datetime_candidate",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a single column.
///
/// Native numeric dtypes are numeric and native temporal dtypes are datetime
/// candidates. Text columns become datetime candidates only when every
/// sampled value parses as a timestamp. Everything else is categorical.
pub(crate) fn classify_column(series: &Series) -> ColumnKind {
    let dtype = series.dtype();
    if is_numeric_dtype(dtype) {
        return ColumnKind::Numeric;
    }
    if is_datetime_dtype(dtype) {
        return ColumnKind::DatetimeCandidate;
    }
    if is_string_dtype(dtype) && text_is_temporal(series) {
        return ColumnKind::DatetimeCandidate;
    }
    ColumnKind::Categorical
}

fn text_is_temporal(series: &Series) -> bool {
    let Ok(text) = series.str() else {
        return false;
    };

    let samples: Vec<&str> = text
        .into_iter()
        .flatten()
        .take(DATETIME_SAMPLE_SIZE)
        .collect();

    !samples.is_empty() && samples.iter().all(|s| looks_like_timestamp(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(df: &DataFrame, name: &str) -> ColumnKind {
        classify_column(df.column(name).unwrap().as_materialized_series())
    }

    #[test]
    fn test_numeric_columns() {
        let df = df![
            "ints" => [1i64, 2, 3],
            "floats" => [Some(1.5), None, Some(2.5)],
        ]
        .unwrap();

        assert_eq!(classify(&df, "ints"), ColumnKind::Numeric);
        assert_eq!(classify(&df, "floats"), ColumnKind::Numeric);
    }

    #[test]
    fn test_text_dates_are_datetime_candidates() {
        let df = df![
            "order_date" => ["2024-01-01", "2024-01-02", "2024-01-03"],
            "created" => [Some("2024-01-01 08:30:00"), None, Some("2024-01-02 09:00:00")],
        ]
        .unwrap();

        assert_eq!(classify(&df, "order_date"), ColumnKind::DatetimeCandidate);
        assert_eq!(classify(&df, "created"), ColumnKind::DatetimeCandidate);
    }

    #[test]
    fn test_mixed_text_is_categorical() {
        let df = df![
            "category" => ["A", "B", "A"],
            "mixed" => ["2024-01-01", "soon", "2024-01-03"],
            "flag" => [true, false, true],
        ]
        .unwrap();

        assert_eq!(classify(&df, "category"), ColumnKind::Categorical);
        assert_eq!(classify(&df, "mixed"), ColumnKind::Categorical);
        assert_eq!(classify(&df, "flag"), ColumnKind::Categorical);
    }

    #[test]
    fn test_all_missing_text_is_categorical() {
        let df = df!["empty" => [None::<&str>, None, None]].unwrap();
        assert_eq!(classify(&df, "empty"), ColumnKind::Categorical);
    }

    #[test]
    fn test_display() {
        assert_eq!(ColumnKind::Numeric.to_string(), "numeric");
        assert_eq!(ColumnKind::DatetimeCandidate.to_string(), "datetime_candidate");
    }
}
