//! Read-only typed view over a tabular dataset.
//!
//! A [`DatasetView`] wraps a polars `DataFrame` together with a schema
//! computed once by a classification pass. Every analysis component reads
//! column kinds and values through this view.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_analysis::DatasetView;
//! use polars::prelude::*;
//!
//! let df = df!["amount" => [1.0, 2.0], "category" => ["A", "B"]]?;
//! let view = DatasetView::new(df);
//! assert_eq!(view.numeric_columns(), vec!["amount"]);
//! ```

mod kind;
mod temporal;

pub use kind::ColumnKind;
pub use temporal::{format_date, parse_timestamp_millis};

pub(crate) use temporal::column_timestamps;

use crate::error::{AnalysisError, Result, ResultExt};
use polars::prelude::*;
use serde::Serialize;

/// Schema entry for a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    pub name: String,
    pub kind: ColumnKind,
    /// Underlying storage dtype, for display.
    pub dtype: String,
}

/// Immutable dataset with a precomputed column schema.
#[derive(Debug, Clone)]
pub struct DatasetView {
    df: DataFrame,
    schema: Vec<ColumnSchema>,
}

impl DatasetView {
    /// Build a view, classifying every column once.
    pub fn new(df: DataFrame) -> Self {
        let schema = df
            .get_columns()
            .iter()
            .map(|column| {
                let series = column.as_materialized_series();
                ColumnSchema {
                    name: column.name().to_string(),
                    kind: kind::classify_column(series),
                    dtype: column.dtype().to_string(),
                }
            })
            .collect();

        Self { df, schema }
    }

    /// The underlying frame.
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn schema(&self) -> &[ColumnSchema] {
        &self.schema
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.schema.iter().map(|c| c.name.as_str()).collect()
    }

    /// Kind of a column, if present.
    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.schema.iter().find(|c| c.name == name).map(|c| c.kind)
    }

    fn columns_of_kind(&self, kind: ColumnKind) -> Vec<&str> {
        self.schema
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Numeric columns in dataset order.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns_of_kind(ColumnKind::Numeric)
    }

    /// Categorical columns in dataset order.
    pub fn categorical_columns(&self) -> Vec<&str> {
        self.columns_of_kind(ColumnKind::Categorical)
    }

    /// Datetime candidate columns in dataset order.
    pub fn datetime_candidates(&self) -> Vec<&str> {
        self.columns_of_kind(ColumnKind::DatetimeCandidate)
    }

    /// Fail with `ColumnNotFound` unless the column exists.
    pub fn require_column(&self, name: &str) -> Result<ColumnKind> {
        self.kind_of(name)
            .ok_or_else(|| AnalysisError::ColumnNotFound(name.to_string()))
    }

    /// Fail unless the column exists and is numeric.
    pub fn require_numeric(&self, name: &str) -> Result<()> {
        match self.require_column(name)? {
            ColumnKind::Numeric => Ok(()),
            actual => Err(AnalysisError::InvalidColumnKind {
                column: name.to_string(),
                expected: ColumnKind::Numeric,
                actual,
            }),
        }
    }

    fn series(&self, name: &str) -> Result<&Series> {
        self.require_column(name)?;
        let column = self
            .df
            .column(name)
            .context(format!("Failed to read column '{}'", name))?;
        Ok(column.as_materialized_series())
    }

    /// Values of a numeric column as `f64`, missing entries as `None`.
    ///
    /// Non-finite values are treated as missing.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        self.require_numeric(name)?;
        let series = self.series(name)?;
        let casted = series
            .cast(&DataType::Float64)
            .context(format!("Failed to cast column '{}' to f64", name))?;
        let values = casted
            .f64()
            .context(format!("Column '{}' is not f64 after cast", name))?
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();
        Ok(values)
    }

    /// Values of any column rendered as text, missing entries as `None`.
    ///
    /// Fails for dtypes polars cannot cast to text, such as lists and structs.
    pub fn string_values(&self, name: &str) -> Result<Vec<Option<String>>> {
        let series = self.series(name)?;
        let casted = series
            .cast(&DataType::String)
            .context(format!("Failed to cast column '{}' to string", name))?;
        let values = casted
            .str()
            .context(format!("Column '{}' is not a string after cast", name))?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        Ok(values)
    }

    /// Epoch-millisecond timestamps of a column, or `None` when any present
    /// value cannot be converted.
    pub fn timestamp_values(&self, name: &str) -> Result<Option<Vec<Option<i64>>>> {
        let series = self.series(name)?;
        Ok(column_timestamps(series))
    }

    /// Per-row missing flags of a column.
    ///
    /// Nulls are missing in every column; numeric columns also count
    /// non-finite values, matching [`Self::numeric_values`]. Other columns are
    /// never cast, so nested or binary dtypes are supported.
    pub fn missing_mask(&self, name: &str) -> Result<Vec<bool>> {
        if self.require_column(name)? == ColumnKind::Numeric {
            return Ok(self
                .numeric_values(name)?
                .iter()
                .map(Option::is_none)
                .collect());
        }
        let series = self.series(name)?;
        Ok(series
            .is_null()
            .into_iter()
            .map(|v| v.unwrap_or(true))
            .collect())
    }

    /// Number of missing values in a column, by the rule of [`Self::missing_mask`].
    pub fn missing_count(&self, name: &str) -> Result<usize> {
        Ok(self.missing_mask(name)?.iter().filter(|m| **m).count())
    }
}

impl From<DataFrame> for DatasetView {
    fn from(df: DataFrame) -> Self {
        Self::new(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_view() -> DatasetView {
        let df = df![
            "date" => ["2024-01-01", "2024-01-02", "2024-01-03"],
            "amount" => [Some(10.0), None, Some(30.0)],
            "count" => [1i32, 2, 3],
            "category" => ["A", "B", "A"],
        ]
        .unwrap();
        DatasetView::new(df)
    }

    #[test]
    fn test_schema_classification() {
        let view = sample_view();
        assert_eq!(view.row_count(), 3);
        assert_eq!(view.column_count(), 4);
        assert_eq!(view.numeric_columns(), vec!["amount", "count"]);
        assert_eq!(view.categorical_columns(), vec!["category"]);
        assert_eq!(view.datetime_candidates(), vec!["date"]);
        assert_eq!(view.kind_of("missing"), None);
    }

    #[test]
    fn test_numeric_values_keep_missing() {
        let view = sample_view();
        assert_eq!(
            view.numeric_values("amount").unwrap(),
            vec![Some(10.0), None, Some(30.0)]
        );
        assert_eq!(
            view.numeric_values("count").unwrap(),
            vec![Some(1.0), Some(2.0), Some(3.0)]
        );
        assert_eq!(view.missing_count("amount").unwrap(), 1);
    }

    #[test]
    fn test_require_numeric_errors() {
        let view = sample_view();
        let err = view.numeric_values("category").unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidColumnKind { .. }));

        let err = view.require_numeric("nope").unwrap_err();
        assert!(matches!(err, AnalysisError::ColumnNotFound(name) if name == "nope"));
    }

    #[test]
    fn test_string_values() {
        let view = sample_view();
        assert_eq!(
            view.string_values("count").unwrap(),
            vec![Some("1".to_string()), Some("2".to_string()), Some("3".to_string())]
        );
    }

    #[test]
    fn test_timestamp_values() {
        let view = sample_view();
        let stamps = view.timestamp_values("date").unwrap().unwrap();
        assert_eq!(stamps.len(), 3);
        assert!(view.timestamp_values("category").unwrap().is_none());
    }
}
