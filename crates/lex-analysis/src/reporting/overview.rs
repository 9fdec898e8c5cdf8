//! File overview payload for the `read_file` step.

use crate::dataset::{ColumnKind, DatasetView};
use crate::error::Result;
use crate::statistics::Shape;
use serde::Serialize;

/// Column counts by kind plus missing cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSummary {
    pub numeric_columns: usize,
    pub categorical_columns: usize,
    pub datetime_columns: usize,
    pub missing_cells: usize,
}

/// Metadata of the file a dataset was read from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileOverview {
    pub file_name: String,
    /// Lowercase extension, e.g. `csv`.
    pub file_type: String,
    /// Size in bytes.
    pub file_size: u64,
    pub shape: Shape,
    pub columns: Vec<String>,
    pub data_summary: DataSummary,
}

impl FileOverview {
    /// Describe a dataset read from `file_name`.
    ///
    /// `missing_cells` uses the same missing-value rule as the statistics
    /// engine's missingness report.
    pub fn from_dataset(
        dataset: &DatasetView,
        file_name: impl Into<String>,
        file_size: u64,
    ) -> Result<Self> {
        let file_name = file_name.into();
        let file_type = std::path::Path::new(&file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let count = |kind: ColumnKind| dataset.schema().iter().filter(|c| c.kind == kind).count();
        let mut missing_cells = 0;
        for name in dataset.column_names() {
            missing_cells += dataset.missing_count(name)?;
        }

        Ok(Self {
            file_name,
            file_type,
            file_size,
            shape: Shape {
                rows: dataset.row_count(),
                columns: dataset.column_count(),
            },
            columns: dataset.column_names().into_iter().map(String::from).collect(),
            data_summary: DataSummary {
                numeric_columns: count(ColumnKind::Numeric),
                categorical_columns: count(ColumnKind::Categorical),
                datetime_columns: count(ColumnKind::DatetimeCandidate),
                missing_cells,
            },
        })
    }
}

/// Render a byte count with one decimal in the largest fitting unit.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0.0 B");
        assert_eq!(format_size(512), "512.0 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(3 * 1024u64.pow(4)), "3.0 TB");
        assert_eq!(format_size(2048 * 1024u64.pow(4)), "2048.0 TB");
    }

    #[test]
    fn test_from_dataset() {
        let view = DatasetView::new(
            df![
                "date" => ["2024-01-01", "2024-01-02"],
                "amount" => [Some(1.0), None],
                "ratio" => [f64::NAN, 0.5],
                "category" => ["a", "b"],
            ]
            .unwrap(),
        );
        let overview = FileOverview::from_dataset(&view, "data/Sales.CSV", 2048).unwrap();

        assert_eq!(overview.file_type, "csv");
        assert_eq!(overview.shape, Shape { rows: 2, columns: 4 });
        assert_eq!(overview.columns, vec!["date", "amount", "ratio", "category"]);
        assert_eq!(
            overview.data_summary,
            DataSummary {
                numeric_columns: 2,
                categorical_columns: 1,
                datetime_columns: 1,
                missing_cells: 2,
            }
        );
    }
}
