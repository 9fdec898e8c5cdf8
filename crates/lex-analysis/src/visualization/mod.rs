//! Chart selection.
//!
//! [`VisualizationSelector`] decides which charts a dataset warrants, based
//! only on its column kinds and counts. It never draws anything; drawing is
//! delegated to a [`ChartRenderer`].

mod render;

pub use render::{ChartFailure, ChartRenderer, RenderedChart, VisualizationResult, render_charts};

use crate::config::AnalysisConfig;
use crate::dataset::DatasetView;
use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Kind of chart to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Histogram,
    BoxPlot,
    CorrelationHeatmap,
    PieChart,
    ScatterPlot,
}

/// Declarative description of one chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Stable identifier, unique within one selection.
    pub name: String,
    pub kind: ChartKind,
    pub columns: Vec<String>,
    pub title: String,
    /// For frequency charts, how many of the most frequent values to show.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
}

/// Which family of charts to select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualizationMode {
    /// Histogram, box plot and pie chart.
    Overview,
    /// Correlation heatmap.
    Correlation,
    /// Scatter plot.
    Distribution,
    /// Every rule.
    #[default]
    All,
}

impl VisualizationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Correlation => "correlation",
            Self::Distribution => "distribution",
            Self::All => "all",
        }
    }

    fn includes_overview(self) -> bool {
        matches!(self, Self::Overview | Self::All)
    }

    fn includes_correlation(self) -> bool {
        matches!(self, Self::Correlation | Self::All)
    }

    fn includes_distribution(self) -> bool {
        matches!(self, Self::Distribution | Self::All)
    }
}

impl fmt::Display for VisualizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisualizationMode {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overview" => Ok(Self::Overview),
            "correlation" => Ok(Self::Correlation),
            "distribution" => Ok(Self::Distribution),
            "all" => Ok(Self::All),
            _ => Err(AnalysisError::UnknownVisualizationMode(s.to_string())),
        }
    }
}

/// Chooses chart specs from the column kinds of a dataset.
#[derive(Debug, Clone)]
pub struct VisualizationSelector {
    boxplot_column_limit: usize,
    pie_top_values: usize,
}

impl Default for VisualizationSelector {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl VisualizationSelector {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            boxplot_column_limit: config.boxplot_column_limit,
            pie_top_values: config.pie_top_values,
        }
    }

    /// Select charts for `mode`.
    ///
    /// Specs come out in a fixed order: histogram, box plot, pie chart,
    /// correlation heatmap, scatter plot.
    pub fn select_charts(&self, dataset: &DatasetView, mode: VisualizationMode) -> Vec<ChartSpec> {
        let numeric = dataset.numeric_columns();
        let categorical = dataset.categorical_columns();
        let mut specs = Vec::new();

        if mode.includes_overview() {
            if let Some(first) = numeric.first() {
                specs.push(ChartSpec {
                    name: "histogram".to_string(),
                    kind: ChartKind::Histogram,
                    columns: vec![first.to_string()],
                    title: format!("Distribution of {}", first),
                    top_n: None,
                });
            }
            if numeric.len() >= 2 {
                specs.push(ChartSpec {
                    name: "boxplot".to_string(),
                    kind: ChartKind::BoxPlot,
                    columns: numeric
                        .iter()
                        .take(self.boxplot_column_limit)
                        .map(|c| c.to_string())
                        .collect(),
                    title: "Box plot of numeric columns".to_string(),
                    top_n: None,
                });
            }
            if let Some(first) = categorical.first() {
                specs.push(ChartSpec {
                    name: "category_pie".to_string(),
                    kind: ChartKind::PieChart,
                    columns: vec![first.to_string()],
                    title: format!("Top {} values of {}", self.pie_top_values, first),
                    top_n: Some(self.pie_top_values),
                });
            }
        }

        if mode.includes_correlation() && numeric.len() >= 2 {
            specs.push(ChartSpec {
                name: "correlation_heatmap".to_string(),
                kind: ChartKind::CorrelationHeatmap,
                columns: numeric.iter().map(|c| c.to_string()).collect(),
                title: "Correlation matrix".to_string(),
                top_n: None,
            });
        }

        if mode.includes_distribution() && numeric.len() >= 2 {
            specs.push(ChartSpec {
                name: "scatter".to_string(),
                kind: ChartKind::ScatterPlot,
                columns: vec![numeric[0].to_string(), numeric[1].to_string()],
                title: format!("{} vs {}", numeric[0], numeric[1]),
                top_n: None,
            });
        }

        debug!("Selected {} chart specs in {} mode", specs.len(), mode);
        specs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn kinds(specs: &[ChartSpec]) -> Vec<ChartKind> {
        specs.iter().map(|s| s.kind).collect()
    }

    fn wide() -> DatasetView {
        DatasetView::new(
            df![
                "a" => [1.0, 2.0], "b" => [1.0, 2.0], "c" => [1.0, 2.0],
                "d" => [1.0, 2.0], "e" => [1.0, 2.0],
                "category" => ["x", "y"],
            ]
            .unwrap(),
        )
    }

    #[test]
    fn test_all_mode_order() {
        let specs = VisualizationSelector::default().select_charts(&wide(), VisualizationMode::All);
        assert_eq!(
            kinds(&specs),
            vec![
                ChartKind::Histogram,
                ChartKind::BoxPlot,
                ChartKind::PieChart,
                ChartKind::CorrelationHeatmap,
                ChartKind::ScatterPlot,
            ]
        );
        assert_eq!(specs[1].columns, vec!["a", "b", "c", "d"]);
        assert_eq!(specs[2].top_n, Some(8));
        assert_eq!(specs[3].columns.len(), 5);
        assert_eq!(specs[4].columns, vec!["a", "b"]);
    }

    #[test]
    fn test_single_numeric_overview() {
        let view = DatasetView::new(df!["amount" => [1.0, 2.0, 3.0]].unwrap());
        let selector = VisualizationSelector::default();

        let specs = selector.select_charts(&view, VisualizationMode::Overview);
        assert_eq!(kinds(&specs), vec![ChartKind::Histogram]);
        assert!(selector
            .select_charts(&view, VisualizationMode::Correlation)
            .is_empty());
        assert!(selector
            .select_charts(&view, VisualizationMode::Distribution)
            .is_empty());
    }

    #[test]
    fn test_categorical_only() {
        let view = DatasetView::new(df!["category" => ["x", "y"]].unwrap());
        let specs = VisualizationSelector::default().select_charts(&view, VisualizationMode::All);
        assert_eq!(kinds(&specs), vec![ChartKind::PieChart]);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Overview".parse::<VisualizationMode>().unwrap(), VisualizationMode::Overview);
        assert_eq!("all".parse::<VisualizationMode>().unwrap(), VisualizationMode::All);
        let err = "everything".parse::<VisualizationMode>().unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_VISUALIZATION_MODE");
    }

    #[test]
    fn test_custom_limits() {
        let config = AnalysisConfig::builder()
            .boxplot_column_limit(2)
            .pie_top_values(3)
            .build()
            .unwrap();
        let specs = VisualizationSelector::from_config(&config)
            .select_charts(&wide(), VisualizationMode::Overview);
        assert_eq!(specs[1].columns, vec!["a", "b"]);
        assert_eq!(specs[2].top_n, Some(3));
    }
}
