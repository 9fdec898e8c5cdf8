//! Report section model.

use super::execution::EventLogEntry;
use super::overview::{FileOverview, format_size};
use crate::clustering::ClusterReport;
use crate::outliers::OutlierReport;
use crate::statistics::StatisticsReport;
use crate::trend::TrendReport;
use crate::visualization::VisualizationResult;
use serde::Serialize;
use std::collections::BTreeMap;

/// Closed set of section kinds. Renderers skip kinds they do not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    DataOverview,
    Statistics,
    Visualizations,
    Outliers,
    Trends,
    Clustering,
    ExecutionLog,
}

impl SectionKind {
    /// Display title of the section.
    pub fn title(&self) -> &'static str {
        match self {
            Self::DataOverview => "Data Overview",
            Self::Statistics => "Statistical Analysis",
            Self::Visualizations => "Data Visualization",
            Self::Outliers => "Outlier Detection",
            Self::Trends => "Trend Analysis",
            Self::Clustering => "Clustering Analysis",
            Self::ExecutionLog => "Execution Log",
        }
    }
}

/// Overview content with the file size also rendered for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataOverviewContent {
    #[serde(flatten)]
    pub overview: FileOverview,
    /// e.g. `1.5 KB`
    pub file_size_display: String,
}

impl From<&FileOverview> for DataOverviewContent {
    fn from(overview: &FileOverview) -> Self {
        Self {
            file_size_display: format_size(overview.file_size),
            overview: overview.clone(),
        }
    }
}

/// Kind-specific section payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SectionContent {
    DataOverview(DataOverviewContent),
    Statistics(StatisticsReport),
    Visualizations(VisualizationResult),
    Outliers(BTreeMap<String, OutlierReport>),
    Trends(TrendReport),
    Clustering(ClusterReport),
    ExecutionLog(Vec<EventLogEntry>),
}

/// One titled unit of report content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub kind: SectionKind,
    pub content: SectionContent,
}

impl Section {
    pub fn new(kind: SectionKind, content: SectionContent) -> Self {
        Self {
            title: kind.title().to_string(),
            kind,
            content,
        }
    }
}
