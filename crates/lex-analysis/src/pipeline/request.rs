//! Pipeline input and output types.

use crate::reporting::{ActionTag, AssembledReport, EventLogEntry, ExecutionMap};
use serde::{Deserialize, Serialize};

/// Goal passed to the insight provider when the caller gives none.
pub const DEFAULT_GOAL: &str = "general data analysis";

/// Name and size of the file a dataset was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,
    /// Size in bytes.
    pub size: u64,
}

/// What a pipeline run should do.
///
/// An empty `actions` list means "suggest from the dataset": `read_file` when
/// a source is known, followed by the suggested analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub title: String,
    pub goal: String,
    pub actions: Vec<ActionTag>,
    pub source: Option<SourceFile>,
    pub time_column: Option<String>,
    pub trend_columns: Option<Vec<String>>,
    pub outlier_columns: Option<Vec<String>>,
    pub cluster_features: Option<Vec<String>>,
    /// Overrides the configured cluster count.
    pub n_clusters: Option<usize>,
}

impl AnalysisRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            goal: DEFAULT_GOAL.to_string(),
            actions: Vec::new(),
            source: None,
            time_column: None,
            trend_columns: None,
            outlier_columns: None,
            cluster_features: None,
            n_clusters: None,
        }
    }

    pub fn goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = goal.into();
        self
    }

    /// Run exactly these actions, in this order.
    pub fn actions(mut self, actions: impl IntoIterator<Item = ActionTag>) -> Self {
        self.actions = actions.into_iter().collect();
        self
    }

    pub fn source(mut self, name: impl Into<String>, size: u64) -> Self {
        self.source = Some(SourceFile {
            name: name.into(),
            size,
        });
        self
    }

    pub fn time_column(mut self, name: impl Into<String>) -> Self {
        self.time_column = Some(name.into());
        self
    }

    pub fn trend_columns(mut self, columns: Vec<String>) -> Self {
        self.trend_columns = Some(columns);
        self
    }

    pub fn outlier_columns(mut self, columns: Vec<String>) -> Self {
        self.outlier_columns = Some(columns);
        self
    }

    pub fn cluster_features(mut self, features: Vec<String>) -> Self {
        self.cluster_features = Some(features);
        self
    }

    pub fn n_clusters(mut self, k: usize) -> Self {
        self.n_clusters = Some(k);
        self
    }
}

/// Everything a pipeline run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    pub executions: ExecutionMap,
    pub event_log: Vec<EventLogEntry>,
    pub insight: String,
    pub report: AssembledReport,
}
