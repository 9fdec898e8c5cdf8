//! Execution records and the execution map.

use super::overview::FileOverview;
use crate::clustering::ClusterOutcome;
use crate::error::AnalysisError;
use crate::outliers::OutlierReport;
use crate::statistics::StatisticsReport;
use crate::trend::TrendOutcome;
use crate::visualization::VisualizationResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Analysis actions a pipeline step can perform.
///
/// Variant order is the order report sections appear in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ActionTag {
    ReadFile,
    AnalyzeBasicStats,
    CreateVisualizations,
    DetectOutliers,
    TrendAnalysis,
    ClusteringAnalysis,
}

impl ActionTag {
    /// Every action, in section order.
    pub const ALL: [ActionTag; 6] = [
        Self::ReadFile,
        Self::AnalyzeBasicStats,
        Self::CreateVisualizations,
        Self::DetectOutliers,
        Self::TrendAnalysis,
        Self::ClusteringAnalysis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadFile => "read_file",
            Self::AnalyzeBasicStats => "analyze_basic_stats",
            Self::CreateVisualizations => "create_visualizations",
            Self::DetectOutliers => "detect_outliers",
            Self::TrendAnalysis => "trend_analysis",
            Self::ClusteringAnalysis => "clustering_analysis",
        }
    }
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionTag {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s.trim())
            .ok_or_else(|| AnalysisError::UnknownAction(s.to_string()))
    }
}

/// Result payload of one analysis step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AnalysisPayload {
    FileOverview(FileOverview),
    Statistics(StatisticsReport),
    Visualizations(VisualizationResult),
    Outliers(BTreeMap<String, OutlierReport>),
    Trend(TrendOutcome),
    Clustering(ClusterOutcome),
}

impl AnalysisPayload {
    /// The action that produces this kind of payload.
    pub fn action(&self) -> ActionTag {
        match self {
            Self::FileOverview(_) => ActionTag::ReadFile,
            Self::Statistics(_) => ActionTag::AnalyzeBasicStats,
            Self::Visualizations(_) => ActionTag::CreateVisualizations,
            Self::Outliers(_) => ActionTag::DetectOutliers,
            Self::Trend(_) => ActionTag::TrendAnalysis,
            Self::Clustering(_) => ActionTag::ClusteringAnalysis,
        }
    }
}

/// Uniform envelope around one step's outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionRecord {
    /// Caller-chosen step identifier.
    pub step_id: String,
    pub action: ActionTag,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<AnalysisPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionRecord {
    /// A successful step; the action is taken from the payload.
    pub fn success(step_id: impl Into<String>, payload: AnalysisPayload) -> Self {
        Self {
            step_id: step_id.into(),
            action: payload.action(),
            succeeded: true,
            payload: Some(payload),
            error: None,
        }
    }

    /// A failed step.
    pub fn failed(step_id: impl Into<String>, action: ActionTag, error: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            action,
            succeeded: false,
            payload: None,
            error: Some(error.into()),
        }
    }
}

/// At most one record per action.
///
/// Inserting a record for an action that is already present replaces the
/// old record (last write wins).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionMap {
    records: BTreeMap<ActionTag, ExecutionRecord>,
}

impl ExecutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, returning the one it replaced.
    pub fn insert(&mut self, record: ExecutionRecord) -> Option<ExecutionRecord> {
        let replaced = self.records.insert(record.action, record);
        if let Some(old) = &replaced {
            debug!(
                "Replaced execution record '{}' for action {}",
                old.step_id, old.action
            );
        }
        replaced
    }

    pub fn get(&self, action: ActionTag) -> Option<&ExecutionRecord> {
        self.records.get(&action)
    }

    /// Records in section order.
    pub fn iter(&self) -> impl Iterator<Item = &ExecutionRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<ExecutionRecord> for ExecutionMap {
    fn from_iter<I: IntoIterator<Item = ExecutionRecord>>(iter: I) -> Self {
        let mut map = Self::new();
        for record in iter {
            map.insert(record);
        }
        map
    }
}

/// One entry of the pipeline's event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLogEntry {
    /// RFC 3339 timestamp.
    pub timestamp: String,
    pub action: String,
    pub details: BTreeMap<String, String>,
}

impl EventLogEntry {
    /// Entry stamped with the current time.
    pub fn now(action: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            action: action.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualization::VisualizationResult;

    #[test]
    fn test_action_tag_round_trip_names() {
        for action in ActionTag::ALL {
            assert_eq!(action.as_str().parse::<ActionTag>().unwrap(), action);
            assert_eq!(
                serde_json::to_string(&action).unwrap(),
                format!("\"{}\"", action.as_str())
            );
        }
        assert!(matches!(
            "make_coffee".parse::<ActionTag>(),
            Err(AnalysisError::UnknownAction(_))
        ));
    }

    #[test]
    fn test_last_write_wins() {
        let mut map = ExecutionMap::new();
        assert!(map
            .insert(ExecutionRecord::failed("step_1", ActionTag::DetectOutliers, "boom"))
            .is_none());

        let replaced = map
            .insert(ExecutionRecord::success(
                "step_2",
                AnalysisPayload::Outliers(BTreeMap::new()),
            ))
            .unwrap();

        assert_eq!(replaced.step_id, "step_1");
        assert_eq!(map.len(), 1);
        let kept = map.get(ActionTag::DetectOutliers).unwrap();
        assert_eq!(kept.step_id, "step_2");
        assert!(kept.succeeded);
    }

    #[test]
    fn test_success_takes_action_from_payload() {
        let record = ExecutionRecord::success(
            "charts",
            AnalysisPayload::Visualizations(VisualizationResult::default()),
        );
        assert_eq!(record.action, ActionTag::CreateVisualizations);
    }

    #[test]
    fn test_event_log_entry() {
        let entry = EventLogEntry::now("detect_outliers").with_detail("columns", "3");
        assert!(chrono::DateTime::parse_from_rfc3339(&entry.timestamp).is_ok());
        assert_eq!(entry.details["columns"], "3");
    }
}
