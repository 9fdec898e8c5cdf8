use super::execution::{ActionTag, AnalysisPayload, EventLogEntry, ExecutionMap};
use super::section::{DataOverviewContent, Section, SectionContent, SectionKind};
use crate::clustering::ClusterOutcome;
use crate::trend::TrendOutcome;
use serde::Serialize;
use tracing::debug;

/// A titled report ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledReport {
    pub title: String,
    /// Narrative summary shown above the sections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
    /// Whether a data overview section is present.
    pub has_data: bool,
    pub sections: Vec<Section>,
}

/// Turns an execution map into an ordered list of report sections.
///
/// Sections always come out in the order data overview, statistics,
/// visualizations, outliers, trends, clustering, execution log, no matter
/// the order records were inserted. Failed records produce no section.
pub struct ReportAssembler;

impl ReportAssembler {
    /// Build the ordered section sequence.
    pub fn assemble(executions: &ExecutionMap, event_log: &[EventLogEntry]) -> Vec<Section> {
        let mut sections: Vec<Section> = ActionTag::ALL
            .into_iter()
            .filter_map(|action| Self::section_for(executions, action))
            .collect();

        if !event_log.is_empty() {
            sections.push(Section::new(
                SectionKind::ExecutionLog,
                SectionContent::ExecutionLog(event_log.to_vec()),
            ));
        }

        debug!("Assembled {} report sections", sections.len());
        sections
    }

    /// Build a complete report with title and narrative insight.
    pub fn build(
        title: impl Into<String>,
        executions: &ExecutionMap,
        insight: Option<&str>,
        event_log: &[EventLogEntry],
    ) -> AssembledReport {
        let sections = Self::assemble(executions, event_log);
        AssembledReport {
            title: title.into(),
            insight: insight.map(String::from),
            has_data: sections.iter().any(|s| s.kind == SectionKind::DataOverview),
            sections,
        }
    }

    fn section_for(executions: &ExecutionMap, action: ActionTag) -> Option<Section> {
        let record = executions.get(action)?;
        if !record.succeeded {
            debug!("Skipping failed step '{}' ({})", record.step_id, action);
            return None;
        }

        let (kind, content) = match (action, record.payload.as_ref()?) {
            (ActionTag::ReadFile, AnalysisPayload::FileOverview(overview)) => (
                SectionKind::DataOverview,
                SectionContent::DataOverview(DataOverviewContent::from(overview)),
            ),
            (ActionTag::AnalyzeBasicStats, AnalysisPayload::Statistics(report)) => (
                SectionKind::Statistics,
                SectionContent::Statistics(report.clone()),
            ),
            (ActionTag::CreateVisualizations, AnalysisPayload::Visualizations(result))
                if !result.charts.is_empty() =>
            {
                (
                    SectionKind::Visualizations,
                    SectionContent::Visualizations(result.clone()),
                )
            }
            (ActionTag::DetectOutliers, AnalysisPayload::Outliers(reports)) => (
                SectionKind::Outliers,
                SectionContent::Outliers(reports.clone()),
            ),
            (ActionTag::TrendAnalysis, AnalysisPayload::Trend(TrendOutcome::Trend(report))) => (
                SectionKind::Trends,
                SectionContent::Trends(report.clone()),
            ),
            (
                ActionTag::ClusteringAnalysis,
                AnalysisPayload::Clustering(ClusterOutcome::Clustered(report)),
            ) => (
                SectionKind::Clustering,
                SectionContent::Clustering(report.clone()),
            ),
            (action, payload) => {
                debug!(
                    "No section for {} with {} payload",
                    action,
                    payload.action()
                );
                return None;
            }
        };

        Some(Section::new(kind, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::ExecutionRecord;
    use crate::trend::NoTrendResult;
    use crate::visualization::{ChartKind, RenderedChart, VisualizationResult};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn kinds(sections: &[Section]) -> Vec<SectionKind> {
        sections.iter().map(|s| s.kind).collect()
    }

    fn charts(count: usize) -> AnalysisPayload {
        AnalysisPayload::Visualizations(VisualizationResult {
            charts: (0..count)
                .map(|i| RenderedChart {
                    name: format!("chart_{i}"),
                    kind: ChartKind::Histogram,
                    title: "Histogram".to_string(),
                    markup: "<svg/>".to_string(),
                })
                .collect(),
            failures: Vec::new(),
        })
    }

    #[test]
    fn test_empty_map_yields_no_sections() {
        assert!(ReportAssembler::assemble(&ExecutionMap::new(), &[]).is_empty());
    }

    #[test]
    fn test_empty_visualizations_are_skipped() {
        let map: ExecutionMap = [ExecutionRecord::success("v", charts(0))].into_iter().collect();
        assert!(ReportAssembler::assemble(&map, &[]).is_empty());

        let map: ExecutionMap = [ExecutionRecord::success("v", charts(2))].into_iter().collect();
        assert_eq!(
            kinds(&ReportAssembler::assemble(&map, &[])),
            vec![SectionKind::Visualizations]
        );
    }

    #[test]
    fn test_unavailable_trend_is_skipped() {
        let payload = AnalysisPayload::Trend(TrendOutcome::NoTrend(NoTrendResult {
            reason: "No usable time column found".to_string(),
        }));
        let map: ExecutionMap = [
            ExecutionRecord::success("trend", payload),
            ExecutionRecord::success("outliers", AnalysisPayload::Outliers(BTreeMap::new())),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            kinds(&ReportAssembler::assemble(&map, &[])),
            vec![SectionKind::Outliers]
        );
    }

    #[test]
    fn test_mismatched_payload_is_skipped() {
        let mut map = ExecutionMap::new();
        map.insert(ExecutionRecord {
            step_id: "odd".to_string(),
            action: ActionTag::AnalyzeBasicStats,
            succeeded: true,
            payload: Some(AnalysisPayload::Outliers(BTreeMap::new())),
            error: None,
        });
        assert!(ReportAssembler::assemble(&map, &[]).is_empty());
    }

    #[test]
    fn test_execution_log_is_last() {
        let map: ExecutionMap = [ExecutionRecord::success(
            "outliers",
            AnalysisPayload::Outliers(BTreeMap::new()),
        )]
        .into_iter()
        .collect();
        let log = vec![EventLogEntry {
            timestamp: "2024-01-01T00:00:00+00:00".to_string(),
            action: "detect_outliers".to_string(),
            details: BTreeMap::new(),
        }];

        let sections = ReportAssembler::assemble(&map, &log);
        assert_eq!(
            kinds(&sections),
            vec![SectionKind::Outliers, SectionKind::ExecutionLog]
        );
        assert_eq!(sections[1].title, "Execution Log");
    }

    #[test]
    fn test_build_report() {
        let report = ReportAssembler::build(
            "Sales analysis",
            &ExecutionMap::new(),
            Some("Nothing to report."),
            &[],
        );
        assert_eq!(report.title, "Sales analysis");
        assert_eq!(report.insight.as_deref(), Some("Nothing to report."));
        assert!(!report.has_data);
        assert!(report.sections.is_empty());
    }

    #[test]
    fn test_section_serialization_uses_snake_case_kind() {
        let map: ExecutionMap = [ExecutionRecord::success("v", charts(1))].into_iter().collect();
        let sections = ReportAssembler::assemble(&map, &[]);
        let json = serde_json::to_value(&sections).unwrap();

        assert_eq!(json[0]["kind"], "visualizations");
        assert_eq!(json[0]["title"], "Data Visualization");
        assert_eq!(json[0]["content"]["charts"][0]["name"], "chart_0");
    }
}
