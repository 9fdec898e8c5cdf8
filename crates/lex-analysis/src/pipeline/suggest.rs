//! Default action plan for a dataset.

use crate::dataset::DatasetView;
use crate::reporting::ActionTag;
use crate::trend::TrendAnalyzer;
use tracing::debug;

/// Pick the analyses that make sense for a dataset's column kinds.
///
/// Basic statistics are always suggested. The returned order follows
/// [`ActionTag::ALL`].
pub fn suggest_analyses(dataset: &DatasetView) -> Vec<ActionTag> {
    let numeric = dataset.numeric_columns().len();
    let categorical = dataset.categorical_columns().len();

    let mut actions = vec![ActionTag::AnalyzeBasicStats];
    if numeric > 0 || categorical > 0 {
        actions.push(ActionTag::CreateVisualizations);
    }
    if numeric > 0 {
        actions.push(ActionTag::DetectOutliers);
    }
    if matches!(TrendAnalyzer::find_time_column(dataset), Ok(Some(_))) {
        actions.push(ActionTag::TrendAnalysis);
    }
    if numeric >= 2 {
        actions.push(ActionTag::ClusteringAnalysis);
    }

    debug!("Suggested analyses: {:?}", actions);
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_suggestion() {
        let view = DatasetView::new(
            df![
                "date" => ["2024-01-01", "2024-01-02", "2024-01-03"],
                "sales" => [1.0, 2.0, 3.0],
                "cost" => [3.0, 2.0, 1.0],
            ]
            .unwrap(),
        );

        assert_eq!(
            suggest_analyses(&view),
            vec![
                ActionTag::AnalyzeBasicStats,
                ActionTag::CreateVisualizations,
                ActionTag::DetectOutliers,
                ActionTag::TrendAnalysis,
                ActionTag::ClusteringAnalysis,
            ]
        );
    }

    #[test]
    fn test_categorical_only() {
        let view = DatasetView::new(df!["region" => ["north", "south"]].unwrap());
        assert_eq!(
            suggest_analyses(&view),
            vec![ActionTag::AnalyzeBasicStats, ActionTag::CreateVisualizations]
        );
    }

    #[test]
    fn test_single_numeric_without_time() {
        let view = DatasetView::new(df!["amount" => [1.0, 2.0]].unwrap());
        assert_eq!(
            suggest_analyses(&view),
            vec![
                ActionTag::AnalyzeBasicStats,
                ActionTag::CreateVisualizations,
                ActionTag::DetectOutliers,
            ]
        );
    }
}
