//! Main analysis pipeline module.
//!
//! This module provides the core `AnalysisPipeline` struct and builder for
//! running analyses over a dataset and assembling the report.

use crate::clustering::ClusteringEngine;
use crate::config::{AnalysisConfig, ConfigValidationError};
use crate::dataset::DatasetView;
use crate::error::{AnalysisError, Result};
use crate::insight::{InsightProvider, InsightRequest, generate_insight};
use crate::outliers::OutlierDetector;
use crate::pipeline::progress::{
    AnalysisStage, CancellationToken, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::pipeline::request::{AnalysisOutcome, AnalysisRequest};
use crate::pipeline::suggest::suggest_analyses;
use crate::reporting::{
    ActionTag, AnalysisPayload, EventLogEntry, ExecutionMap, ExecutionRecord, FileOverview,
    ReportAssembler,
};
use crate::statistics::{Shape, StatisticsEngine};
use crate::trend::TrendAnalyzer;
use crate::visualization::{
    ChartFailure, ChartRenderer, VisualizationResult, VisualizationSelector, render_charts,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// The main analysis pipeline.
///
/// Use [`AnalysisPipeline::builder()`] to create a new pipeline with custom
/// configuration.
///
/// # Example
///
/// ```rust,ignore
/// use lex_analysis::{AnalysisPipeline, AnalysisRequest, DatasetView};
///
/// let outcome = AnalysisPipeline::builder()
///     .insight_provider(provider)
///     .chart_renderer(Arc::new(|spec: &ChartSpec| Ok(draw(spec))))
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run(
///         &DatasetView::new(df),
///         AnalysisRequest::new("Quarterly sales").source("sales.csv", 20_480),
///     )?;
///
/// for section in &outcome.report.sections {
///     println!("{}", section.title);
/// }
/// ```
pub struct AnalysisPipeline {
    config: AnalysisConfig,
    insight_provider: Option<Arc<dyn InsightProvider>>,
    chart_renderer: Option<Arc<dyn ChartRenderer>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cancellation_token: CancellationToken,
    statistics: StatisticsEngine,
    outliers: OutlierDetector,
    trends: TrendAnalyzer,
    clustering: ClusteringEngine,
    charts: VisualizationSelector,
}

// The pipeline is handed to worker threads by callers
static_assertions::assert_impl_all!(AnalysisPipeline: Send);

impl AnalysisPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> AnalysisPipelineBuilder {
        AnalysisPipelineBuilder::default()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the requested analyses and assemble the report.
    ///
    /// A step that fails is recorded as a failed [`ExecutionRecord`] and the
    /// run continues; its section is simply absent from the report.
    ///
    /// # Errors
    ///
    /// Returns `Err(AnalysisError::Cancelled)` if the cancellation token was
    /// set before the run finished.
    pub fn run(&self, dataset: &DatasetView, request: AnalysisRequest) -> Result<AnalysisOutcome> {
        match self.run_internal(dataset, &request) {
            Ok(outcome) => {
                self.report_progress(ProgressUpdate::complete("Analysis completed successfully"));
                Ok(outcome)
            }
            Err(e) => {
                if e.is_cancelled() {
                    self.report_progress(ProgressUpdate::cancelled());
                } else {
                    self.report_progress(ProgressUpdate::failed(e.to_string()));
                }
                error!("Analysis error: {}", e);
                Err(e)
            }
        }
    }

    /// Check if cancellation has been requested.
    fn check_cancelled(&self) -> Result<()> {
        if self.cancellation_token.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }
        Ok(())
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn run_internal(
        &self,
        dataset: &DatasetView,
        request: &AnalysisRequest,
    ) -> Result<AnalysisOutcome> {
        let start_time = Instant::now();

        info!(
            "Starting analysis '{}' on {} rows x {} columns",
            request.title,
            dataset.row_count(),
            dataset.column_count()
        );
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Initializing,
            0.0,
            "Planning analysis steps...",
        ));

        let actions = self.plan(dataset, request);
        let total = actions.len();
        let mut executions = ExecutionMap::new();
        let mut event_log = Vec::with_capacity(total);

        for (index, action) in actions.into_iter().enumerate() {
            self.check_cancelled()?;

            let step_id = format!("step_{}", index + 1);
            let stage = AnalysisStage::for_action(action);
            let sub_stage = format!("Step {}/{}", index + 1, total);
            self.report_progress(ProgressUpdate::with_sub_stage(
                stage,
                sub_stage.clone(),
                0.0,
                format!("{}...", stage.display_name()),
            ));

            let step_start = Instant::now();
            let record = match self.execute(dataset, request, action) {
                Ok(payload) => {
                    info!("{} ({}) completed", step_id, action);
                    ExecutionRecord::success(&step_id, payload)
                }
                Err(e) => {
                    warn!("{} ({}) failed: {}", step_id, action, e);
                    ExecutionRecord::failed(&step_id, action, e.to_string())
                }
            };

            let mut entry = EventLogEntry::now(action.as_str())
                .with_detail("step_id", &step_id)
                .with_detail("status", if record.succeeded { "success" } else { "failed" })
                .with_detail(
                    "duration_ms",
                    step_start.elapsed().as_millis().to_string(),
                );
            if let Some(message) = &record.error {
                entry = entry.with_detail("error", message);
            }
            event_log.push(entry);
            executions.insert(record);

            self.report_progress(ProgressUpdate::with_sub_stage(
                stage,
                sub_stage,
                1.0,
                format!("{} complete", stage.display_name()),
            ));
        }

        self.check_cancelled()?;

        self.report_progress(ProgressUpdate::new(
            AnalysisStage::InsightGeneration,
            0.0,
            "Generating insight...",
        ));
        let insight = self.insight(dataset, request, &executions);

        self.check_cancelled()?;

        self.report_progress(ProgressUpdate::new(
            AnalysisStage::ReportAssembly,
            0.0,
            "Assembling report...",
        ));
        let report = ReportAssembler::build(&request.title, &executions, Some(&insight), &event_log);

        info!(
            "Analysis '{}' finished in {:?}: {} steps, {} sections",
            request.title,
            start_time.elapsed(),
            executions.len(),
            report.sections.len()
        );

        Ok(AnalysisOutcome {
            executions,
            event_log,
            insight,
            report,
        })
    }

    /// Requested actions, or `read_file` plus the suggested analyses.
    fn plan(&self, dataset: &DatasetView, request: &AnalysisRequest) -> Vec<ActionTag> {
        if !request.actions.is_empty() {
            return request.actions.clone();
        }

        let mut actions = Vec::new();
        if request.source.is_some() {
            actions.push(ActionTag::ReadFile);
        }
        actions.extend(suggest_analyses(dataset));
        actions
    }

    fn execute(
        &self,
        dataset: &DatasetView,
        request: &AnalysisRequest,
        action: ActionTag,
    ) -> Result<AnalysisPayload> {
        let payload = match action {
            ActionTag::ReadFile => {
                let source = request.source.as_ref().ok_or(AnalysisError::MissingSource)?;
                AnalysisPayload::FileOverview(FileOverview::from_dataset(
                    dataset,
                    &source.name,
                    source.size,
                )?)
            }
            ActionTag::AnalyzeBasicStats => {
                AnalysisPayload::Statistics(self.statistics.compute_basic_statistics(dataset)?)
            }
            ActionTag::CreateVisualizations => {
                AnalysisPayload::Visualizations(self.visualize(dataset))
            }
            ActionTag::DetectOutliers => AnalysisPayload::Outliers(
                self.outliers
                    .detect_outliers(dataset, request.outlier_columns.as_deref())?,
            ),
            ActionTag::TrendAnalysis => AnalysisPayload::Trend(self.trends.analyze_trend(
                dataset,
                request.time_column.as_deref(),
                request.trend_columns.as_deref(),
            )?),
            ActionTag::ClusteringAnalysis => {
                let k = request.n_clusters.unwrap_or(self.clustering.n_clusters());
                AnalysisPayload::Clustering(self.clustering.cluster_analysis(
                    dataset,
                    k,
                    request.cluster_features.as_deref(),
                )?)
            }
        };
        Ok(payload)
    }

    fn visualize(&self, dataset: &DatasetView) -> VisualizationResult {
        let specs = self
            .charts
            .select_charts(dataset, self.config.visualization_mode);

        match &self.chart_renderer {
            Some(renderer) => render_charts(renderer.as_ref(), &specs),
            None => {
                warn!("No chart renderer configured, {} charts not drawn", specs.len());
                VisualizationResult {
                    charts: Vec::new(),
                    failures: specs
                        .into_iter()
                        .map(|spec| ChartFailure {
                            name: spec.name,
                            error: "No chart renderer configured".to_string(),
                        })
                        .collect(),
                }
            }
        }
    }

    /// Narrative insight from the statistics step, computing them if needed.
    fn insight(
        &self,
        dataset: &DatasetView,
        request: &AnalysisRequest,
        executions: &ExecutionMap,
    ) -> String {
        let columns = dataset.column_names();
        let file_name = request.source.as_ref().map(|s| s.name.as_str());

        let recorded = executions
            .get(ActionTag::AnalyzeBasicStats)
            .and_then(|record| match &record.payload {
                Some(AnalysisPayload::Statistics(report)) => Some(report.clone()),
                _ => None,
            });
        let statistics = match recorded {
            Some(report) => Ok(report),
            None => self.statistics.compute_basic_statistics(dataset),
        };

        let insight_request = match statistics {
            Ok(report) => InsightRequest::from_statistics(&report, &columns, file_name),
            Err(e) => {
                warn!("Statistics unavailable for insight: {}", e);
                let shape = Shape {
                    rows: dataset.row_count(),
                    columns: dataset.column_count(),
                };
                InsightRequest::shape_only(shape, &columns, file_name)
            }
        };

        generate_insight(
            self.insight_provider.as_deref(),
            &insight_request,
            &request.goal,
        )
    }
}

/// Builder for creating a configured [`AnalysisPipeline`].
#[derive(Default)]
pub struct AnalysisPipelineBuilder {
    config: Option<AnalysisConfig>,
    insight_provider: Option<Arc<dyn InsightProvider>>,
    chart_renderer: Option<Arc<dyn ChartRenderer>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cancellation_token: Option<CancellationToken>,
}

static_assertions::assert_impl_all!(AnalysisPipelineBuilder: Send);

impl AnalysisPipelineBuilder {
    /// Set the analysis configuration.
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the provider used for the narrative insight.
    ///
    /// Without one, the report carries the canned fallback summary.
    pub fn insight_provider(mut self, provider: Arc<dyn InsightProvider>) -> Self {
        self.insight_provider = Some(provider);
        self
    }

    /// Set the renderer that draws selected charts.
    ///
    /// Without one, every selected chart is listed as a failure and the
    /// visualization section is left out of the report.
    pub fn chart_renderer(mut self, renderer: Arc<dyn ChartRenderer>) -> Self {
        self.chart_renderer = Some(renderer);
        self
    }

    /// Set a progress reporter for receiving updates during the run.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Set a cancellation token for stopping the pipeline.
    ///
    /// The token is checked between steps; a cancelled run returns
    /// [`AnalysisError::Cancelled`].
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<AnalysisPipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(AnalysisPipeline {
            statistics: StatisticsEngine::from_config(&config),
            outliers: OutlierDetector::from_config(&config),
            trends: TrendAnalyzer::from_config(&config),
            clustering: ClusteringEngine::from_config(&config),
            charts: VisualizationSelector::from_config(&config),
            config,
            insight_provider: self.insight_provider,
            chart_renderer: self.chart_renderer,
            progress_reporter: self.progress_reporter,
            cancellation_token: self.cancellation_token.unwrap_or_default(),
        })
    }
}
