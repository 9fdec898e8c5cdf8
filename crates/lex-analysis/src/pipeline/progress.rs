//! Progress reporting and cancellation support for the analysis pipeline.
//!
//! This module provides types for tracking pipeline progress and supporting
//! cancellation from other threads.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_analysis::{AnalysisPipeline, AnalysisRequest, CancellationToken};
//!
//! let token = CancellationToken::new();
//! let token_clone = token.clone();
//!
//! std::thread::spawn(move || {
//!     std::thread::sleep(std::time::Duration::from_secs(5));
//!     token_clone.cancel();
//! });
//!
//! let outcome = AnalysisPipeline::builder()
//!     .cancellation_token(token)
//!     .on_progress(|update| {
//!         println!("[{:?}] {}", update.stage, update.message);
//!     })
//!     .build()?
//!     .run(&view, AnalysisRequest::new("Sales"));
//! ```

use crate::reporting::ActionTag;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Stages of the analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    /// Pipeline is planning which steps to run
    Initializing,
    /// Describing the source file
    FileOverview,
    /// Computing descriptive statistics
    Statistics,
    /// Selecting and rendering charts
    Visualization,
    /// Detecting outliers
    OutlierDetection,
    /// Fitting trends
    TrendAnalysis,
    /// Clustering rows
    Clustering,
    /// Generating the narrative insight
    InsightGeneration,
    /// Assembling report sections
    ReportAssembly,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline was cancelled by user
    Cancelled,
    /// Pipeline failed with an error
    Failed,
}

impl AnalysisStage {
    /// Stage that runs a given action.
    pub fn for_action(action: ActionTag) -> Self {
        match action {
            ActionTag::ReadFile => Self::FileOverview,
            ActionTag::AnalyzeBasicStats => Self::Statistics,
            ActionTag::CreateVisualizations => Self::Visualization,
            ActionTag::DetectOutliers => Self::OutlierDetection,
            ActionTag::TrendAnalysis => Self::TrendAnalysis,
            ActionTag::ClusteringAnalysis => Self::Clustering,
        }
    }

    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Initializing => "Initializing",
            Self::FileOverview => "Reading File Metadata",
            Self::Statistics => "Computing Statistics",
            Self::Visualization => "Creating Visualizations",
            Self::OutlierDetection => "Detecting Outliers",
            Self::TrendAnalysis => "Analyzing Trends",
            Self::Clustering => "Clustering",
            Self::InsightGeneration => "Generating Insight",
            Self::ReportAssembly => "Assembling Report",
            Self::Complete => "Complete",
            Self::Cancelled => "Cancelled",
            Self::Failed => "Failed",
        }
    }

    /// Returns the typical weight of this stage in the overall pipeline (0.0 - 1.0).
    pub fn weight(&self) -> f32 {
        match self {
            Self::Initializing => 0.02,
            Self::FileOverview => 0.03,
            Self::Statistics => 0.15,
            Self::Visualization => 0.15,
            Self::OutlierDetection => 0.10,
            Self::TrendAnalysis => 0.15,
            Self::Clustering => 0.25,
            Self::InsightGeneration => 0.10,
            Self::ReportAssembly => 0.05,
            Self::Complete => 0.0,
            Self::Cancelled => 0.0,
            Self::Failed => 0.0,
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Initializing => 0.0,
            Self::FileOverview => 0.02,
            Self::Statistics => 0.05,
            Self::Visualization => 0.20,
            Self::OutlierDetection => 0.35,
            Self::TrendAnalysis => 0.45,
            Self::Clustering => 0.60,
            Self::InsightGeneration => 0.85,
            Self::ReportAssembly => 0.95,
            Self::Complete => 1.0,
            Self::Cancelled => 0.0,
            Self::Failed => 0.0,
        }
    }
}

/// Progress update emitted by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: AnalysisStage,

    /// Optional sub-stage description (e.g., "Step 2/5")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_stage: Option<String>,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Creates a new progress update for a stage without sub-stage info.
    pub fn new(stage: AnalysisStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            sub_stage: None,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// Creates a new progress update with sub-stage information.
    pub fn with_sub_stage(
        stage: AnalysisStage,
        sub_stage: impl Into<String>,
        stage_progress: f32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            sub_stage: Some(sub_stage.into()),
            ..Self::new(stage, stage_progress, message)
        }
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: AnalysisStage::Complete,
            sub_stage: None,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    /// Creates a cancelled progress update.
    pub fn cancelled() -> Self {
        Self {
            stage: AnalysisStage::Cancelled,
            sub_stage: None,
            progress: 0.0,
            stage_progress: 0.0,
            message: "Analysis cancelled by user".to_string(),
        }
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: AnalysisStage::Failed,
            sub_stage: None,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

/// Trait for receiving progress updates during analysis.
///
/// Implementations must be `Send + Sync` so the pipeline can run on a
/// background thread while reporting elsewhere.
pub trait ProgressReporter: Send + Sync {
    /// Called when progress is made. Implementations should be non-blocking.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

/// Token for cancelling a running pipeline.
///
/// Clones share state. The pipeline checks the token between steps and
/// returns [`AnalysisError::Cancelled`](crate::error::AnalysisError::Cancelled)
/// once it is set.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

static_assertions::assert_impl_all!(CancellationToken: Send, Sync);
static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

impl CancellationToken {
    /// Creates a new cancellation token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. Safe to call from any thread.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested on this token or a clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_cancellation_token_clone_shares_state() {
        let token1 = CancellationToken::new();
        let token2 = token1.clone();
        assert!(!token2.is_cancelled());

        token1.cancel();
        assert!(token2.is_cancelled());
        assert!(!CancellationToken::new().is_cancelled());
    }

    #[test]
    fn test_progress_update_new() {
        let update = ProgressUpdate::new(AnalysisStage::Statistics, 0.5, "Computing...");
        assert_eq!(update.stage, AnalysisStage::Statistics);
        assert!(update.sub_stage.is_none());
        assert_eq!(update.stage_progress, 0.5);
        assert!((update.progress - 0.125).abs() < 1e-6);
    }

    #[test]
    fn test_progress_update_with_sub_stage() {
        let update =
            ProgressUpdate::with_sub_stage(AnalysisStage::Clustering, "Step 3/4", 0.0, "Clustering");
        assert_eq!(update.sub_stage.as_deref(), Some("Step 3/4"));
        assert_eq!(update.progress, AnalysisStage::Clustering.base_progress());
    }

    #[test]
    fn test_closure_progress_reporter() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let reporter = ClosureProgressReporter::new(move |_update| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        reporter.report(ProgressUpdate::new(AnalysisStage::Statistics, 0.5, "Test"));
        reporter.report(ProgressUpdate::complete("Done"));

        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_stage_weights_sum() {
        let stages = [
            AnalysisStage::Initializing,
            AnalysisStage::FileOverview,
            AnalysisStage::Statistics,
            AnalysisStage::Visualization,
            AnalysisStage::OutlierDetection,
            AnalysisStage::TrendAnalysis,
            AnalysisStage::Clustering,
            AnalysisStage::InsightGeneration,
            AnalysisStage::ReportAssembly,
        ];

        let total_weight: f32 = stages.iter().map(|s| s.weight()).sum();
        assert!((total_weight - 1.0).abs() < 0.01, "Weights should sum to ~1.0");
    }

    #[test]
    fn test_stage_json_values() {
        let expectations = [
            (AnalysisStage::OutlierDetection, "\"outlier_detection\""),
            (AnalysisStage::InsightGeneration, "\"insight_generation\""),
            (AnalysisStage::Complete, "\"complete\""),
        ];
        for (stage, expected) in expectations {
            assert_eq!(serde_json::to_string(&stage).unwrap(), expected);
        }
    }

    #[test]
    fn test_stage_for_action() {
        assert_eq!(
            AnalysisStage::for_action(ActionTag::TrendAnalysis),
            AnalysisStage::TrendAnalysis
        );
        assert_eq!(
            AnalysisStage::for_action(ActionTag::ReadFile),
            AnalysisStage::FileOverview
        );
    }
}
