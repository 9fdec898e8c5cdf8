//! Tabular Data Analysis Library
//!
//! Deterministic statistical profiling of tabular datasets built on Polars,
//! plus the assembly of the results into an ordered report section model.
//!
//! # Overview
//!
//! This library provides the following analyses over an immutable
//! [`DatasetView`]:
//!
//! - **Descriptive Statistics**: Shape, dtypes, numeric summaries, top categories, missingness, correlations
//! - **Outlier Detection**: IQR fences and z-score counts per numeric column
//! - **Trend Analysis**: Least-squares slope, correlation and p-value against a detected time column
//! - **Clustering**: Seeded k-means on standardized features with a 2D PCA projection
//! - **Chart Selection**: Histogram, box plot, pie, heatmap and scatter specs by column kind
//! - **Report Assembly**: Fixed-order sections built from per-step execution records
//!
//! Analyses that cannot run on a dataset (no time column, fewer than two
//! features) return typed "unavailable" values instead of errors.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_analysis::{AnalysisPipeline, AnalysisRequest, DatasetView};
//! use polars::prelude::*;
//!
//! let df = CsvReadOptions::default()
//!     .try_into_reader_with_file_path(Some("sales.csv".into()))?
//!     .finish()?;
//! let view = DatasetView::new(df);
//!
//! let outcome = AnalysisPipeline::builder()
//!     .build()?
//!     .run(&view, AnalysisRequest::new("Sales").source("sales.csv", 20_480))?;
//!
//! for section in &outcome.report.sections {
//!     println!("{}", section.title);
//! }
//! ```
//!
//! # Individual Components
//!
//! Every engine can be used on its own:
//!
//! ```rust,ignore
//! use lex_analysis::{OutlierDetector, TrendAnalyzer, TrendOutcome};
//!
//! let outliers = OutlierDetector::default().detect_outliers(&view, None)?;
//!
//! match TrendAnalyzer::default().analyze_trend(&view, None, None)? {
//!     TrendOutcome::Trend(report) => println!("time axis: {}", report.time_column),
//!     TrendOutcome::NoTrend(reason) => println!("skipped: {}", reason.reason),
//! }
//! ```
//!
//! # Configuration
//!
//! Use [`AnalysisConfig`] to customize thresholds and limits:
//!
//! ```rust,ignore
//! use lex_analysis::{AnalysisConfig, VisualizationMode};
//!
//! let config = AnalysisConfig::builder()
//!     .iqr_multiplier(3.0)
//!     .zscore_threshold(2.5)
//!     .n_clusters(4)
//!     .random_seed(7)
//!     .visualization_mode(VisualizationMode::Distribution)
//!     .build()?;
//! ```

pub mod clustering;
pub mod config;
pub mod dataset;
pub mod error;
pub mod insight;
pub mod outliers;
pub mod pipeline;
pub mod reporting;
pub mod statistics;
pub mod trend;
pub mod utils;
pub mod visualization;

// Re-exports for convenient access
pub use clustering::{ClusterOutcome, ClusterReport, ClusteringEngine};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError};
pub use dataset::{ColumnKind, ColumnSchema, DatasetView};
pub use error::{AnalysisError, Result as AnalysisResult, ResultExt};
pub use insight::{InsightProvider, InsightRequest, generate_insight};
pub use outliers::{OutlierDetector, OutlierReport};
pub use pipeline::{
    AnalysisOutcome, AnalysisPipeline, AnalysisPipelineBuilder, AnalysisRequest, AnalysisStage,
    CancellationToken, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
    suggest_analyses,
};
pub use reporting::{
    ActionTag, AnalysisPayload, AssembledReport, EventLogEntry, ExecutionMap, ExecutionRecord,
    ReportAssembler, Section, SectionContent, SectionKind,
};
pub use statistics::{StatisticsEngine, StatisticsReport};
pub use trend::{TrendAnalyzer, TrendOutcome, TrendReport};
pub use visualization::{
    ChartKind, ChartRenderer, ChartSpec, VisualizationMode, VisualizationSelector,
};
