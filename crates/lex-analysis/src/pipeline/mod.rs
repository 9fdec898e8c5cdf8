//! Pipeline module.
//!
//! This module provides the analysis pipeline that runs the requested steps
//! over a dataset and hands their results to the report assembler.

mod builder;
pub mod progress;
mod request;
mod suggest;

pub use builder::{AnalysisPipeline, AnalysisPipelineBuilder};
pub use progress::{
    AnalysisStage, CancellationToken, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
pub use request::{AnalysisOutcome, AnalysisRequest, DEFAULT_GOAL, SourceFile};
pub use suggest::suggest_analyses;
