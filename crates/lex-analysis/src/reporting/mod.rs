//! Report section assembly.
//!
//! Every analysis step's outcome is wrapped in an [`ExecutionRecord`] and
//! stored in an [`ExecutionMap`] keyed by its [`ActionTag`]. The
//! [`ReportAssembler`] turns that map into an ordered list of [`Section`]s
//! for a renderer.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_analysis::reporting::{AnalysisPayload, ExecutionMap, ExecutionRecord, ReportAssembler};
//!
//! let mut executions = ExecutionMap::new();
//! executions.insert(ExecutionRecord::success("step_1", AnalysisPayload::Statistics(stats)));
//! executions.insert(ExecutionRecord::success("step_2", AnalysisPayload::Outliers(outliers)));
//!
//! let report = ReportAssembler::build("Sales", &executions, Some(&insight), &event_log);
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```

mod assembler;
mod execution;
mod overview;
mod section;

pub use assembler::{AssembledReport, ReportAssembler};
pub use execution::{ActionTag, AnalysisPayload, EventLogEntry, ExecutionMap, ExecutionRecord};
pub use overview::{DataSummary, FileOverview, format_size};
pub use section::{DataOverviewContent, Section, SectionContent, SectionKind};
