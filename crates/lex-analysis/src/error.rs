//! Error types for the analysis pipeline.
//!
//! Only contract violations by the caller are errors. Conditions that affect a
//! single column degrade to omitting that column, and conditions that make a
//! whole analysis impossible (no time column, fewer than two features) are
//! returned as typed "unavailable" values by the component itself.
//!
//! Errors are serializable as `{code, message}` so they can travel next to
//! the analysis payloads.

use crate::dataset::ColumnKind;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the analysis pipeline.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Column exists but is not of the kind the operation requires.
    #[error("Column '{column}' is {actual}, expected {expected}")]
    InvalidColumnKind {
        column: String,
        expected: ColumnKind,
        actual: ColumnKind,
    },

    /// Cluster count outside the accepted range.
    #[error("Invalid cluster count {0} (must be at least 1)")]
    InvalidClusterCount(usize),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Action name does not match any known analysis action.
    #[error("Unknown analysis action '{0}'")]
    UnknownAction(String),

    /// Visualization mode name is not recognized.
    #[error("Unknown visualization mode '{0}'")]
    UnknownVisualizationMode(String),

    /// `read_file` was requested without source file metadata.
    #[error("No source file metadata supplied for read_file")]
    MissingSource,

    /// Pipeline was cancelled by the caller.
    #[error("Analysis cancelled")]
    Cancelled,

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidColumnKind { .. } => "INVALID_COLUMN_KIND",
            Self::InvalidClusterCount(_) => "INVALID_CLUSTER_COUNT",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::UnknownAction(_) => "UNKNOWN_ACTION",
            Self::UnknownVisualizationMode(_) => "UNKNOWN_VISUALIZATION_MODE",
            Self::MissingSource => "MISSING_SOURCE",
            Self::Cancelled => "CANCELLED",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the caller passed a column that is absent or of the wrong kind.
    pub fn is_input_shape_error(&self) -> bool {
        match self {
            Self::ColumnNotFound(_) | Self::InvalidColumnKind { .. } => true,
            Self::WithContext { source, .. } => source.is_input_shape_error(),
            _ => false,
        }
    }

    /// Check if this error represents a cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::WithContext { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for AnalysisError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalysisError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Polars(e).with_context(context))
    }
}
