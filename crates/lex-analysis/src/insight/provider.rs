//! Insight provider trait for narrative summaries.
//!
//! This module defines the [`InsightProvider`] trait that lets any text
//! generation backend write the narrative part of a report without the
//! analysis core depending on it.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_analysis::insight::{InsightProvider, InsightRequest};
//!
//! struct Canned;
//!
//! impl InsightProvider for Canned {
//!     fn summarize(&self, request: &InsightRequest, _goal: &str) -> anyhow::Result<String> {
//!         Ok(format!("{} rows analyzed", request.total_rows))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "canned"
//!     }
//! }
//! ```

use super::InsightRequest;
use anyhow::Result;

/// Trait for backends that turn analysis results into prose.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow usage across threads.
///
/// # Error Handling
///
/// Implementations should return meaningful errors via `anyhow::Result`.
/// Callers fall back to a canned summary when the provider fails.
pub trait InsightProvider: Send + Sync {
    /// Summarize the structured analysis input with respect to `goal`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable, times out or
    /// produces no usable text.
    fn summarize(&self, request: &InsightRequest, goal: &str) -> Result<String>;

    /// Provider name for logging and debugging.
    fn name(&self) -> &str;
}
