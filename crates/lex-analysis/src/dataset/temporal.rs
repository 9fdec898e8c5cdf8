//! Timestamp detection and conversion.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}[-/]\d{1,2}[-/]\d{1,2}$").expect("Invalid regex: YYYY-MM-DD"),
        Regex::new(r"^\d{1,2}[-/]\d{1,2}[-/]\d{4}$").expect("Invalid regex: MM-DD-YYYY"),
        Regex::new(r"^\d{4}[-/]\d{1,2}[-/]\d{1,2}\s\d{1,2}:\d{2}").expect("Invalid regex: datetime"),
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}").expect("Invalid regex: ISO"),
    ]
});

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y"];

/// Whether a text value has a recognizable date shape and parses.
pub(crate) fn looks_like_timestamp(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.parse::<f64>().is_ok() {
        return false;
    }
    DATE_PATTERNS.iter().any(|p| p.is_match(trimmed)) && parse_timestamp_millis(trimmed).is_some()
}

/// Parse a text value into milliseconds since the Unix epoch (UTC).
pub fn parse_timestamp_millis(value: &str) -> Option<i64> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.timestamp_millis());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis());
        }
    }

    None
}

/// Convert a column into epoch milliseconds.
///
/// Missing values stay missing. Returns `None` when any present value cannot
/// be converted, or when the dtype is not temporal or text.
pub(crate) fn column_timestamps(series: &Series) -> Option<Vec<Option<i64>>> {
    match series.dtype() {
        DataType::Date | DataType::Datetime(_, _) => {
            let casted = series
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
                .ok()?;
            let values = casted.datetime().ok()?.physical().into_iter().collect();
            Some(values)
        }
        DataType::String => {
            let text = series.str().ok()?;
            text.into_iter()
                .map(|value| match value {
                    None => Some(None),
                    Some(s) => parse_timestamp_millis(s).map(Some),
                })
                .collect()
        }
        _ => None,
    }
}

/// Format epoch milliseconds as `YYYY-MM-DD`.
pub fn format_date(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| millis.to_string())
}
