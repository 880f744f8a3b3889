//! Unified error hierarchy for trainload
//!
//! Parse failures carry enough context (row index, raw date, field name)
//! to point the user at the offending line of the activity export.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all trainload operations
#[derive(Debug, Error)]
pub enum TrainLoadError {
    /// A source row could not be turned into an activity record
    #[error("Record {index} ({date}): invalid {field}: {source}")]
    Record {
        index: usize,
        date: String,
        field: &'static str,
        #[source]
        source: ParseError,
    },

    /// Date column could not be read as YYYY-MM-DD
    #[error("Record {index}: invalid date '{raw}'")]
    InvalidDate { index: usize, raw: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader/writer errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Export errors
    #[error("Export failed to {path}: {reason}")]
    Export { path: PathBuf, reason: String },
}

/// Errors produced while parsing clock durations and paces
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Nothing left to parse once the fractional suffix was removed
    #[error("empty value")]
    Empty,

    /// Fewer than two colon-separated fields
    #[error("expected at least two ':'-separated fields in '{raw}'")]
    MissingFields { raw: String },

    /// More fields than H:MM:SS
    #[error("too many ':'-separated fields in '{raw}'")]
    TooManyFields { raw: String },

    /// A field is empty or non-numeric
    #[error("non-numeric field '{field}' in '{raw}'")]
    InvalidField { raw: String, field: String },
}

/// Result type alias for trainload operations
pub type Result<T> = std::result::Result<T, TrainLoadError>;

impl TrainLoadError {
    /// Row index of the offending record, when the error came from one
    pub fn record_index(&self) -> Option<usize> {
        match self {
            TrainLoadError::Record { index, .. } | TrainLoadError::InvalidDate { index, .. } => {
                Some(*index)
            }
            _ => None,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            TrainLoadError::Record { date, field, .. } => format!(
                "Activity on {} has an unreadable {}. Fix the export and re-run.",
                date, field
            ),
            TrainLoadError::InvalidDate { raw, .. } => {
                format!("An activity has an unreadable date: '{}'", raw)
            }
            _ => self.to_string(),
        }
    }
}
