//! Error types for stablecal.

use thiserror::Error;

/// Errors that can occur while building or exporting a calendar.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Invalid event record: field '{field}' {reason}")]
    InvalidRecord { field: &'static str, reason: String },

    #[error("Cannot {operation} while exporter is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("Failed to write calendar to sink: {0}")]
    Sink(#[source] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("Record input is not valid JSON: {0}")]
    Json(String),
}

impl ExportError {
    pub(crate) fn invalid_record(field: &'static str, reason: impl Into<String>) -> Self {
        ExportError::InvalidRecord {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type alias for stablecal operations.
pub type ExportResult<T> = Result<T, ExportError>;
