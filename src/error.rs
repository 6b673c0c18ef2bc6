//! Error types for the timesheet engine
//!
//! Every fallible operation reports a typed outcome. `NotFound` and
//! `Validation` are local and leave state untouched; `Transport` means the
//! external round-trip failed and any optimistic change has been reverted.

use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for the ticktock crate
#[derive(Error, Debug)]
pub enum TimesheetError {
    /// A referenced timesheet or entry does not exist
    #[error("Not found: {0}")]
    NotFound(#[from] NotFoundError),

    /// A field constraint was violated
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The external round-trip failed or returned non-success
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("timesheet '{0}'")]
    Timesheet(String),

    #[error("timesheet for week {0}")]
    Week(u32),

    #[error("entry '{0}'")]
    Entry(String),

    #[error("entry '{entry_id}' in timesheet '{timesheet_id}'")]
    EntryInTimesheet {
        timesheet_id: String,
        entry_id: String,
    },
}

/// Field constraint violations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid hours value: {0}. Must be between 0.5 and 24")]
    HoursOutOfRange(f64),

    #[error("Missing required field: {0}")]
    EmptyField(&'static str),

    #[error("Date {date} is outside the week {start} - {end}")]
    DateOutsideWeek {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Invalid date format: {0}. Expected YYYY-MM-DD, YYYY.MM.DD, or YYYY/MM/DD")]
    InvalidDateFormat(String),

    #[error("Invalid week number: {0}. Must be a positive integer")]
    InvalidWeekNumber(u32),

    #[error("Year {0} is out of range")]
    InvalidYear(i32),

    #[error("Unknown status filter: {0}")]
    UnknownStatus(String),

    #[error("Unknown date range: {0}")]
    UnknownDateBucket(String),
}

/// Failures talking to the timesheet backend
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to connect to timesheet API: {0}")]
    ConnectionFailed(String),

    #[error("API request failed ({status}): {body}")]
    RequestFailed { status: u16, body: String },

    #[error("API reported failure: {0}")]
    Rejected(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDirectory,

    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration file: {0}")]
    SaveFailed(String),

    #[error("Invalid API URL: {0}")]
    InvalidApiUrl(String),
}

/// Result type alias for the ticktock crate
pub type Result<T> = std::result::Result<T, TimesheetError>;

impl TimesheetError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TimesheetError::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TimesheetError::Validation(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, TimesheetError::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TimesheetError::NotFound(NotFoundError::Entry("entry-9".to_string()));
        assert_eq!(err.to_string(), "Not found: entry 'entry-9'");

        let err = TimesheetError::Validation(ValidationError::HoursOutOfRange(25.0));
        assert!(err.to_string().contains("Invalid hours value"));
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TimesheetError = io_err.into();
        assert!(matches!(err, TimesheetError::Io(_)));

        let err: TimesheetError = ValidationError::EmptyField("projectName").into();
        assert!(err.is_validation());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_validation_errors() {
        let err = ValidationError::InvalidDateFormat("2025-13-01".to_string());
        assert!(err.to_string().contains("Invalid date format"));

        let err = ValidationError::HoursOutOfRange(0.0);
        assert!(err.to_string().contains("between 0.5 and 24"));
    }

    #[test]
    fn test_transport_error_display() {
        let err = TimesheetError::Transport(TransportError::RequestFailed {
            status: 500,
            body: "Internal server error".to_string(),
        });
        assert!(err.is_transport());
        assert!(err.to_string().contains("500"));
    }
}
