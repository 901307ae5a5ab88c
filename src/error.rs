//! Error types for the timetable engine.
//!
//! Only malformed input is an error. An infeasible catalog or an exhausted
//! runtime budget still produces a schedule; its quality is expressed through
//! fitness and conflicts, never through `Err`.

use thiserror::Error;

use crate::config::ConfigError;
use crate::validation::ValidationError;

/// A wall-clock string that is not `HH:mm`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time '{input}': expected HH:mm between 00:00 and 23:59")]
pub struct TimeFormatError {
    /// The rejected input.
    pub input: String,
}

/// Main error type for timetable operations.
#[derive(Debug, Error)]
pub enum TimetableError {
    /// Catalog, settings, or schedule failed validation before a run.
    #[error("invalid input: {} problem(s), first: {}", .0.len(), first_message(.0))]
    InvalidInput(Vec<ValidationError>),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A time string could not be parsed.
    #[error(transparent)]
    TimeFormat(#[from] TimeFormatError),
}

fn first_message(errors: &[ValidationError]) -> &str {
    errors.first().map(|e| e.message.as_str()).unwrap_or("none")
}

/// Result type alias for timetable operations.
pub type Result<T> = std::result::Result<T, TimetableError>;
