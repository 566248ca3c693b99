//! Error types for acc-output.

use acc_core::AccError;
use thiserror::Error;

/// Errors that can occur when writing results or comparing counts.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Core(#[from] AccError),

    #[error("hour {0} is outside 1..=24")]
    InvalidHour(u32),

    #[error("unknown link {0:?}")]
    UnknownLink(String),

    #[error("activity type {0:?} cannot be used as a directory name")]
    InvalidActivityType(String),
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
