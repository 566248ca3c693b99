//! Toolkit error type.
//!
//! Sub-crates define their own error enums and wrap `AccError` as one
//! variant via `#[from]`, so configuration and data-integrity failures keep
//! their meaning as they propagate.

use thiserror::Error;

/// The top-level error type for `acc-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum AccError {
    /// Unsupported or missing configuration; raised before any computation.
    #[error("configuration error: {0}")]
    Config(String),

    /// Input data lacks something a computation needs (e.g. a facility
    /// without the expected activity option).
    #[error("data integrity error: {0}")]
    DataIntegrity(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `acc-*` crates.
pub type AccResult<T> = Result<T, AccError>;
