use acc_core::AccError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error(transparent)]
    Core(#[from] AccError),

    #[error("no typical duration for activity type {0:?}")]
    MissingTypicalDuration(String),
}

pub type ScoringResult<T> = Result<T, ScoringError>;
