use thiserror::Error;

use acc_core::AccError;
use acc_spatial::SpatialError;

#[derive(Debug, Error)]
pub enum GravityError {
    #[error(transparent)]
    Core(#[from] AccError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

pub type GravityResult<T> = Result<T, GravityError>;
