use acc_core::{AccError, MeasuringPointId, Mode};
use acc_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    #[error(transparent)]
    Core(#[from] AccError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error("accessibility for point {point} and mode {mode} was already set")]
    DuplicateValue {
        point: MeasuringPointId,
        mode:  Mode,
    },

    #[error("measuring point {0} is not part of the grid")]
    UnknownPoint(MeasuringPointId),

    #[error("mode {0} is not enabled for this run")]
    ModeNotEnabled(Mode),
}

pub type GridResult<T> = Result<T, GridError>;
