//! Power-law distance-decay potential.
//!
//! ```text
//! potential(d, cap) = d^β_d + cap^β_c
//! ```
//!
//! A distance of exactly `0.0` is replaced by [`MIN_DISTANCE`] before
//! exponentiation, so `potential(0, cap) == potential(MIN_DISTANCE, cap)`.

use acc_core::{AccError, AccResult};

/// Substitute for a zero origin–destination distance.
pub const MIN_DISTANCE: f64 = 10.0;

/// Calibrated exponents, fixed for one computation pass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Betas {
    pub distance: f64,
    pub capacity: f64,
}

impl Betas {
    pub fn new(distance: f64, capacity: f64) -> Self {
        Self { distance, capacity }
    }
}

#[inline]
pub fn potential(distance: f64, capacity: f64, betas: Betas) -> f64 {
    let d = if distance == 0.0 {
        log::trace!("zero distance replaced by {MIN_DISTANCE}");
        MIN_DISTANCE
    } else {
        distance
    };
    d.powf(betas.distance) + capacity.powf(betas.capacity)
}

/// Reject capacities for which `capacity^beta` is not a finite real number.
///
/// A non-positive capacity is only accepted with a positive integer
/// exponent.
pub fn validate_capacity(capacity: f64, beta: f64) -> AccResult<()> {
    if capacity.is_nan() {
        return Err(AccError::DataIntegrity("capacity is NaN".into()));
    }
    if capacity > 0.0 {
        return Ok(());
    }
    if beta <= 0.0 || beta.fract() != 0.0 {
        return Err(AccError::DataIntegrity(format!(
            "capacity {capacity} is undefined under capacity exponent {beta}"
        )));
    }
    Ok(())
}
