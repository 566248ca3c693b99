//! Utility of performing an activity type for a total duration.

use crate::ScoringParams;

/// Pluggable performance utility.
///
/// `duration` is the accumulated performed time of one activity type over
/// the whole plan, `typical` its typical duration; both in seconds.
pub trait PerformanceUtility: Send + Sync {
    fn utility(&self, params: &ScoringParams, typical: f64, duration: f64) -> f64;
}

/// Logarithmic utility with a zero-utility duration
/// `t0 = (typ/3600) · exp(−10 / (typ/3600) / priority)` hours:
///
/// ```text
/// d > 0:  max(0, max(β_perf · typ · ln((d/3600) / t0), β_wait · d))
/// d ≤ 0:  2 · β_late · |d|
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct CharyparNagel;

impl CharyparNagel {
    /// Zero-utility duration in hours.
    pub fn zero_utility_duration(typical: f64, priority: f64) -> f64 {
        let hours = typical / 3600.0;
        hours * (-10.0 / hours / priority).exp()
    }
}

impl PerformanceUtility for CharyparNagel {
    fn utility(&self, params: &ScoringParams, typical: f64, duration: f64) -> f64 {
        if duration > 0.0 {
            let t0 = Self::zero_utility_duration(typical, params.priority);
            let perf = params.marginal_utility_of_performing * typical * ((duration / 3600.0) / t0).ln();
            let wait = params.marginal_utility_of_waiting * duration;
            perf.max(wait).max(0.0)
        } else {
            2.0 * params.marginal_utility_of_late_arrival * duration.abs()
        }
    }
}

/// `β_perf · d`, independent of the typical duration.
#[derive(Copy, Clone, Debug, Default)]
pub struct Linear;

impl PerformanceUtility for Linear {
    fn utility(&self, params: &ScoringParams, _typical: f64, duration: f64) -> f64 {
        params.marginal_utility_of_performing * duration
    }
}
