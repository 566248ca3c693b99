//! Penalties subtracted from the score after performance.
//!
//! The facility-load penalty reduces the score gained at crowded shops and
//! leisure facilities:
//!
//! ```text
//! penalty = improvement · min(1, mean_bins(factor · (visitors / capacity)^exp))
//! ```
//!
//! where the mean runs over the load bins the performed segment overlaps.

use rustc_hash::FxHashMap;

use acc_core::FacilityId;

/// Width of one load bin in seconds.
pub const LOAD_BIN_SECONDS: f64 = 900.0;

/// A performed segment that may be penalized, with the score it added.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PenaltyRecord {
    pub facility:    Option<FacilityId>,
    pub start:       f64,
    pub end:         f64,
    pub improvement: f64,
}

/// Pluggable penalty adjustment.
pub trait PenaltyAdjustment: Send + Sync {
    /// Whether segments of `activity_type` are recorded at all.
    fn applies_to(&self, _activity_type: &str) -> bool {
        false
    }

    fn penalty(&self, record: &PenaltyRecord) -> f64;
}

/// No penalties.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoPenalty;

impl PenaltyAdjustment for NoPenalty {
    fn penalty(&self, _record: &PenaltyRecord) -> f64 {
        0.0
    }
}

// ── Facility load ─────────────────────────────────────────────────────────────

/// Visitors per time bin at one facility.
#[derive(Clone, Debug, PartialEq)]
pub struct FacilityLoad {
    capacity: f64,
    visitors: Vec<f64>,
}

impl FacilityLoad {
    pub fn new(capacity: f64) -> Self {
        Self { capacity, visitors: Vec::new() }
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Count one visitor in every bin `[start, end)` overlaps.
    pub fn add_visitor(&mut self, start: f64, end: f64) {
        let bins = bin_range(start, end);
        if bins.end > self.visitors.len() {
            self.visitors.resize(bins.end, 0.0);
        }
        for bin in bins {
            self.visitors[bin] += 1.0;
        }
    }

    pub fn visitors(&self, bin: usize) -> f64 {
        self.visitors.get(bin).copied().unwrap_or(0.0)
    }

    /// Mean restraint over the bins of `[start, end)`, capped at 1.
    pub fn penalty_factor(&self, start: f64, end: f64, factor: f64, exponent: f64) -> f64 {
        if !(self.capacity > 0.0) {
            return 0.0;
        }
        let bins = bin_range(start, end);
        if bins.is_empty() {
            return 0.0;
        }
        let count = bins.len() as f64;
        let sum: f64 = bins
            .map(|bin| factor * (self.visitors(bin) / self.capacity).powf(exponent))
            .sum();
        (sum / count).min(1.0)
    }
}

fn bin_range(start: f64, end: f64) -> std::ops::Range<usize> {
    if !(end > start) {
        return 0..0;
    }
    let first = (start.max(0.0) / LOAD_BIN_SECONDS).floor() as usize;
    let last = (end.max(0.0) / LOAD_BIN_SECONDS).ceil() as usize;
    first..last.max(first)
}

/// Facility-load penalty for activity types starting with `shop` or
/// `leisure`.
#[derive(Clone, Debug, Default)]
pub struct FacilityLoadPenalty {
    pub loads:    FxHashMap<FacilityId, FacilityLoad>,
    pub factor:   f64,
    pub exponent: f64,
}

impl FacilityLoadPenalty {
    pub fn new(loads: FxHashMap<FacilityId, FacilityLoad>, factor: f64, exponent: f64) -> Self {
        Self { loads, factor, exponent }
    }
}

impl PenaltyAdjustment for FacilityLoadPenalty {
    fn applies_to(&self, activity_type: &str) -> bool {
        activity_type.starts_with("shop") || activity_type.starts_with("leisure")
    }

    fn penalty(&self, record: &PenaltyRecord) -> f64 {
        let Some(load) = record.facility.and_then(|f| self.loads.get(&f)) else {
            return 0.0;
        };
        record.improvement * load.penalty_factor(record.start, record.end, self.factor, self.exponent)
    }
}
