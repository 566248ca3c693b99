//! The fixed scoring pipeline.
//!
//! ```text
//! for each performed activity:
//!   ① Clip      — stay clipped to the facility's opening times on the
//!                 scoring day; per-type durations, waiting time, and
//!                 too-short time are accumulated.
//!   ② Record    — for penalized types, each positive segment records the
//!                 performance it added.
//! finish:
//!   ③ Perform   — performance utility of each type's total duration.
//!   ④ Penalize  — penalty adjustment of every record.
//!   score = too_short + waiting + performance − penalties
//! ```
//!
//! Strategies for ③ and ④ are trait objects chosen by configuration.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use acc_core::FacilityId;
use acc_scenario::{ActivityFacilities, Plan};

use crate::config::{PenaltyKind, PerformanceKind, ScoringConfig, ScoringParams};
use crate::opening::{clip, opening_times};
use crate::penalty::{FacilityLoad, FacilityLoadPenalty, NoPenalty, PenaltyAdjustment, PenaltyRecord};
use crate::performance::{CharyparNagel, Linear, PerformanceUtility};
use crate::{ScoringError, ScoringResult};

/// End of the scored day; the last activity of a plan without an end time
/// lasts until here.
pub const DAY_END: f64 = 24.0 * 3600.0;

/// One activity as actually performed: where, and from when to when.
#[derive(Clone, Debug, PartialEq)]
pub struct PerformedActivity {
    pub activity_type: String,
    pub facility:      Option<FacilityId>,
    pub arrival:       f64,
    pub departure:     f64,
}

impl PerformedActivity {
    pub fn new(activity_type: impl Into<String>, facility: Option<FacilityId>, arrival: f64, departure: f64) -> Self {
        Self { activity_type: activity_type.into(), facility, arrival, departure }
    }

    /// Activities of `plan` with zero travel time between them: each one
    /// starts when the previous one ends, the first at midnight.
    pub fn from_plan(plan: &Plan) -> Vec<PerformedActivity> {
        let mut out = Vec::with_capacity(plan.activities.len());
        let mut arrival = 0.0;
        for activity in &plan.activities {
            let departure = activity.end_time.unwrap_or_else(|| DAY_END.max(arrival));
            out.push(PerformedActivity::new(
                activity.activity_type.clone(),
                activity.facility,
                arrival,
                departure,
            ));
            arrival = departure;
        }
        out
    }
}

/// Components of a plan's score.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub too_short:   f64,
    pub waiting:     f64,
    pub performance: f64,
    pub penalties:   f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.too_short + self.waiting + self.performance - self.penalties
    }
}

// ── ScoringPipeline ───────────────────────────────────────────────────────────

pub struct ScoringPipeline {
    params:      ScoringParams,
    performance: Box<dyn PerformanceUtility>,
    penalty:     Box<dyn PenaltyAdjustment>,
}

impl ScoringPipeline {
    pub fn new(
        params: ScoringParams,
        performance: Box<dyn PerformanceUtility>,
        penalty: Box<dyn PenaltyAdjustment>,
    ) -> Self {
        Self { params, performance, penalty }
    }

    /// Strategies as selected by `config`.  `loads` is only used by the
    /// facility-load penalty.
    pub fn from_config(config: &ScoringConfig, loads: FxHashMap<FacilityId, FacilityLoad>) -> Self {
        let performance: Box<dyn PerformanceUtility> = match config.performance {
            PerformanceKind::CharyparNagel => Box::new(CharyparNagel),
            PerformanceKind::Linear => Box::new(Linear),
        };
        let penalty: Box<dyn PenaltyAdjustment> = match config.penalty {
            PenaltyKind::None => Box::new(NoPenalty),
            PenaltyKind::FacilityLoad => Box::new(FacilityLoadPenalty::new(
                loads,
                config.restraint_factor,
                config.restraint_exponent,
            )),
        };
        log::debug!("scoring with {:?} performance and {:?} penalty", config.performance, config.penalty);
        Self::new(config.params.clone(), performance, penalty)
    }

    pub fn params(&self) -> &ScoringParams {
        &self.params
    }

    /// Score a sequence of performed activities.
    pub fn score(&self, activities: &[PerformedActivity], facilities: &ActivityFacilities) -> ScoringResult<ScoreBreakdown> {
        let mut scoring = ActivityScoring::new(self, facilities);
        for activity in activities {
            scoring.handle(activity)?;
        }
        scoring.finish()
    }

    /// Score `plan` assuming zero travel time.
    pub fn score_plan(&self, plan: &Plan, facilities: &ActivityFacilities) -> ScoringResult<ScoreBreakdown> {
        self.score(&PerformedActivity::from_plan(plan), facilities)
    }

    /// Performance utility of `duration` seconds of `activity_type`.
    pub fn performance_utility(&self, activity_type: &str, duration: f64) -> ScoringResult<f64> {
        let typical = self
            .params
            .typical_duration(activity_type)
            .ok_or_else(|| ScoringError::MissingTypicalDuration(activity_type.to_owned()))?;
        Ok(self.performance.utility(&self.params, typical, duration))
    }
}

// ── ActivityScoring ───────────────────────────────────────────────────────────

/// Per-plan accumulator driven by [`ScoringPipeline`].
pub struct ActivityScoring<'p> {
    pipeline:   &'p ScoringPipeline,
    facilities: &'p ActivityFacilities,
    durations:  BTreeMap<String, f64>,
    too_short:  f64,
    waiting:    f64,
    records:    Vec<PenaltyRecord>,
}

impl<'p> ActivityScoring<'p> {
    pub fn new(pipeline: &'p ScoringPipeline, facilities: &'p ActivityFacilities) -> Self {
        Self {
            pipeline,
            facilities,
            durations: BTreeMap::new(),
            too_short: 0.0,
            waiting:   0.0,
            records:   Vec::new(),
        }
    }

    pub fn handle(&mut self, activity: &PerformedActivity) -> ScoringResult<()> {
        let params = &self.pipeline.params;
        let intervals = opening_times(activity, self.facilities, params.day);
        let clipped = clip(activity.arrival, activity.departure, &intervals);
        let penalized = self.pipeline.penalty.applies_to(&activity.activity_type);

        for &(start, end) in &clipped.segments {
            let duration = end - start;
            let accumulated = self.durations.entry(activity.activity_type.clone()).or_insert(0.0);
            let before = *accumulated;
            *accumulated += duration;

            if penalized && duration > 0.0 {
                let improvement = self.pipeline.performance_utility(&activity.activity_type, before + duration)?
                    - self.pipeline.performance_utility(&activity.activity_type, before)?;
                self.records.push(PenaltyRecord { facility: activity.facility, start, end, improvement });
            }
        }

        self.waiting += clipped.waiting;
        if params.minimum_duration >= 0.0 && clipped.performed < params.minimum_duration {
            self.too_short += params.minimum_duration - clipped.performed;
        }
        Ok(())
    }

    /// Accumulated performed time per activity type.
    pub fn durations(&self) -> &BTreeMap<String, f64> {
        &self.durations
    }

    pub fn too_short_duration(&self) -> f64 {
        self.too_short
    }

    pub fn waiting_time(&self) -> f64 {
        self.waiting
    }

    pub fn penalty_records(&self) -> &[PenaltyRecord] {
        &self.records
    }

    pub fn finish(&self) -> ScoringResult<ScoreBreakdown> {
        let params = &self.pipeline.params;
        let mut performance = 0.0;
        for (activity_type, &duration) in &self.durations {
            performance += self.pipeline.performance_utility(activity_type, duration)?;
        }
        let penalties = self.records.iter().map(|r| self.pipeline.penalty.penalty(r)).sum();

        Ok(ScoreBreakdown {
            too_short: params.marginal_utility_of_early_departure * self.too_short,
            waiting: params.marginal_utility_of_waiting * self.waiting,
            performance,
            penalties,
        })
    }

    pub fn reset(&mut self) {
        self.durations.clear();
        self.too_short = 0.0;
        self.waiting = 0.0;
        self.records.clear();
    }
}
