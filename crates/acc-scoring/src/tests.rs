//! Unit tests for acc-scoring.

use rustc_hash::FxHashMap;

use acc_core::{FacilityId, Point};
use acc_scenario::{Activity, ActivityFacilities, DayType, OpeningTime, Plan};

use crate::{
    ActivityScoring, CharyparNagel, PerformedActivity, ScoringConfig, ScoringError, ScoringParams,
    ScoringPipeline,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const H: f64 = 3600.0;

/// `shop1`: shop open weekdays 09–12 and 14–18.
/// `mall`:  shop open on Saturdays only.
/// `home`:  `h` without opening times.
fn facilities() -> (ActivityFacilities, FacilityId, FacilityId, FacilityId) {
    let mut fac = ActivityFacilities::new();

    let shop1 = fac.create_facility("shop1", Point::new(0.0, 0.0)).unwrap();
    let opt = shop1.create_option("shop");
    opt.add_opening_time(OpeningTime::new(DayType::Wkday, 9.0 * H, 12.0 * H));
    opt.add_opening_time(OpeningTime::new(DayType::Wkday, 14.0 * H, 18.0 * H));
    let shop1 = shop1.id;

    let mall = fac.create_facility("mall", Point::new(10.0, 0.0)).unwrap();
    mall.create_option("shop").add_opening_time(OpeningTime::new(DayType::Sat, 9.0 * H, 20.0 * H));
    let mall = mall.id;

    let home = fac.create_facility("home", Point::new(5.0, 5.0)).unwrap();
    home.create_option("h");
    let home = home.id;

    (fac, shop1, mall, home)
}

fn params() -> ScoringParams {
    ScoringParams::default()
        .with_typical_duration("h", 12.0 * H)
        .with_typical_duration("shop", 1.0 * H)
}

fn pipeline(config: &ScoringConfig) -> ScoringPipeline {
    ScoringPipeline::from_config(config, FxHashMap::default())
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

// ── Opening-time clipping ─────────────────────────────────────────────────────

#[cfg(test)]
mod opening {
    use super::*;
    use crate::{clip, opening_times};

    fn interval(start: f64, end: f64) -> OpeningTime {
        OpeningTime::new(DayType::Wed, start * H, end * H)
    }

    #[test]
    fn inside_one_interval() {
        let c = clip(10.0 * H, 11.0 * H, &[interval(9.0, 18.0)]);
        assert_eq!(c.segments, vec![(10.0 * H, 11.0 * H)]);
        assert_eq!(c.performed, H);
        assert_eq!(c.waiting, 0.0);
    }

    #[test]
    fn early_arrival_waits() {
        let c = clip(8.0 * H, 10.0 * H, &[interval(9.0, 18.0)]);
        assert_eq!(c.segments, vec![(9.0 * H, 10.0 * H)]);
        assert_eq!(c.waiting, H);
    }

    #[test]
    fn lunch_break_splits_the_stay() {
        let c = clip(10.0 * H, 15.0 * H, &[interval(9.0, 12.0), interval(14.0, 18.0)]);
        assert_eq!(c.segments, vec![(10.0 * H, 12.0 * H), (14.0 * H, 15.0 * H)]);
        assert_eq!(c.performed, 3.0 * H);
        assert_eq!(c.waiting, 2.0 * H);
    }

    #[test]
    fn closed_facility_yields_empty_segment() {
        let c = clip(19.0 * H, 20.0 * H, &[interval(9.0, 18.0)]);
        assert_eq!(c.segments, vec![(20.0 * H, 20.0 * H)]);
        assert_eq!(c.performed, 0.0);
        assert_eq!(c.waiting, H);
    }

    #[test]
    fn no_intervals_means_always_open() {
        let c = clip(1.0 * H, 5.0 * H, &[]);
        assert_eq!(c.performed, 4.0 * H);
        assert_eq!(c.waiting, 0.0);
    }

    #[test]
    fn intervals_for_scoring_day() {
        let (fac, shop1, mall, home) = facilities();
        let at = |f: Option<FacilityId>| PerformedActivity::new("shop", f, 0.0, 1.0);

        assert_eq!(opening_times(&at(Some(shop1)), &fac, DayType::Wed).len(), 2);
        assert!(opening_times(&at(Some(mall)), &fac, DayType::Wed).is_empty());
        assert_eq!(opening_times(&at(Some(mall)), &fac, DayType::Sat).len(), 1);
        // Home has no shop option at all.
        assert!(opening_times(&at(Some(home)), &fac, DayType::Wed).is_empty());
        assert!(opening_times(&at(None), &fac, DayType::Wed).is_empty());
    }
}

// ── Performance ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod performance {
    use super::*;
    use crate::{Linear, PerformanceUtility};

    #[test]
    fn zero_utility_duration() {
        assert_close(CharyparNagel::zero_utility_duration(8.0 * H, 1.0), 8.0 * (-1.25f64).exp());
    }

    #[test]
    fn typical_duration_scores_beta_times_typical() {
        let p = ScoringParams::default();
        // ln(8 / t0) = 10 / 8, so utility = 6/h · 8 h · 1.25.
        assert_close(CharyparNagel.utility(&p, 8.0 * H, 8.0 * H), 60.0);
    }

    #[test]
    fn very_short_duration_is_floored_at_zero() {
        let p = ScoringParams::default();
        assert_eq!(CharyparNagel.utility(&p, 8.0 * H, 60.0), 0.0);
    }

    #[test]
    fn non_positive_duration_uses_late_arrival() {
        let p = ScoringParams::default();
        assert_close(CharyparNagel.utility(&p, 8.0 * H, -600.0), 2.0 * (-18.0 / H) * 600.0);
        assert_eq!(CharyparNagel.utility(&p, 8.0 * H, 0.0), 0.0);
    }

    #[test]
    fn linear_ignores_typical_duration() {
        let p = ScoringParams::default();
        assert_close(Linear.utility(&p, 8.0 * H, 2.0 * H), 12.0);
        assert_close(Linear.utility(&p, 1.0 * H, 2.0 * H), 12.0);
    }
}

// ── Penalties ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod penalty {
    use super::*;
    use crate::{FacilityLoad, FacilityLoadPenalty, NoPenalty, PenaltyAdjustment, PenaltyRecord};

    #[test]
    fn visitors_fill_overlapped_bins() {
        let mut load = FacilityLoad::new(2.0);
        load.add_visitor(100.0, 1000.0);
        assert_eq!(load.visitors(0), 1.0);
        assert_eq!(load.visitors(1), 1.0);
        assert_eq!(load.visitors(2), 0.0);
    }

    #[test]
    fn penalty_factor_is_mean_and_capped() {
        let mut load = FacilityLoad::new(2.0);
        load.add_visitor(0.0, 1800.0);
        load.add_visitor(0.0, 1800.0);
        assert_eq!(load.penalty_factor(0.0, 1800.0, 1.0, 1.0), 1.0);
        assert_eq!(load.penalty_factor(0.0, 3600.0, 1.0, 1.0), 0.5);

        let mut crowded = FacilityLoad::new(1.0);
        crowded.add_visitor(0.0, 900.0);
        crowded.add_visitor(0.0, 900.0);
        assert_eq!(crowded.penalty_factor(0.0, 900.0, 1.0, 1.0), 1.0);
        assert_eq!(crowded.penalty_factor(900.0, 900.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn facility_load_applies_to_shop_and_leisure() {
        let p = FacilityLoadPenalty::default();
        assert!(p.applies_to("shop"));
        assert!(p.applies_to("shop_grocery"));
        assert!(p.applies_to("leisure"));
        assert!(!p.applies_to("work"));
        assert!(!NoPenalty.applies_to("shop"));
    }

    #[test]
    fn unknown_facility_is_not_penalized() {
        let p = FacilityLoadPenalty::new(FxHashMap::default(), 1.0, 1.0);
        let record = PenaltyRecord { facility: Some(FacilityId(3)), start: 0.0, end: 900.0, improvement: 5.0 };
        assert_eq!(p.penalty(&record), 0.0);
        assert_eq!(NoPenalty.penalty(&record), 0.0);
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod pipeline {
    use super::*;
    use crate::{DAY_END, FacilityLoad, PenaltyKind, PerformanceUtility};

    /// home until 08:00, shop1 until 10:00, home for the rest of the day.
    fn plan(shop1: FacilityId, home: FacilityId) -> Plan {
        let mut h1 = Activity::new("h", Point::new(5.0, 5.0)).at_facility(home);
        h1.end_time = Some(8.0 * H);
        let mut s = Activity::new("shop", Point::new(0.0, 0.0)).at_facility(shop1);
        s.end_time = Some(10.0 * H);
        let h2 = Activity::new("h", Point::new(5.0, 5.0)).at_facility(home);
        Plan::new(vec![h1, s, h2])
    }

    #[test]
    fn plan_activities_chain_end_times() {
        let (_, shop1, _, home) = facilities();
        let acts = PerformedActivity::from_plan(&plan(shop1, home));
        let spans: Vec<(f64, f64)> = acts.iter().map(|a| (a.arrival, a.departure)).collect();
        assert_eq!(spans, vec![(0.0, 8.0 * H), (8.0 * H, 10.0 * H), (10.0 * H, DAY_END)]);
    }

    #[test]
    fn accumulates_per_type_and_waiting() {
        let (fac, shop1, _, home) = facilities();
        let config = ScoringConfig { params: params(), ..ScoringConfig::default() };
        let pipe = pipeline(&config);

        let mut scoring = ActivityScoring::new(&pipe, &fac);
        for act in PerformedActivity::from_plan(&plan(shop1, home)) {
            scoring.handle(&act).unwrap();
        }
        assert_eq!(scoring.durations()["h"], 22.0 * H);
        assert_eq!(scoring.durations()["shop"], 1.0 * H);
        // Arrived at 08:00, shop opens at 09:00.
        assert_eq!(scoring.waiting_time(), H);
        assert_eq!(scoring.too_short_duration(), 0.0);

        let breakdown = scoring.finish().unwrap();
        let p = params();
        let expected = CharyparNagel.utility(&p, 12.0 * H, 22.0 * H) + CharyparNagel.utility(&p, H, H);
        assert_close(breakdown.performance, expected);
        assert_eq!(breakdown.penalties, 0.0);
        assert_close(breakdown.total(), expected);

        scoring.reset();
        assert!(scoring.durations().is_empty());
        assert_eq!(scoring.waiting_time(), 0.0);
    }

    #[test]
    fn waiting_and_too_short_are_scored() {
        let (fac, shop1, _, _) = facilities();
        let mut p = params();
        p.marginal_utility_of_waiting = -6.0 / H;
        p.marginal_utility_of_early_departure = -18.0 / H;
        let config = ScoringConfig { params: p, ..ScoringConfig::default() };

        // 08:45 to 09:15: 15 min waiting, 15 min performed.
        let visit = PerformedActivity::new("shop", Some(shop1), 8.75 * H, 9.25 * H);
        let b = pipeline(&config).score(&[visit], &fac).unwrap();
        assert_close(b.waiting, -6.0 / H * 900.0);
        assert_close(b.too_short, -18.0 / H * 900.0);
    }

    #[test]
    fn missing_typical_duration() {
        let (fac, _, _, _) = facilities();
        let pipe = pipeline(&ScoringConfig::default());
        let err = pipe
            .score(&[PerformedActivity::new("work", None, 0.0, H)], &fac)
            .unwrap_err();
        assert!(matches!(err, ScoringError::MissingTypicalDuration(t) if t == "work"));
    }

    #[test]
    fn crowded_shop_loses_its_improvement() {
        let (fac, shop1, _, home) = facilities();
        let mut load = FacilityLoad::new(1.0);
        load.add_visitor(9.0 * H, 10.0 * H);
        load.add_visitor(9.0 * H, 10.0 * H);
        let mut loads = FxHashMap::default();
        loads.insert(shop1, load);

        let config = ScoringConfig {
            params: params(),
            penalty: PenaltyKind::FacilityLoad,
            restraint_factor: 1.0,
            restraint_exponent: 1.0,
            ..ScoringConfig::default()
        };
        let pipe = ScoringPipeline::from_config(&config, loads);

        let mut scoring = ActivityScoring::new(&pipe, &fac);
        for act in PerformedActivity::from_plan(&plan(shop1, home)) {
            scoring.handle(&act).unwrap();
        }
        // Only the 09:00–10:00 segment has positive duration.
        assert_eq!(scoring.penalty_records().len(), 1);

        let b = scoring.finish().unwrap();
        // One typical hour of shopping: 6/h · 1 h · ln(1 / e^-10).
        assert_close(b.penalties, 60.0);
        assert_close(b.total(), b.performance - 60.0);
    }

    #[test]
    fn linear_performance_from_config() {
        use acc_core::ConfigGroup;

        let group = ConfigGroup::new("planCalcScore")
            .with("performanceFunction", "linear")
            .with("typicalDuration.shop", "01:00:00");
        let config = ScoringConfig::from_group(&group).unwrap();
        let visit = PerformedActivity::new("shop", None, 0.0, 2.0 * H);
        let (fac, _, _, _) = facilities();
        let b = pipeline(&config).score(&[visit], &fac).unwrap();
        assert_close(b.performance, 12.0);
    }
}

// ── Config ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use acc_core::{AccError, ConfigGroup};

    use super::*;
    use crate::{MINIMUM_DURATION, PenaltyKind, PerformanceKind};

    #[test]
    fn defaults() {
        let c = ScoringConfig::from_group(&ConfigGroup::new("planCalcScore")).unwrap();
        assert_eq!(c.performance, PerformanceKind::CharyparNagel);
        assert_eq!(c.penalty, PenaltyKind::None);
        assert_eq!(c.params.day, DayType::Wed);
        assert_eq!(c.params.minimum_duration, MINIMUM_DURATION);
        assert_close(c.params.marginal_utility_of_performing, 6.0 / H);
        assert_close(c.params.marginal_utility_of_late_arrival, -18.0 / H);
    }

    #[test]
    fn parses_keys() {
        let group = ConfigGroup::new("planCalcScore")
            .with("performing", 3.6)
            .with("penaltyFunction", "facilityLoad")
            .with("restraintFcnFactor", 0.5)
            .with("scoringDay", "SAT")
            .with("minimumDuration", "00:10")
            .with("typicalDuration.h", "12:00:00")
            .with("typicalDuration.shop", 1800);
        let c = ScoringConfig::from_group(&group).unwrap();
        assert_close(c.params.marginal_utility_of_performing, 0.001);
        assert_eq!(c.penalty, PenaltyKind::FacilityLoad);
        assert_eq!(c.restraint_factor, 0.5);
        assert_eq!(c.params.day, DayType::Sat);
        assert_eq!(c.params.minimum_duration, 600.0);
        assert_eq!(c.params.typical_duration("h"), Some(12.0 * H));
        assert_eq!(c.params.typical_duration("shop"), Some(1800.0));
        assert_eq!(c.params.typical_duration("work"), None);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        for (key, value) in [
            ("performanceFunction", "cobbDouglas"),
            ("penaltyFunction", "crowding"),
            ("scoringDay", "someday"),
            ("typicalDuration.shop", "0"),
            ("priority", "-1"),
        ] {
            let group = ConfigGroup::new("planCalcScore").with(key, value);
            let err = ScoringConfig::from_group(&group).unwrap_err();
            assert!(matches!(err, AccError::Config(_)), "{key}: {err}");
        }
    }
}
