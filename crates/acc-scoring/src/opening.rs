//! Clipping an activity's stay to facility opening times.
//!
//! For each opening interval `[open, close]` the performed segment is
//! `[max(arrival, open), min(departure, close)]`; an interval that does not
//! overlap the stay at all yields an empty segment at `departure`.  Whatever
//! part of the stay is not covered by a segment is waiting time.

use acc_scenario::{ActivityFacilities, DayType, OpeningTime};

use crate::PerformedActivity;

/// Performed segments of one activity.
#[derive(Clone, Debug, PartialEq)]
pub struct Clipped {
    /// `(start, end)` per opening interval, in interval order.
    pub segments:  Vec<(f64, f64)>,
    /// Sum of segment durations.
    pub performed: f64,
    /// `(departure − arrival) − performed`.
    pub waiting:   f64,
}

/// Clip `[arrival, departure]` to `intervals`.  An empty slice means the
/// facility is always open.
pub fn clip(arrival: f64, departure: f64, intervals: &[OpeningTime]) -> Clipped {
    if intervals.is_empty() {
        let performed = departure - arrival;
        return Clipped { segments: vec![(arrival, departure)], performed, waiting: 0.0 };
    }

    let mut segments = Vec::with_capacity(intervals.len());
    let mut performed = 0.0;
    for interval in intervals {
        let (open, close) = (interval.start, interval.end);
        let mut start = arrival;
        let mut end = departure;

        if open >= 0.0 && arrival < open {
            start = open;
        }
        if close >= 0.0 && close < departure {
            end = close;
        }
        if open >= 0.0 && close >= 0.0 && (open > departure || close < arrival) {
            start = departure;
            end = departure;
        }

        performed += end - start;
        segments.push((start, end));
    }

    Clipped { segments, performed, waiting: (departure - arrival) - performed }
}

/// Opening intervals that apply to `activity` on `day`.
///
/// No facility, no option for the activity type, or an option without
/// intervals on that day all mean "always open".
pub fn opening_times(activity: &PerformedActivity, facilities: &ActivityFacilities, day: DayType) -> Vec<OpeningTime> {
    activity
        .facility
        .and_then(|f| facilities.get(f).option(&activity.activity_type))
        .map(|option| option.opening_times_on(day))
        .unwrap_or_default()
}
