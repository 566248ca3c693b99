//! Scoring parameters and strategy selection.
//!
//! Read from the `planCalcScore` group.  Marginal utilities are given in
//! utils per hour and stored per second.
//!
//! | Key                       | Default          | Meaning                                 |
//! |---------------------------|------------------|-----------------------------------------|
//! | `performing`              | `6`              | β_perf                                  |
//! | `waiting`                 | `0`              | β_wait                                  |
//! | `lateArrival`             | `-18`            | β_late                                  |
//! | `earlyDeparture`          | `0`              | β_early, applied to too-short time      |
//! | `priority`                | `1`              | priority in the zero-utility duration   |
//! | `minimumDuration`         | `00:30:00`       | below this an activity is too short     |
//! | `scoringDay`              | `wed`            | day whose opening times apply           |
//! | `typicalDuration.<type>`  |                  | typical duration of `<type>`            |
//! | `performanceFunction`     | `charyparNagel`  | `charyparNagel` or `linear`             |
//! | `penaltyFunction`         | `none`           | `none` or `facilityLoad`                |
//! | `restraintFcnFactor`      | `0`              | facility-load penalty factor            |
//! | `restraintFcnExp`         | `0`              | facility-load penalty exponent          |

use std::collections::BTreeMap;
use std::str::FromStr;

use acc_core::{AccError, AccResult, Config, ConfigGroup, parse_time};
use acc_scenario::DayType;

pub const CONFIG_GROUP: &str = "planCalcScore";

/// Shortest activity that is not penalized as too short, in seconds.
pub const MINIMUM_DURATION: f64 = 0.5 * 3600.0;

const TYPICAL_DURATION_PREFIX: &str = "typicalDuration.";

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum PerformanceKind {
    #[default]
    CharyparNagel,
    Linear,
}

impl FromStr for PerformanceKind {
    type Err = AccError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "charyparNagel" => Ok(PerformanceKind::CharyparNagel),
            "linear"        => Ok(PerformanceKind::Linear),
            other           => Err(AccError::Config(format!("unknown performanceFunction {other:?}"))),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum PenaltyKind {
    #[default]
    None,
    FacilityLoad,
}

impl FromStr for PenaltyKind {
    type Err = AccError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none"         => Ok(PenaltyKind::None),
            "facilityLoad" => Ok(PenaltyKind::FacilityLoad),
            other          => Err(AccError::Config(format!("unknown penaltyFunction {other:?}"))),
        }
    }
}

/// Marginal utilities per second and per-type typical durations.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoringParams {
    pub marginal_utility_of_performing:      f64,
    pub marginal_utility_of_waiting:         f64,
    pub marginal_utility_of_late_arrival:    f64,
    pub marginal_utility_of_early_departure: f64,
    pub priority:          f64,
    pub minimum_duration:  f64,
    pub day:               DayType,
    pub typical_durations: BTreeMap<String, f64>,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            marginal_utility_of_performing:      6.0 / 3600.0,
            marginal_utility_of_waiting:         0.0,
            marginal_utility_of_late_arrival:    -18.0 / 3600.0,
            marginal_utility_of_early_departure: 0.0,
            priority:          1.0,
            minimum_duration:  MINIMUM_DURATION,
            day:               DayType::Wed,
            typical_durations: BTreeMap::new(),
        }
    }
}

impl ScoringParams {
    pub fn with_typical_duration(mut self, activity_type: impl Into<String>, seconds: f64) -> Self {
        self.typical_durations.insert(activity_type.into(), seconds);
        self
    }

    pub fn typical_duration(&self, activity_type: &str) -> Option<f64> {
        self.typical_durations.get(activity_type).copied()
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct ScoringConfig {
    pub params:             ScoringParams,
    pub performance:        PerformanceKind,
    pub penalty:            PenaltyKind,
    pub restraint_factor:   f64,
    pub restraint_exponent: f64,
}

impl ScoringConfig {
    pub fn from_config(config: &Config) -> AccResult<Self> {
        Self::from_group(config.require_group(CONFIG_GROUP)?)
    }

    pub fn from_group(group: &ConfigGroup) -> AccResult<Self> {
        let per_hour = |key: &str, default: f64| -> AccResult<f64> { Ok(group.parsed_or(key, default)? / 3600.0) };

        let priority: f64 = group.parsed_or("priority", 1.0)?;
        if !(priority > 0.0) {
            return Err(AccError::Config(format!("priority must be positive, got {priority}")));
        }

        let minimum_duration = match group.get("minimumDuration") {
            Some(raw) => config_time("minimumDuration", raw)?,
            None => MINIMUM_DURATION,
        };

        let day = match group.get("scoringDay") {
            Some(raw) => DayType::parse(raw).map_err(|e| AccError::Config(e.to_string()))?,
            None => DayType::Wed,
        };

        let mut typical_durations = BTreeMap::new();
        for (key, raw) in group.iter() {
            if let Some(activity_type) = key.strip_prefix(TYPICAL_DURATION_PREFIX) {
                let seconds = config_time(key, raw)?;
                if !(seconds > 0.0) {
                    return Err(AccError::Config(format!("{key} must be positive, got {raw:?}")));
                }
                typical_durations.insert(activity_type.to_owned(), seconds);
            }
        }

        let params = ScoringParams {
            marginal_utility_of_performing:      per_hour("performing", 6.0)?,
            marginal_utility_of_waiting:         per_hour("waiting", 0.0)?,
            marginal_utility_of_late_arrival:    per_hour("lateArrival", -18.0)?,
            marginal_utility_of_early_departure: per_hour("earlyDeparture", 0.0)?,
            priority,
            minimum_duration,
            day,
            typical_durations,
        };

        Ok(Self {
            params,
            performance:        group.parsed_or("performanceFunction", PerformanceKind::CharyparNagel)?,
            penalty:            group.parsed_or("penaltyFunction", PenaltyKind::None)?,
            restraint_factor:   group.parsed_or("restraintFcnFactor", 0.0)?,
            restraint_exponent: group.parsed_or("restraintFcnExp", 0.0)?,
        })
    }
}

fn config_time(key: &str, raw: &str) -> AccResult<f64> {
    parse_time(raw).map_err(|e| AccError::Config(format!("{key}: {e}")))
}
