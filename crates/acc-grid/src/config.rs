//! Typed configuration of a grid accessibility run.
//!
//! Read from the `accessibility` group:
//!
//! | Key                     | Default     | Meaning                                          |
//! |-------------------------|-------------|--------------------------------------------------|
//! | `cellSize`              | `100`       | measuring cell edge in metres                    |
//! | `betaCost`              | required    | cost exponent                                    |
//! | `betaCost.<mode>`       | `betaCost`  | per-mode override                                |
//! | `betaCapacity`          | required    | capacity exponent                                |
//! | `modes`                 | `freespeed` | comma-separated modes to compute                 |
//! | `walkSpeedKmh`          | `3`         | teleported walk speed, also used for access legs |
//! | `bikeSpeedKmh`          | `15`        |                                                  |
//! | `ptSpeedKmh`            | `50`        |                                                  |
//! | `beelineDistanceFactor` | `1.3`       | pt beeline detour factor                         |
//! | `activityTypes`         | all         | opportunity types to run                         |
//! | `anchorType`            | `h`         | facilities counted in the density column         |
//! | `boundingBox`           | network     | `min_x,min_y,max_x,max_y` of the grid            |

use std::collections::BTreeMap;

use acc_core::{AccError, AccResult, BoundingBox, Config, ConfigGroup, Mode};
use acc_gravity::Betas;
use acc_spatial::TravelSpeeds;

pub const CONFIG_GROUP: &str = "accessibility";

#[derive(Clone, Debug, PartialEq)]
pub struct AccessibilityConfig {
    pub cell_size:      f64,
    pub betas:          Betas,
    /// Cost exponents that differ from `betas.distance` for one mode.
    pub mode_beta_cost: BTreeMap<Mode, f64>,
    /// Enabled modes in output column order.
    pub modes:          Vec<Mode>,
    pub speeds:         TravelSpeeds,
    /// Empty means every activity type found in the facilities.
    pub activity_types: Vec<String>,
    pub anchor_type:    String,
    pub bounding_box:   Option<BoundingBox>,
}

impl AccessibilityConfig {
    /// Free-speed only, default speeds, all activity types.
    pub fn new(cell_size: f64, betas: Betas) -> Self {
        Self {
            cell_size,
            betas,
            mode_beta_cost: BTreeMap::new(),
            modes:          vec![Mode::FreeSpeed],
            speeds:         TravelSpeeds::default(),
            activity_types: Vec::new(),
            anchor_type:    "h".into(),
            bounding_box:   None,
        }
    }

    /// Replace the enabled modes; duplicates are dropped and the order
    /// normalized to [`Mode::ALL`].
    pub fn with_modes(mut self, modes: &[Mode]) -> Self {
        self.modes = normalize_modes(modes.iter().copied());
        self
    }

    /// Exponents used for `mode`.
    pub fn betas_for(&self, mode: Mode) -> Betas {
        match self.mode_beta_cost.get(&mode) {
            Some(&distance) => Betas::new(distance, self.betas.capacity),
            None => self.betas,
        }
    }

    pub fn from_config(config: &Config) -> AccResult<Self> {
        Self::from_group(config.require_group(CONFIG_GROUP)?)
    }

    /// Parse and validate; every failure is an [`AccError::Config`].
    pub fn from_group(group: &ConfigGroup) -> AccResult<Self> {
        let cell_size: f64 = group.parsed_or("cellSize", 100.0)?;
        if !(cell_size > 0.0) {
            return Err(AccError::Config(format!("cellSize must be positive, got {cell_size}")));
        }

        let betas = Betas::new(group.require_parsed("betaCost")?, group.require_parsed("betaCapacity")?);
        let mut mode_beta_cost = BTreeMap::new();
        for mode in Mode::ALL {
            if let Some(beta) = group.parse::<f64>(&format!("betaCost.{mode}"))? {
                mode_beta_cost.insert(mode, beta);
            }
        }

        let listed = group.list("modes");
        let modes = if listed.is_empty() {
            vec![Mode::FreeSpeed]
        } else {
            let parsed = listed.iter().map(|m| m.parse::<Mode>()).collect::<AccResult<Vec<_>>>()?;
            normalize_modes(parsed)
        };

        let kmh = |key: &str, default: f64| -> AccResult<f64> {
            let v: f64 = group.parsed_or(key, default)?;
            if !(v > 0.0) {
                return Err(AccError::Config(format!("{key} must be positive, got {v}")));
            }
            Ok(v / 3.6)
        };
        let speeds = TravelSpeeds {
            walk_mps:       kmh("walkSpeedKmh", 3.0)?,
            bike_mps:       kmh("bikeSpeedKmh", 15.0)?,
            pt_mps:         kmh("ptSpeedKmh", 50.0)?,
            beeline_factor: group.parsed_or("beelineDistanceFactor", 1.3)?,
        };

        let bounding_box = match group.get("boundingBox") {
            Some(raw) => Some(parse_bounding_box(raw)?),
            None => None,
        };

        Ok(Self {
            cell_size,
            betas,
            mode_beta_cost,
            modes,
            speeds,
            activity_types: group.list("activityTypes"),
            anchor_type: group.get("anchorType").unwrap_or("h").to_owned(),
            bounding_box,
        })
    }
}

fn normalize_modes(modes: impl IntoIterator<Item = Mode>) -> Vec<Mode> {
    let wanted: Vec<Mode> = modes.into_iter().collect();
    Mode::ALL.into_iter().filter(|m| wanted.contains(m)).collect()
}

fn parse_bounding_box(raw: &str) -> AccResult<BoundingBox> {
    let values = raw
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AccError::Config(format!("boundingBox {raw:?}: {e}")))?;
    match values[..] {
        [min_x, min_y, max_x, max_y] if min_x <= max_x && min_y <= max_y => {
            Ok(BoundingBox::new(min_x, min_y, max_x, max_y))
        }
        _ => Err(AccError::Config(format!(
            "boundingBox must be min_x,min_y,max_x,max_y, got {raw:?}"
        ))),
    }
}
