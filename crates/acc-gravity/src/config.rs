//! Typed configuration of the gravity model.
//!
//! Read from the `GravityModel` group:
//!
//! | Key                   | Required | Default  | Meaning                                  |
//! |-----------------------|----------|----------|------------------------------------------|
//! | `zones`               | yes      |          | zones per axis (`n`, giving `n²` zones)  |
//! | `partition`           | yes      |          | only `symmetric`                         |
//! | `betaDistance`        | yes      |          | distance exponent                        |
//! | `betaCapacity`        | yes      |          | capacity exponent                        |
//! | `samplingRatePersons` | no       | `1.0`    | share of persons scored, in `(0, 1]`     |
//! | `samplingTypeShops`   | no       | `all`    | `all`, `random`, or `zone`               |
//! | `samplingNumberShops` | `random` |          | non-candidate shops kept when `random`   |
//! | `seed`                | no       | `4711`   | sampling RNG seed                        |

use std::str::FromStr;

use acc_core::{AccError, AccResult, Config, ConfigGroup};
use acc_spatial::{MAX_ZONES_PER_AXIS, PartitionMode};

use crate::Betas;

pub const CONFIG_GROUP: &str = "GravityModel";

/// Which non-candidate shops enter a person's global utility.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum ShopSampling {
    /// Every shop of the scenario.
    #[default]
    All,
    /// A fixed random subset, drawn once per model.
    Random,
    /// Shops in the person's home zone.
    Zone,
}

impl FromStr for ShopSampling {
    type Err = AccError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all"    => Ok(ShopSampling::All),
            "random" => Ok(ShopSampling::Random),
            "zone"   => Ok(ShopSampling::Zone),
            other    => Err(AccError::Config(format!("unknown samplingTypeShops {other:?}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GravityConfig {
    pub zones:                 usize,
    pub partition:             PartitionMode,
    pub betas:                 Betas,
    pub sampling_rate_persons: f64,
    pub sampling_type_shops:   ShopSampling,
    pub sampling_number_shops: Option<usize>,
    pub seed:                  u64,
}

impl GravityConfig {
    /// Convenience constructor with no subsampling.
    pub fn new(zones: usize, betas: Betas) -> Self {
        Self {
            zones,
            partition:             PartitionMode::Symmetric,
            betas,
            sampling_rate_persons: 1.0,
            sampling_type_shops:   ShopSampling::All,
            sampling_number_shops: None,
            seed:                  4711,
        }
    }

    pub fn from_config(config: &Config) -> AccResult<Self> {
        Self::from_group(config.require_group(CONFIG_GROUP)?)
    }

    /// Parse and validate; every failure is an [`AccError::Config`].
    pub fn from_group(group: &ConfigGroup) -> AccResult<Self> {
        let partition = PartitionMode::parse(group.require("partition")?)?;

        // Written as a float in some configs ("4.0").
        let zones: f64 = group.require_parsed("zones")?;
        if zones < 1.0 || zones.fract() != 0.0 {
            return Err(AccError::Config(format!(
                "param \"zones\" in group {CONFIG_GROUP:?} must be a positive integer, got {zones}"
            )));
        }
        if zones > MAX_ZONES_PER_AXIS as f64 {
            return Err(AccError::Config(format!(
                "param \"zones\" in group {CONFIG_GROUP:?} must be at most {MAX_ZONES_PER_AXIS}, got {zones}"
            )));
        }

        let betas = Betas::new(
            group.require_parsed("betaDistance")?,
            group.require_parsed("betaCapacity")?,
        );

        let sampling_rate_persons: f64 = group.parsed_or("samplingRatePersons", 1.0)?;
        if !(sampling_rate_persons > 0.0 && sampling_rate_persons <= 1.0) {
            return Err(AccError::Config(format!(
                "samplingRatePersons must be in (0, 1], got {sampling_rate_persons}"
            )));
        }

        let sampling_type_shops: ShopSampling = group.parsed_or("samplingTypeShops", ShopSampling::All)?;
        let sampling_number_shops: Option<usize> = group.parse("samplingNumberShops")?;
        if sampling_type_shops == ShopSampling::Random && sampling_number_shops.is_none() {
            return Err(AccError::Config(
                "samplingTypeShops = random requires samplingNumberShops".into(),
            ));
        }

        Ok(Self {
            zones: zones as usize,
            partition,
            betas,
            sampling_rate_persons,
            sampling_type_shops,
            sampling_number_shops,
            seed: group.parsed_or("seed", 4711)?,
        })
    }
}
