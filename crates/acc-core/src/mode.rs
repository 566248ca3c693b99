//! Modes for which accessibility can be computed.

use std::str::FromStr;

use crate::AccError;

/// A travel mode used to derive the cost between a measuring point and an
/// opportunity.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Car on an uncongested network (link length / free speed).
    FreeSpeed,
    /// Car with congested link travel times where available.
    Car,
    Walk,
    Bike,
    /// Public transport, teleported along the beeline.
    Pt,
}

impl Mode {
    /// All modes in output column order.
    pub const ALL: [Mode; 5] = [Mode::FreeSpeed, Mode::Car, Mode::Bike, Mode::Walk, Mode::Pt];

    /// Label used in config values and output column names.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::FreeSpeed => "freespeed",
            Mode::Car       => "car",
            Mode::Walk      => "walk",
            Mode::Bike      => "bike",
            Mode::Pt        => "pt",
        }
    }

    /// `true` for modes whose cost comes from a least-cost path on the
    /// network rather than from the beeline.
    #[inline]
    pub fn is_network_mode(self) -> bool {
        !matches!(self, Mode::Pt)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = AccError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "freespeed" | "free_speed" => Ok(Mode::FreeSpeed),
            "car"  => Ok(Mode::Car),
            "walk" => Ok(Mode::Walk),
            "bike" => Ok(Mode::Bike),
            "pt"   => Ok(Mode::Pt),
            other  => Err(AccError::Config(format!("unknown mode {other:?}"))),
        }
    }
}
