//! `acc-scoring` — activity scoring as a fixed pipeline of strategies.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`config`]      | `ScoringConfig`, `ScoringParams`, strategy kinds          |
//! | [`opening`]     | opening-time clipping                                     |
//! | [`performance`] | `PerformanceUtility` trait, `CharyparNagel`, `Linear`     |
//! | [`penalty`]     | `PenaltyAdjustment` trait, `NoPenalty`, facility load     |
//! | [`pipeline`]    | `ScoringPipeline`, `ActivityScoring`, `ScoreBreakdown`    |
//! | [`error`]       | `ScoringError`, `ScoringResult<T>`                        |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! let config = ScoringConfig::from_config(&config)?;
//! let pipeline = ScoringPipeline::from_config(&config, FxHashMap::default());
//! let score = pipeline.score_plan(plan, &facilities)?.total();
//! ```

pub mod config;
pub mod error;
pub mod opening;
pub mod penalty;
pub mod performance;
pub mod pipeline;

#[cfg(test)]
mod tests;

pub use config::{CONFIG_GROUP, MINIMUM_DURATION, PenaltyKind, PerformanceKind, ScoringConfig, ScoringParams};
pub use error::{ScoringError, ScoringResult};
pub use opening::{Clipped, clip, opening_times};
pub use penalty::{FacilityLoad, FacilityLoadPenalty, LOAD_BIN_SECONDS, NoPenalty, PenaltyAdjustment, PenaltyRecord};
pub use performance::{CharyparNagel, Linear, PerformanceUtility};
pub use pipeline::{ActivityScoring, DAY_END, PerformedActivity, ScoreBreakdown, ScoringPipeline};
