//! `acc-core` — foundational types for the `rust_access` toolkit.
//!
//! This crate is a dependency of every other `acc-*` crate.  It has no
//! `acc-*` dependencies of its own.
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `PersonId`, `FacilityId`, `NodeId`, `LinkId`, `ZoneId`, `MeasuringPointId` |
//! | [`geo`]         | `Point`, `BoundingBox`                                    |
//! | [`mode`]        | `Mode` enum (free speed, car, walk, bike, pt)             |
//! | [`time`]        | `parse_time`, `format_time` (seconds since midnight)      |
//! | [`config`]      | `Config`, `ConfigGroup` (flat key/value parameters)       |
//! | [`rng`]         | `SamplingRng` (seeded subsampling)                        |
//! | [`error`]       | `AccError`, `AccResult`                                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, points and modes.   |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod mode;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{Config, ConfigGroup};
pub use error::{AccError, AccResult};
pub use geo::{BoundingBox, Point};
pub use ids::{FacilityId, LinkId, MeasuringPointId, NodeId, PersonId, ZoneId};
pub use mode::Mode;
pub use rng::SamplingRng;
pub use time::{format_time, parse_time};
