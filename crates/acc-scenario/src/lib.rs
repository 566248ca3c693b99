//! `acc-scenario` — facilities, population, and their loaders.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`facility`]   | `Facility`, `ActivityOption`, `OpeningTime`, `DayType`, `ActivityFacilities` |
//! | [`population`] | `Person`, `Plan`, `Activity`, `Population`                 |
//! | [`reader`]     | facilities XML state machine + `quick-xml` driver          |
//! | [`loader`]     | `load_population_csv`, `load_population_reader`            |
//! | [`error`]      | `ScenarioError`, `ScenarioResult<T>`                       |
//!
//! Everything here is built once while a scenario loads and is read-only
//! for the accessibility and gravity computations.

pub mod error;
pub mod facility;
pub mod loader;
pub mod population;
pub mod reader;

#[cfg(test)]
mod tests;

pub use error::{ScenarioError, ScenarioResult};
pub use facility::{ActivityFacilities, ActivityOption, DayType, Facility, OpeningTime};
pub use loader::{load_population_csv, load_population_reader};
pub use population::{Activity, Person, Plan, Population};
pub use reader::{FacilitiesParser, ParserState, read_facilities, read_facilities_file};
