//! `acc-gravity` — distance-decay potential and the retail-siting gravity
//! model.
//!
//! # Crate layout
//!
//! | Module        | Contents                                              |
//! |---------------|-------------------------------------------------------|
//! | [`potential`] | `potential`, `Betas`, `MIN_DISTANCE`, `validate_capacity` |
//! | [`config`]    | `GravityConfig`, `ShopSampling` (`GravityModel` group) |
//! | [`cache`]     | `GlobalUtilityCache`                                  |
//! | [`model`]     | `GravityModel::compute_potential`                     |
//! | [`error`]     | `GravityError`, `GravityResult<T>`                    |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Sums person likelihoods on Rayon's thread pool.        |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! let config = GravityConfig::from_config(&config)?;
//! let mut model = GravityModel::new(config, &network, &population, &facilities, candidates)?;
//! let score = model.compute_potential(&solution)?;
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod potential;

#[cfg(test)]
mod tests;

pub use cache::GlobalUtilityCache;
pub use config::{CONFIG_GROUP, GravityConfig, ShopSampling};
pub use error::{GravityError, GravityResult};
pub use model::{GravityModel, SHOP_TYPE};
pub use potential::{Betas, MIN_DISTANCE, potential, validate_capacity};
