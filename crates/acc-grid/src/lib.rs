//! `acc-grid` — accessibility on a regular grid of measuring points.
//!
//! # Pipeline
//!
//! ```text
//! for activity_type in run types:
//!   ① Opportunities — facilities offering the type, snapped to the network,
//!                     capacity from their option (missing = 1.0).
//!   ② Trees         — per measuring point, one least-cost tree per network
//!                     mode (parallel with the `parallel` feature).
//!   ③ Sum           — Σ potential(cost, capacity) over reachable opportunities.
//!   ④ Result        — values inserted in point order; the anchor density
//!                     column is attached; the observer receives the result.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Processes measuring points on Rayon's thread pool.     |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use acc_grid::{AccessibilityConfig, ActivityTypeRun, GridAccessibilityBuilder, NoopObserver};
//!
//! let config = AccessibilityConfig::from_config(&config)?;
//! let acc = GridAccessibilityBuilder::new(config, &network).build()?;
//! let results = ActivityTypeRun::new(&acc, &facilities).run(&mut NoopObserver)?;
//! ```

pub mod aggregator;
pub mod builder;
pub mod config;
pub mod error;
pub mod observer;
pub mod result;
pub mod run;


pub use aggregator::{GridAccessibility, Opportunity, OpportunitySet};
pub use builder::GridAccessibilityBuilder;
pub use config::{AccessibilityConfig, CONFIG_GROUP};
pub use error::{GridError, GridResult};
pub use observer::{NoopObserver, RunObserver};
pub use result::{AccessibilityResult, ResultBuilder, ResultRow};
pub use run::ActivityTypeRun;
