//! `acc-output` — result writers for the rust_access toolkit.
//!
//! | Module       | Files created                                                |
//! |--------------|--------------------------------------------------------------|
//! | [`csv`]      | `<root>/<activity_type>/accessibilities.csv` per result      |
//! | [`counts`]   | counts comparison table and per-hour error statistics        |
//!
//! Accessibility writers implement [`AccessibilityWriter`] and are driven
//! by [`OutputObserver`], which implements `acc_grid::RunObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use acc_output::{CsvWriter, OutputObserver};
//!
//! let mut obs = OutputObserver::new(CsvWriter::new(Path::new("./output"))?);
//! ActivityTypeRun::new(&acc, &facilities).run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     log::error!("output error: {e}");
//! }
//! ```

pub mod counts;
pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use crate::csv::{ACCESSIBILITY_FILE, CsvWriter};
pub use counts::{
    ComparisonErrorStats, Count, CountSimComparison, CountsComparison, DistanceFilter, LinkVolumes,
    load_counts_csv, load_counts_reader, write_comparison_csv, write_error_stats_csv,
};
pub use error::{OutputError, OutputResult};
pub use observer::OutputObserver;
pub use writer::AccessibilityWriter;
