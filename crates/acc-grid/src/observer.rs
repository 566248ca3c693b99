//! Run observer trait for progress reporting and result collection.

use crate::AccessibilityResult;

/// Callbacks invoked by [`ActivityTypeRun::run`][crate::ActivityTypeRun::run]
/// around each activity type.
///
/// All methods have default no-op implementations.  A result is only handed
/// to [`on_result`](Self::on_result) once it is complete; a failing type
/// aborts the run before anything of it is reported.
pub trait RunObserver {
    /// Called before the accessibility of `activity_type` is computed.
    fn on_type_start(&mut self, _activity_type: &str, _opportunities: usize) {}

    /// Called with each finished result.
    fn on_result(&mut self, _result: &AccessibilityResult) {}

    /// Called once after the last activity type.
    fn on_run_end(&mut self, _types: usize) {}
}

/// A [`RunObserver`] that does nothing.
pub struct NoopObserver;

impl RunObserver for NoopObserver {}
