//! The `AccessibilityWriter` trait implemented by all backend writers.

use acc_grid::AccessibilityResult;

use crate::OutputResult;

/// Persists finished accessibility results.
///
/// Errors are stored by [`OutputObserver`][crate::OutputObserver] when the
/// writer is driven by a run; call its `take_error` afterwards.
pub trait AccessibilityWriter {
    /// Write one activity type's result.
    fn write_result(&mut self, result: &AccessibilityResult) -> OutputResult<()>;

    /// Flush everything.
    ///
    /// Idempotent; later calls do nothing.
    fn finish(&mut self) -> OutputResult<()>;
}
