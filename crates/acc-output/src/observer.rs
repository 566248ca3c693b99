//! `OutputObserver<W>` — bridges `RunObserver` to an `AccessibilityWriter`.

use acc_grid::{AccessibilityResult, RunObserver};

use crate::writer::AccessibilityWriter;
use crate::{OutputError, OutputResult};

/// A [`RunObserver`] that hands every finished result to a writer.
///
/// Errors from the writer are stored internally because `RunObserver`
/// methods have no return value.  After the run returns, check for errors
/// with [`take_error`][Self::take_error].
pub struct OutputObserver<W: AccessibilityWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: AccessibilityWriter> OutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after the run returns.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            log::error!("accessibility output failed: {e}");
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: AccessibilityWriter> RunObserver for OutputObserver<W> {
    fn on_result(&mut self, result: &AccessibilityResult) {
        // Nothing more is written once a write has failed.
        if self.last_error.is_some() {
            return;
        }
        let result = self.writer.write_result(result);
        self.store_err(result);
    }

    fn on_run_end(&mut self, _types: usize) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
