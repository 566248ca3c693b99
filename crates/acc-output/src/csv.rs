//! CSV output backend.
//!
//! Each result goes to its own subdirectory of the output root:
//! `<root>/<activity_type>/accessibilities.csv`.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use csv::Writer;

use acc_grid::AccessibilityResult;

use crate::row::{accessibility_header, accessibility_record};
use crate::writer::AccessibilityWriter;
use crate::{OutputError, OutputResult};

pub const ACCESSIBILITY_FILE: &str = "accessibilities.csv";

/// Writes one CSV table per activity type.
pub struct CsvWriter {
    root:     PathBuf,
    written:  Vec<PathBuf>,
    finished: bool,
}

impl CsvWriter {
    /// Create the output root if needed.
    pub fn new(root: &Path) -> OutputResult<Self> {
        fs::create_dir_all(root)?;
        Ok(Self { root: root.to_path_buf(), written: Vec::new(), finished: false })
    }

    /// Files written so far, in write order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Path the table of `activity_type` is written to.
    pub fn path_for(&self, activity_type: &str) -> OutputResult<PathBuf> {
        let valid = !activity_type.is_empty()
            && activity_type != "."
            && activity_type != ".."
            && !activity_type.contains(['/', '\\']);
        if !valid {
            return Err(OutputError::InvalidActivityType(activity_type.to_owned()));
        }
        Ok(self.root.join(activity_type).join(ACCESSIBILITY_FILE))
    }
}

impl AccessibilityWriter for CsvWriter {
    fn write_result(&mut self, result: &AccessibilityResult) -> OutputResult<()> {
        let path = self.path_for(result.activity_type())?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut writer: Writer<File> = Writer::from_path(&path)?;
        writer.write_record(accessibility_header(result.modes()))?;
        for row in result.rows() {
            writer.write_record(accessibility_record(&row))?;
        }
        writer.flush()?;

        log::info!("wrote {} measuring points to {}", result.len(), path.display());
        self.written.push(path);
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        log::debug!("csv writer finished after {} tables", self.written.len());
        Ok(())
    }
}
