//! Per-person global utility, memoized per candidate layout.
//!
//! Entries are keyed by `(PersonId, layout version)`.  Syncing to a layout
//! that differs from the last one bumps the version and drops every entry,
//! so a score is never computed against a denominator of an older layout.

use rustc_hash::FxHashMap;

use acc_core::{LinkId, PersonId};

#[derive(Debug, Default)]
pub struct GlobalUtilityCache {
    version: u64,
    layout:  Option<Vec<LinkId>>,
    values:  FxHashMap<(PersonId, u64), f64>,
}

impl GlobalUtilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current layout version.  Starts at 0 and increases on every change.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Make `layout` the current one.  Returns `true` if it differed from
    /// the previous layout and the cache was cleared.
    pub fn sync_layout(&mut self, layout: &[LinkId]) -> bool {
        if self.layout.as_deref() == Some(layout) {
            return false;
        }
        self.layout = Some(layout.to_vec());
        self.invalidate();
        true
    }

    /// Drop every entry and start a new version.
    pub fn invalidate(&mut self) {
        self.version += 1;
        self.values.clear();
    }

    pub fn get(&self, person: PersonId) -> Option<f64> {
        self.values.get(&(person, self.version)).copied()
    }

    pub fn insert(&mut self, person: PersonId, value: f64) {
        self.values.insert((person, self.version), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
