//! Accessibility values of one run: `(measuring point, mode) → f64`.
//!
//! [`ResultBuilder`] is append-only; each `(point, mode)` cell may be set
//! once.  [`finish`](ResultBuilder::finish) freezes it into an immutable
//! [`AccessibilityResult`].

use acc_core::{MeasuringPointId, Mode};
use acc_spatial::MeasuringPoint;

use crate::{GridError, GridResult};

/// Values for one activity type over all measuring points.
#[derive(Clone, Debug)]
pub struct AccessibilityResult {
    activity_type: String,
    modes:         Vec<Mode>,
    points:        Vec<MeasuringPoint>,
    /// Row-major: `values[point * modes.len() + slot]`.
    values:        Vec<Option<f64>>,
    density:       Vec<f64>,
}

/// One output row.
#[derive(Copy, Clone, Debug)]
pub struct ResultRow<'a> {
    pub point:              &'a MeasuringPoint,
    /// Per-mode values in [`AccessibilityResult::modes`] order.
    pub values:             &'a [Option<f64>],
    pub population_density: f64,
}

impl AccessibilityResult {
    pub fn activity_type(&self) -> &str {
        &self.activity_type
    }

    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    pub fn points(&self) -> &[MeasuringPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Accessibility at `point` for `mode`; `None` if never computed.
    pub fn get(&self, point: MeasuringPointId, mode: Mode) -> Option<f64> {
        let slot = self.modes.iter().position(|&m| m == mode)?;
        self.values.get(point.index() * self.modes.len() + slot).copied().flatten()
    }

    /// Number of anchor facilities in the cell of `point`.
    pub fn population_density(&self, point: MeasuringPointId) -> Option<f64> {
        self.density.get(point.index()).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = ResultRow<'_>> + '_ {
        let width = self.modes.len();
        self.points.iter().enumerate().map(move |(i, point)| ResultRow {
            point,
            values: &self.values[i * width..(i + 1) * width],
            population_density: self.density[i],
        })
    }
}

// ── ResultBuilder ─────────────────────────────────────────────────────────────

pub struct ResultBuilder {
    activity_type: String,
    modes:         Vec<Mode>,
    points:        Vec<MeasuringPoint>,
    values:        Vec<Option<f64>>,
    density:       Vec<f64>,
}

impl ResultBuilder {
    /// `points` must be indexed by their own ids, as in a `MeasuringGrid`.
    pub fn new(activity_type: impl Into<String>, points: Vec<MeasuringPoint>, modes: Vec<Mode>) -> Self {
        let cells = points.len() * modes.len();
        Self {
            activity_type: activity_type.into(),
            density:       vec![0.0; points.len()],
            values:        vec![None; cells],
            points,
            modes,
        }
    }

    /// Set one value.  Setting the same `(point, mode)` twice is an error.
    pub fn insert(&mut self, point: MeasuringPointId, mode: Mode, value: f64) -> GridResult<()> {
        let slot = self.modes.iter().position(|&m| m == mode).ok_or(GridError::ModeNotEnabled(mode))?;
        if point.index() >= self.points.len() {
            return Err(GridError::UnknownPoint(point));
        }
        let cell = &mut self.values[point.index() * self.modes.len() + slot];
        if cell.is_some() {
            return Err(GridError::DuplicateValue { point, mode });
        }
        *cell = Some(value);
        Ok(())
    }

    /// Replace the whole density column.
    pub fn set_population_density(&mut self, density: Vec<f64>) -> GridResult<()> {
        if density.len() != self.points.len() {
            return Err(acc_core::AccError::DataIntegrity(format!(
                "density column has {} entries for {} measuring points",
                density.len(),
                self.points.len()
            ))
            .into());
        }
        self.density = density;
        Ok(())
    }

    pub fn finish(self) -> AccessibilityResult {
        let missing = self.values.iter().filter(|v| v.is_none()).count();
        if missing > 0 {
            log::debug!("{missing} accessibility cells of {:?} left unset", self.activity_type);
        }
        AccessibilityResult {
            activity_type: self.activity_type,
            modes:         self.modes,
            points:        self.points,
            values:        self.values,
            density:       self.density,
        }
    }
}
