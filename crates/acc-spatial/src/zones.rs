//! Square zone partitions of a padded bounding box.
//!
//! # Layout
//!
//! An order-`n` partition cuts the box into `n` equal columns and `n` equal
//! rows.  Zone `i * n + j` is column `i` (x) and row `j` (y):
//!
//! ```text
//!   y ▲
//!     │  1 │ 3
//!     │ ───┼───      n = 2
//!     │  0 │ 2
//!     └────────▶ x
//! ```
//!
//! # Boundaries
//!
//! Zones are half-open `[x1, x2) × [y1, y2)`, except that the last column
//! and the last row are closed on their upper bound, so every point of the
//! box, corners included, falls in exactly one zone.  Points outside the box
//! fall in none.

use rstar::RTree;
use rstar::primitives::GeomWithData;

use acc_core::{AccError, AccResult, BoundingBox, FacilityId, PersonId, Point, ZoneId};
use acc_scenario::{ActivityFacilities, Population};

/// Margin added on every side of the extent of the input points.
pub const ZONE_PADDING: f64 = 1.0;

/// Largest partition order; `n²` zone ids must fit a `u32`.
pub const MAX_ZONES_PER_AXIS: usize = u16::MAX as usize;

/// R-tree entry: a coordinate tagged with the entity it belongs to.
pub type Located<T> = GeomWithData<[f64; 2], T>;

// ── PartitionMode ─────────────────────────────────────────────────────────────

/// How the box is divided.  Only equal divisions on both axes exist.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum PartitionMode {
    #[default]
    Symmetric,
}

impl PartitionMode {
    pub fn parse(s: &str) -> AccResult<PartitionMode> {
        match s.trim() {
            "symmetric" => Ok(PartitionMode::Symmetric),
            other => Err(AccError::Config(format!(
                "partition mode {other:?} is not supported; use \"symmetric\""
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PartitionMode::Symmetric => "symmetric",
        }
    }
}

// ── Zone ──────────────────────────────────────────────────────────────────────

/// One rectangle of a [`ZoneGrid`] plus the persons and shops binned into it.
#[derive(Debug)]
pub struct Zone {
    pub id: ZoneId,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    closed_x: bool,
    closed_y: bool,
    pub(crate) persons: RTree<Located<PersonId>>,
    pub(crate) shops:   RTree<Located<FacilityId>>,
}

impl Zone {
    /// Boundary-rule membership test.  Agrees with [`ZoneGrid::zone_of`].
    pub fn contains(&self, p: Point) -> bool {
        let in_x = p.x >= self.x1 && (p.x < self.x2 || (self.closed_x && p.x == self.x2));
        let in_y = p.y >= self.y1 && (p.y < self.y2 || (self.closed_y && p.y == self.y2));
        in_x && in_y
    }

    pub fn centre(&self) -> Point {
        Point::new((self.x1 + self.x2) * 0.5, (self.y1 + self.y2) * 0.5)
    }

    pub fn person_count(&self) -> usize {
        self.persons.size()
    }

    pub fn shop_count(&self) -> usize {
        self.shops.size()
    }
}

// ── ZoneGrid ──────────────────────────────────────────────────────────────────

/// The `n²` zones of one partition.
#[derive(Debug)]
pub struct ZoneGrid {
    bbox:   BoundingBox,
    n:      usize,
    /// `n + 1` column edges; `xs[n] == bbox.max_x`.
    xs:     Vec<f64>,
    /// `n + 1` row edges; `ys[n] == bbox.max_y`.
    ys:     Vec<f64>,
    pub(crate) zones: Vec<Zone>,
}

impl ZoneGrid {
    fn new(bbox: BoundingBox, n: usize) -> Self {
        let xs = axis_edges(bbox.min_x, bbox.max_x, n);
        let ys = axis_edges(bbox.min_y, bbox.max_y, n);
        let mut zones = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                zones.push(Zone {
                    id:       ZoneId((i * n + j) as u32),
                    x1:       xs[i],
                    y1:       ys[j],
                    x2:       xs[i + 1],
                    y2:       ys[j + 1],
                    closed_x: i + 1 == n,
                    closed_y: j + 1 == n,
                    persons:  RTree::new(),
                    shops:    RTree::new(),
                });
            }
        }
        Self { bbox, n, xs, ys, zones }
    }

    /// Partition order (zones per axis).
    pub fn order(&self) -> usize {
        self.n
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// The padded box the zones tile.
    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(id.index())
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Zone containing `p`, in O(1).
    pub fn zone_of(&self, p: Point) -> Option<ZoneId> {
        if !self.bbox.contains(p) {
            return None;
        }
        let i = axis_cell(&self.xs, p.x);
        let j = axis_cell(&self.ys, p.y);
        Some(ZoneId((i * self.n + j) as u32))
    }

    /// Zones whose rectangle intersects the square of half-side `radius`
    /// around `p`.
    pub fn zones_near(&self, p: Point, radius: f64) -> Vec<ZoneId> {
        let lo_x = axis_cell(&self.xs, p.x - radius);
        let hi_x = axis_cell(&self.xs, p.x + radius);
        let lo_y = axis_cell(&self.ys, p.y - radius);
        let hi_y = axis_cell(&self.ys, p.y + radius);
        let mut out = Vec::with_capacity((hi_x - lo_x + 1) * (hi_y - lo_y + 1));
        for i in lo_x..=hi_x {
            for j in lo_y..=hi_y {
                out.push(ZoneId((i * self.n + j) as u32));
            }
        }
        out
    }
}

/// `n + 1` equally spaced edges from `min` to `max`, the last one exactly
/// `max`.
fn axis_edges(min: f64, max: f64, n: usize) -> Vec<f64> {
    let step = (max - min) / n as f64;
    let mut edges: Vec<f64> = (0..n).map(|k| min + k as f64 * step).collect();
    edges.push(max);
    edges
}

/// Cell `k` with `edges[k] <= v < edges[k + 1]`, clamped into `0..n` so
/// that values beyond either end land in the first or last cell.
///
/// The direct formula gives the starting guess; it can be one cell off
/// on an edge, so it is corrected against the stored edges.
#[inline]
fn axis_cell(edges: &[f64], v: f64) -> usize {
    let n = edges.len() - 1;
    let (min, max) = (edges[0], edges[n]);
    let step = (max - min) / n as f64;
    let mut k = if step > 0.0 && v > min {
        (((v - min) / step).floor() as usize).min(n - 1)
    } else {
        0
    };
    while k > 0 && v < edges[k] {
        k -= 1;
    }
    while k + 1 < n && v >= edges[k + 1] {
        k += 1;
    }
    k
}

// ── ZonePartitioner ───────────────────────────────────────────────────────────

/// Builds [`ZoneGrid`]s of a fixed order.
#[derive(Copy, Clone, Debug)]
pub struct ZonePartitioner {
    n:    usize,
    mode: PartitionMode,
}

impl ZonePartitioner {
    /// Fails with [`AccError::Config`] for `n == 0` or `n` above
    /// [`MAX_ZONES_PER_AXIS`].
    pub fn new(n: usize, mode: PartitionMode) -> AccResult<Self> {
        if n == 0 {
            return Err(AccError::Config("number of zones per axis must be at least 1".into()));
        }
        if n > MAX_ZONES_PER_AXIS {
            return Err(AccError::Config(format!(
                "number of zones per axis must be at most {MAX_ZONES_PER_AXIS}, got {n}"
            )));
        }
        Ok(Self { n, mode })
    }

    pub fn order(&self) -> usize {
        self.n
    }

    pub fn mode(&self) -> PartitionMode {
        self.mode
    }

    /// Partition `extent` padded by [`ZONE_PADDING`].
    pub fn partition(&self, extent: BoundingBox) -> ZoneGrid {
        let grid = ZoneGrid::new(extent.padded(ZONE_PADDING), self.n);
        log::debug!(
            "partitioned {} into {}x{} {} zones",
            grid.bbox,
            self.n,
            self.n,
            self.mode.as_str()
        );
        grid
    }

    /// Partition the extent of every person's home and every facility
    /// offering `opportunity_type`.
    pub fn from_scenario(
        &self,
        population: &Population,
        facilities: &ActivityFacilities,
        opportunity_type: &str,
    ) -> AccResult<ZoneGrid> {
        let homes = population.iter().filter_map(|p| p.home(facilities));
        let shops = facilities.with_activity(opportunity_type).map(|f| f.coord);
        let extent = BoundingBox::from_points(homes.chain(shops)).ok_or_else(|| {
            AccError::DataIntegrity("no person or facility coordinates to partition".into())
        })?;
        Ok(self.partition(extent))
    }

    /// Partition the extent of all facilities.
    pub fn from_facilities(&self, facilities: &ActivityFacilities) -> AccResult<ZoneGrid> {
        let extent = BoundingBox::from_points(facilities.iter().map(|f| f.coord))
            .ok_or_else(|| AccError::DataIntegrity("no facilities to partition".into()))?;
        Ok(self.partition(extent))
    }
}
