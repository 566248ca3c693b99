//! Measuring points on a regular grid.
//!
//! Cell `(i, j)` (column `i` along x, row `j` along y) has its measuring
//! point at the cell centre `(min_x + (i + 0.5)·cell, min_y + (j + 0.5)·cell)`
//! and id `j * cols + i`.  Each point is snapped to its nearest network node.

use acc_core::{AccError, BoundingBox, MeasuringPointId, NodeId, Point};

use crate::network::Network;
use crate::{SpatialError, SpatialResult};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeasuringPoint {
    pub id:    MeasuringPointId,
    pub coord: Point,
    /// Nearest network node.
    pub node:  NodeId,
    /// Beeline distance from `coord` to `node`.
    pub access_distance: f64,
}

/// Regular grid of measuring points covering a bounding box.
#[derive(Clone, Debug)]
pub struct MeasuringGrid {
    bbox:      BoundingBox,
    cell_size: f64,
    cols:      usize,
    rows:      usize,
    points:    Vec<MeasuringPoint>,
}

impl MeasuringGrid {
    /// Grid over `bbox` with square cells of `cell_size` metres.
    ///
    /// Cells start at the box's lower corner; there is one more column and
    /// row than fit inside the box, so points on the upper bound still fall
    /// in a cell.
    pub fn new(bbox: BoundingBox, cell_size: f64, network: &Network) -> SpatialResult<Self> {
        if !(cell_size > 0.0) {
            return Err(AccError::Config(format!("cellSize must be positive, got {cell_size}")).into());
        }
        if network.is_empty() {
            return Err(SpatialError::EmptyNetwork);
        }

        let cols = (bbox.width() / cell_size).floor() as usize + 1;
        let rows = (bbox.height() / cell_size).floor() as usize + 1;

        let mut points = Vec::with_capacity(cols * rows);
        for j in 0..rows {
            for i in 0..cols {
                let coord = Point::new(
                    bbox.min_x + (i as f64 + 0.5) * cell_size,
                    bbox.min_y + (j as f64 + 0.5) * cell_size,
                );
                let node = network.snap_to_node(coord).ok_or(SpatialError::EmptyNetwork)?;
                let access_distance = coord.distance(network.node_coord[node.index()]);
                points.push(MeasuringPoint {
                    id: MeasuringPointId((j * cols + i) as u32),
                    coord,
                    node,
                    access_distance,
                });
            }
        }

        log::info!("measuring grid: {cols}x{rows} cells of {cell_size} m over {bbox}");
        Ok(Self { bbox, cell_size, cols, rows, points })
    }

    /// Grid over the network's own extent.
    pub fn over_network(network: &Network, cell_size: f64) -> SpatialResult<Self> {
        let bbox = network.bounding_box().ok_or(SpatialError::EmptyNetwork)?;
        Self::new(bbox, cell_size, network)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    pub fn points(&self) -> &[MeasuringPoint] {
        &self.points
    }

    pub fn get(&self, id: MeasuringPointId) -> Option<&MeasuringPoint> {
        self.points.get(id.index())
    }

    /// Cell containing `p`, or `None` outside the grid.
    pub fn cell_of(&self, p: Point) -> Option<MeasuringPointId> {
        let fx = (p.x - self.bbox.min_x) / self.cell_size;
        let fy = (p.y - self.bbox.min_y) / self.cell_size;
        if fx < 0.0 || fy < 0.0 {
            return None;
        }
        let (i, j) = (fx.floor() as usize, fy.floor() as usize);
        if i >= self.cols || j >= self.rows {
            return None;
        }
        Some(MeasuringPointId((j * self.cols + i) as u32))
    }
}
