//! Network representation and builder.
//!
//! # Data layout
//!
//! Links keep the id they were added with.  Outgoing adjacency is stored in
//! **Compressed Sparse Row (CSR)** form as a permutation of link ids sorted
//! by source node.  Given a `NodeId n`, its outgoing links are:
//!
//! ```text
//! out_links[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! so iterating a node's outgoing links is a contiguous scan, which is what
//! the least-cost-tree inner loop wants.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps a planar `(x, y)` to the nearest `NodeId`.
//! Used to snap measuring points and facilities to the network.

use std::collections::HashMap;

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use acc_core::{BoundingBox, LinkId, NodeId, Point};

use crate::{SpatialError, SpatialResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Network ───────────────────────────────────────────────────────────────────

/// Directed network in CSR format plus a spatial index for node snapping.
///
/// Do not construct directly; use [`NetworkBuilder`].
pub struct Network {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Planar position of each node.  Indexed by `NodeId`.
    pub node_coord: Vec<Point>,
    node_label:     Vec<String>,

    // ── CSR adjacency ─────────────────────────────────────────────────────
    /// CSR row pointer into `out_links`.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,
    /// Link ids sorted by source node.
    pub out_links: Vec<LinkId>,

    // ── Link data (indexed by LinkId) ─────────────────────────────────────
    pub link_from: Vec<NodeId>,
    pub link_to:   Vec<NodeId>,
    /// Length in metres.
    pub link_length_m: Vec<f64>,
    /// Free-flow speed in metres per second.
    pub link_freespeed_mps: Vec<f64>,
    /// Congested travel time in seconds, when a traffic run supplied one.
    link_congested_s: Option<Vec<f64>>,
    link_label:       Vec<String>,

    // ── Lookup ────────────────────────────────────────────────────────────
    node_by_label: HashMap<String, NodeId>,
    link_by_label: HashMap<String, LinkId>,
    spatial_idx:   RTree<NodeEntry>,
}

impl Network {
    /// Construct an empty network with no nodes or links.
    pub fn empty() -> Self {
        NetworkBuilder::new().build()
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_coord.len()
    }

    pub fn link_count(&self) -> usize {
        self.link_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_coord.is_empty()
    }

    // ── Labels ────────────────────────────────────────────────────────────

    pub fn node_label(&self, node: NodeId) -> &str {
        &self.node_label[node.index()]
    }

    pub fn link_label(&self, link: LinkId) -> &str {
        &self.link_label[link.index()]
    }

    pub fn lookup_node(&self, label: &str) -> Option<NodeId> {
        self.node_by_label.get(label).copied()
    }

    pub fn lookup_link(&self, label: &str) -> Option<LinkId> {
        self.link_by_label.get(label).copied()
    }

    pub fn link_ids(&self) -> impl Iterator<Item = LinkId> + '_ {
        (0..self.link_count()).map(|i| LinkId(i as u32))
    }

    // ── Traversal ─────────────────────────────────────────────────────────

    /// Outgoing links of `node`, as a contiguous slice of the CSR array.
    #[inline]
    pub fn out_links(&self, node: NodeId) -> &[LinkId] {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        &self.out_links[start..end]
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.out_links(node).len()
    }

    // ── Link attributes ───────────────────────────────────────────────────

    /// `length / freespeed` in seconds.
    #[inline]
    pub fn freespeed_time(&self, link: LinkId) -> f64 {
        self.link_length_m[link.index()] / self.link_freespeed_mps[link.index()]
    }

    /// Congested travel time when available, otherwise the free-speed time.
    #[inline]
    pub fn travel_time(&self, link: LinkId) -> f64 {
        match &self.link_congested_s {
            Some(times) => times[link.index()],
            None => self.freespeed_time(link),
        }
    }

    pub fn has_congested_times(&self) -> bool {
        self.link_congested_s.is_some()
    }

    /// Attach congested travel times (seconds, indexed by `LinkId`).
    pub fn set_congested_times(&mut self, times: Vec<f64>) -> SpatialResult<()> {
        if times.len() != self.link_count() {
            return Err(SpatialError::Parse(format!(
                "expected {} congested travel times, got {}",
                self.link_count(),
                times.len()
            )));
        }
        self.link_congested_s = Some(times);
        Ok(())
    }

    /// Midpoint of the straight segment between the link's end nodes, or
    /// `None` for an unknown link.
    pub fn link_midpoint(&self, link: LinkId) -> Option<Point> {
        let from = *self.link_from.get(link.index())?;
        let to = self.link_to[link.index()];
        Some(self.node_coord[from.index()].midpoint(self.node_coord[to.index()]))
    }

    pub fn node_coord(&self, node: NodeId) -> Option<Point> {
        self.node_coord.get(node.index()).copied()
    }

    /// Extent of all node coordinates; `None` for an empty network.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.node_coord.iter().copied())
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Nearest node to `pos`.  Returns `None` only if the network has no nodes.
    pub fn snap_to_node(&self, pos: Point) -> Option<NodeId> {
        self.spatial_idx.nearest_neighbor(&pos.as_array()).map(|e| e.id)
    }

    /// Up to `k` nearest nodes to `pos`, by ascending distance.
    pub fn k_nearest_nodes(&self, pos: Point, k: usize) -> Vec<NodeId> {
        self.spatial_idx
            .nearest_neighbor_iter(&pos.as_array())
            .take(k)
            .map(|e| e.id)
            .collect()
    }
}

// ── NetworkBuilder ────────────────────────────────────────────────────────────

/// Construct a [`Network`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use acc_core::Point;
/// use acc_spatial::NetworkBuilder;
///
/// let mut b = NetworkBuilder::new();
/// let a = b.add_node("a", Point::new(0.0, 0.0));
/// let c = b.add_node("c", Point::new(1_200.0, 0.0));
/// b.add_road(a, c, 1_200.0, 13.9);
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.link_count(), 2); // both directions
/// ```
pub struct NetworkBuilder {
    nodes: Vec<(String, Point)>,
    links: Vec<RawLink>,
    node_by_label: HashMap<String, NodeId>,
}

struct RawLink {
    label:         String,
    from:          NodeId,
    to:            NodeId,
    length_m:      f64,
    freespeed_mps: f64,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), links: Vec::new(), node_by_label: HashMap::new() }
    }

    pub fn with_capacity(nodes: usize, links: usize) -> Self {
        Self {
            nodes:         Vec::with_capacity(nodes),
            links:         Vec::with_capacity(links),
            node_by_label: HashMap::with_capacity(nodes),
        }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, label: impl Into<String>, pos: Point) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let label = label.into();
        self.node_by_label.insert(label.clone(), id);
        self.nodes.push((label, pos));
        id
    }

    /// Add a **directed** link and return its `LinkId` (sequential from 0).
    pub fn add_link(
        &mut self,
        label: impl Into<String>,
        from: NodeId,
        to: NodeId,
        length_m: f64,
        freespeed_mps: f64,
    ) -> LinkId {
        let id = LinkId(self.links.len() as u32);
        self.links.push(RawLink { label: label.into(), from, to, length_m, freespeed_mps });
        id
    }

    /// Add links in both directions, labelled `"{a}_{b}"` and `"{b}_{a}"`.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, length_m: f64, freespeed_mps: f64) -> (LinkId, LinkId) {
        let (la, lb) = (self.nodes[a.index()].0.clone(), self.nodes[b.index()].0.clone());
        let forward = self.add_link(format!("{la}_{lb}"), a, b, length_m, freespeed_mps);
        let back = self.add_link(format!("{lb}_{la}"), b, a, length_m, freespeed_mps);
        (forward, back)
    }

    pub fn lookup_node(&self, label: &str) -> Option<NodeId> {
        self.node_by_label.get(label).copied()
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn link_count(&self) -> usize { self.links.len() }

    /// Consume the builder and produce a [`Network`].
    ///
    /// O(E log E) for the adjacency sort plus O(N log N) for the R-tree bulk
    /// load.
    pub fn build(self) -> Network {
        let node_count = self.nodes.len();

        let mut out_links: Vec<LinkId> = (0..self.links.len()).map(|i| LinkId(i as u32)).collect();
        out_links.sort_by_key(|l| self.links[l.index()].from.0);

        let mut node_out_start = vec![0u32; node_count + 1];
        for l in &self.links {
            node_out_start[l.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, self.links.len());

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, (_, pos))| NodeEntry { point: pos.as_array(), id: NodeId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        let link_by_label = self
            .links
            .iter()
            .enumerate()
            .map(|(i, l)| (l.label.clone(), LinkId(i as u32)))
            .collect();

        let (node_label, node_coord) = self.nodes.into_iter().unzip();

        Network {
            node_coord,
            node_label,
            node_out_start,
            out_links,
            link_from:          self.links.iter().map(|l| l.from).collect(),
            link_to:            self.links.iter().map(|l| l.to).collect(),
            link_length_m:      self.links.iter().map(|l| l.length_m).collect(),
            link_freespeed_mps: self.links.iter().map(|l| l.freespeed_mps).collect(),
            link_congested_s:   None,
            link_label:         self.links.into_iter().map(|l| l.label).collect(),
            node_by_label:      self.node_by_label,
            link_by_label,
            spatial_idx,
        }
    }
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
