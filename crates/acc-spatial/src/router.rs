//! Least-cost trees over the network.
//!
//! # Pluggability
//!
//! Accessibility computations call routing through the [`Router`] trait, so
//! a different engine (A*, a precomputed matrix) can be dropped in.  The
//! default [`DijkstraRouter`] grows a one-to-all tree from a single origin.
//!
//! # Cost units
//!
//! All costs are travel times in **seconds** (`f64`):
//!
//! | Mode        | Link cost                                   |
//! |-------------|---------------------------------------------|
//! | `FreeSpeed` | `length / freespeed`                        |
//! | `Car`       | congested time if present, else free speed  |
//! | `Walk`      | `length / walk speed`                       |
//! | `Bike`      | `length / bike speed`                       |
//! | `Pt`        | not routed; see [`TravelSpeeds::pt_time`]   |

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use acc_core::{LinkId, Mode, NodeId};

use crate::network::Network;
use crate::{SpatialError, SpatialResult};

// ── TravelSpeeds ──────────────────────────────────────────────────────────────

/// Teleported speeds for the non-car modes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TravelSpeeds {
    pub walk_mps:       f64,
    pub bike_mps:       f64,
    pub pt_mps:         f64,
    /// Beeline distance is multiplied by this for teleported pt trips.
    pub beeline_factor: f64,
}

impl Default for TravelSpeeds {
    fn default() -> Self {
        Self {
            walk_mps:       3.0 / 3.6,
            bike_mps:       15.0 / 3.6,
            pt_mps:         50.0 / 3.6,
            beeline_factor: 1.3,
        }
    }
}

impl TravelSpeeds {
    /// Time to cover `distance` metres on foot.
    #[inline]
    pub fn walk_time(&self, distance: f64) -> f64 {
        distance / self.walk_mps
    }

    /// Teleported pt time for a beeline `distance`.
    #[inline]
    pub fn pt_time(&self, distance: f64) -> f64 {
        distance * self.beeline_factor / self.pt_mps
    }

    /// Cost of traversing `link` in `mode`.
    #[inline]
    pub fn link_cost(&self, network: &Network, link: LinkId, mode: Mode) -> f64 {
        match mode {
            Mode::FreeSpeed => network.freespeed_time(link),
            Mode::Car       => network.travel_time(link),
            Mode::Walk      => network.link_length_m[link.index()] / self.walk_mps,
            Mode::Bike      => network.link_length_m[link.index()] / self.bike_mps,
            Mode::Pt        => f64::INFINITY,
        }
    }
}

// ── LeastCostTree ─────────────────────────────────────────────────────────────

/// One-to-all least costs from a single origin node.
#[derive(Debug, Clone)]
pub struct LeastCostTree {
    pub origin: NodeId,
    pub mode:   Mode,
    cost:       Vec<f64>,
}

impl LeastCostTree {
    /// Cost to reach `node`; `None` if it is unreachable.
    #[inline]
    pub fn cost(&self, node: NodeId) -> Option<f64> {
        self.cost.get(node.index()).copied().filter(|c| c.is_finite())
    }

    pub fn reachable_count(&self) -> usize {
        self.cost.iter().filter(|c| c.is_finite()).count()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable least-cost-tree engine.
///
/// Implementations must be `Send + Sync` so one router can be shared across
/// Rayon workers when measuring points are processed in parallel.
pub trait Router: Send + Sync {
    /// Least costs from `origin` to every node for a network `mode`.
    ///
    /// Fails with [`SpatialError::NotANetworkMode`] for teleported modes and
    /// [`SpatialError::NodeNotFound`] for an unknown origin.
    fn tree(&self, network: &Network, origin: NodeId, mode: Mode) -> SpatialResult<LeastCostTree>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra over the CSR network.
#[derive(Clone, Debug, Default)]
pub struct DijkstraRouter {
    pub speeds: TravelSpeeds,
}

impl DijkstraRouter {
    pub fn new(speeds: TravelSpeeds) -> Self {
        Self { speeds }
    }
}

impl Router for DijkstraRouter {
    fn tree(&self, network: &Network, origin: NodeId, mode: Mode) -> SpatialResult<LeastCostTree> {
        if !mode.is_network_mode() {
            return Err(SpatialError::NotANetworkMode(mode));
        }
        if origin.index() >= network.node_count() {
            return Err(SpatialError::NodeNotFound(origin));
        }
        Ok(dijkstra(network, origin, mode, &self.speeds))
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Totally ordered cost for the heap.
#[derive(Copy, Clone, PartialEq, Debug)]
struct Cost(f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

fn dijkstra(network: &Network, origin: NodeId, mode: Mode, speeds: &TravelSpeeds) -> LeastCostTree {
    let mut cost = vec![f64::INFINITY; network.node_count()];
    cost[origin.index()] = 0.0;

    // Secondary key NodeId keeps tie-breaking deterministic.
    let mut heap: BinaryHeap<Reverse<(Cost, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), origin)));

    while let Some(Reverse((Cost(c), node))) = heap.pop() {
        // Stale entry.
        if c > cost[node.index()] {
            continue;
        }

        for &link in network.out_links(node) {
            let next = network.link_to[link.index()];
            let new_cost = c + speeds.link_cost(network, link, mode);
            if new_cost < cost[next.index()] {
                cost[next.index()] = new_cost;
                heap.push(Reverse((Cost(new_cost), next)));
            }
        }
    }

    LeastCostTree { origin, mode, cost }
}
