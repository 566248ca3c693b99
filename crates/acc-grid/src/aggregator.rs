//! Accessibility per measuring point and mode.
//!
//! # Cost
//!
//! For a measuring point `m` snapped to node `n(m)` and an opportunity `o`
//! snapped to node `n(o)`, the cost in seconds is
//!
//! ```text
//! network modes:  walk(|m − n(m)|) + tree_mode(n(m) → n(o)) + walk(|n(o) − o|)
//! pt:             |m − o| · beeline_factor / pt_speed
//! ```
//!
//! and `accessibility(m, mode) = Σ_o potential(cost, cap(o), betas(mode))`.
//! Opportunities the tree does not reach are skipped.
//!
//! # Parallelism
//!
//! Measuring points are grouped by the node they snap to.  Each group
//! builds one least-cost tree per network mode and shares it across its
//! points, then every point takes a read-only sum.  With the `parallel`
//! feature the groups are processed on Rayon's pool; values are inserted
//! into the result sequentially afterwards, in point order.

use acc_core::{AccError, FacilityId, NodeId, Point};
use acc_gravity::{potential, validate_capacity};
use acc_scenario::ActivityFacilities;
use acc_spatial::{LeastCostTree, MeasuringGrid, MeasuringPoint, Network, Router};

use crate::config::AccessibilityConfig;
use crate::result::{AccessibilityResult, ResultBuilder};
use crate::{GridError, GridResult};

// ── Opportunities ─────────────────────────────────────────────────────────────

/// A destination facility with its network attachment resolved.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Opportunity {
    pub facility:        FacilityId,
    pub coord:           Point,
    pub node:            NodeId,
    /// Beeline distance from `node` back to `coord`.
    pub egress_distance: f64,
    pub capacity:        f64,
}

/// The destinations of one activity type.
#[derive(Clone, Debug)]
pub struct OpportunitySet {
    activity_type: String,
    items:         Vec<Opportunity>,
}

impl OpportunitySet {
    /// Every facility offering `activity_type`.
    pub fn for_type(
        activity_type: &str,
        facilities: &ActivityFacilities,
        network: &Network,
        capacity_beta: f64,
    ) -> GridResult<Self> {
        let ids = facilities.ids_with_activity(activity_type);
        Self::from_facilities(activity_type, &ids, facilities, network, capacity_beta)
    }

    /// An explicit list of facilities.
    ///
    /// A facility without an `activity_type` option is an
    /// [`AccError::DataIntegrity`]; an option without a capacity counts as
    /// `1.0`.
    pub fn from_facilities(
        activity_type: &str,
        ids: &[FacilityId],
        facilities: &ActivityFacilities,
        network: &Network,
        capacity_beta: f64,
    ) -> GridResult<Self> {
        let mut items = Vec::with_capacity(ids.len());
        for &id in ids {
            let facility = facilities.get(id);
            let capacity = facility.capacity_or(activity_type, 1.0)?;
            validate_capacity(capacity, capacity_beta)?;
            let node = network.snap_to_node(facility.coord).ok_or(acc_spatial::SpatialError::EmptyNetwork)?;
            items.push(Opportunity {
                facility: id,
                coord: facility.coord,
                node,
                egress_distance: facility.coord.distance(network.node_coord[node.index()]),
                capacity,
            });
        }
        Ok(Self { activity_type: activity_type.to_owned(), items })
    }

    pub fn activity_type(&self) -> &str {
        &self.activity_type
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Opportunity> {
        self.items.iter()
    }
}

// ── GridAccessibility ─────────────────────────────────────────────────────────

/// Computes [`AccessibilityResult`]s over a fixed measuring grid.
///
/// Create via [`GridAccessibilityBuilder`][crate::GridAccessibilityBuilder].
pub struct GridAccessibility<'a, R: Router> {
    pub(crate) config:  AccessibilityConfig,
    pub(crate) network: &'a Network,
    pub(crate) router:  R,
    pub(crate) grid:    MeasuringGrid,
}

impl<'a, R: Router> GridAccessibility<'a, R> {
    pub fn config(&self) -> &AccessibilityConfig {
        &self.config
    }

    pub fn network(&self) -> &'a Network {
        self.network
    }

    pub fn grid(&self) -> &MeasuringGrid {
        &self.grid
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    /// Accessibility of every measuring point for every enabled mode.
    ///
    /// The density column counts the `anchor_type` facilities of
    /// `facilities` per measuring cell; they never enter the sum.
    pub fn compute(
        &self,
        opportunities: &OpportunitySet,
        facilities: &ActivityFacilities,
    ) -> GridResult<AccessibilityResult> {
        log::info!(
            "computing {:?} accessibility at {} measuring points for {} opportunities, modes {:?}",
            opportunities.activity_type(),
            self.grid.len(),
            opportunities.len(),
            self.config.modes
        );

        let points = self.grid.points();
        let groups = node_groups(points);
        log::debug!("{} measuring points snap to {} distinct nodes", points.len(), groups.len());

        let group_values = |group: &Vec<usize>| -> GridResult<Vec<(usize, Vec<f64>)>> {
            let trees = self.trees(points[group[0]].node)?;
            group
                .iter()
                .map(|&i| -> GridResult<(usize, Vec<f64>)> {
                    Ok((i, self.values_with_trees(&points[i], &trees, opportunities)?))
                })
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let grouped: Vec<Vec<(usize, Vec<f64>)>> = groups.iter().map(group_values).collect::<GridResult<_>>()?;

        #[cfg(feature = "parallel")]
        let grouped: Vec<Vec<(usize, Vec<f64>)>> = {
            use rayon::prelude::*;
            groups.par_iter().map(group_values).collect::<GridResult<_>>()?
        };

        let mut values = vec![Vec::new(); points.len()];
        for (i, row) in grouped.into_iter().flatten() {
            values[i] = row;
        }

        let mut builder = ResultBuilder::new(
            opportunities.activity_type(),
            self.grid.points().to_vec(),
            self.config.modes.clone(),
        );
        for (mp, row) in self.grid.points().iter().zip(values) {
            for (&mode, value) in self.config.modes.iter().zip(row) {
                builder.insert(mp.id, mode, value)?;
            }
        }
        builder.set_population_density(self.anchor_density(facilities))?;
        Ok(builder.finish())
    }

    /// Values of one measuring point, in `config.modes` order.
    pub fn point_values(&self, mp: &MeasuringPoint, opportunities: &OpportunitySet) -> GridResult<Vec<f64>> {
        let trees = self.trees(mp.node)?;
        self.values_with_trees(mp, &trees, opportunities)
    }

    /// One tree per configured mode from `origin`; `None` for teleported modes.
    fn trees(&self, origin: NodeId) -> GridResult<Vec<Option<LeastCostTree>>> {
        self.config
            .modes
            .iter()
            .map(|&mode| -> GridResult<Option<LeastCostTree>> {
                if mode.is_network_mode() {
                    Ok(Some(self.router.tree(self.network, origin, mode)?))
                } else {
                    Ok(None)
                }
            })
            .collect()
    }

    fn values_with_trees(
        &self,
        mp: &MeasuringPoint,
        trees: &[Option<LeastCostTree>],
        opportunities: &OpportunitySet,
    ) -> GridResult<Vec<f64>> {
        let speeds = &self.config.speeds;
        let mut out = Vec::with_capacity(self.config.modes.len());

        for (&mode, tree) in self.config.modes.iter().zip(trees) {
            let betas = self.config.betas_for(mode);
            let sum: f64 = match tree {
                Some(tree) => {
                    let access = speeds.walk_time(mp.access_distance);
                    opportunities
                        .iter()
                        .filter_map(|o| {
                            let on_network = tree.cost(o.node)?;
                            let cost = access + on_network + speeds.walk_time(o.egress_distance);
                            Some(potential(cost, o.capacity, betas))
                        })
                        .sum()
                }
                None => opportunities
                    .iter()
                    .map(|o| potential(speeds.pt_time(mp.coord.distance(o.coord)), o.capacity, betas))
                    .sum(),
            };
            if !sum.is_finite() {
                return Err(GridError::Core(AccError::DataIntegrity(format!(
                    "accessibility at {} for {mode} is {sum}",
                    mp.id
                ))));
            }
            out.push(sum);
        }
        Ok(out)
    }

    /// Number of anchor facilities per measuring cell.
    pub fn anchor_density(&self, facilities: &ActivityFacilities) -> Vec<f64> {
        let mut density = vec![0.0; self.grid.len()];
        let mut outside = 0usize;
        for facility in facilities.with_activity(&self.config.anchor_type) {
            match self.grid.cell_of(facility.coord) {
                Some(cell) => density[cell.index()] += 1.0,
                None => outside += 1,
            }
        }
        if outside > 0 {
            log::debug!("{outside} {:?} facilities lie outside the measuring grid", self.config.anchor_type);
        }
        density
    }
}

/// Point indices grouped by snapped node, groups ordered by node.
fn node_groups(points: &[MeasuringPoint]) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by_key(|&i| points[i].node);

    let mut groups: Vec<Vec<usize>> = Vec::new();
    for i in order {
        match groups.last_mut() {
            Some(g) if points[g[0]].node == points[i].node => g.push(i),
            _ => groups.push(vec![i]),
        }
    }
    groups
}
