//! Persons and facilities binned into zones.
//!
//! [`SpatialIndex::build`] assigns each person (by home) and each
//! opportunity facility to its zone with the direct formula of
//! [`ZoneGrid::zone_of`], then bulk-loads one R-tree per zone and kind.
//! Nothing here mutates persons or facilities; entries carry ids only.

use rstar::RTree;

use acc_core::{FacilityId, PersonId, Point, ZoneId};
use acc_scenario::{ActivityFacilities, Population};

use crate::zones::{Located, ZoneGrid};

/// Activity types that select the two facility subsets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexTypes {
    /// Facilities that count as destinations (default `"shop"`).
    pub opportunity: String,
    /// Facilities that count as origins (default `"h"`).
    pub anchor:      String,
}

impl Default for IndexTypes {
    fn default() -> Self {
        Self { opportunity: "shop".into(), anchor: "h".into() }
    }
}

/// Zone grid plus per-zone persons and opportunity indices.
#[derive(Debug)]
pub struct SpatialIndex {
    grid:          ZoneGrid,
    types:         IndexTypes,
    homes:         Vec<Option<Point>>,
    home_zones:    Vec<Option<ZoneId>>,
    opportunities: Vec<FacilityId>,
    anchors:       Vec<FacilityId>,
}

impl SpatialIndex {
    pub fn build(
        mut grid: ZoneGrid,
        population: &Population,
        facilities: &ActivityFacilities,
        types: IndexTypes,
    ) -> Self {
        let zone_count = grid.len();
        let mut person_bins: Vec<Vec<Located<PersonId>>> = vec![Vec::new(); zone_count];
        let mut shop_bins: Vec<Vec<Located<FacilityId>>> = vec![Vec::new(); zone_count];

        // ── Persons ───────────────────────────────────────────────────────
        let mut homes = Vec::with_capacity(population.len());
        let mut home_zones = Vec::with_capacity(population.len());
        let mut outside = 0usize;
        for person in population.iter() {
            let home = person.home(facilities);
            let zone = home.and_then(|h| grid.zone_of(h));
            match (home, zone) {
                (Some(h), Some(z)) => person_bins[z.index()].push(Located::new(h.as_array(), person.id)),
                (Some(_), None) => outside += 1,
                (None, _) => {}
            }
            homes.push(home);
            home_zones.push(zone);
        }
        if outside > 0 {
            log::warn!("{outside} person homes lie outside the zone grid and were not binned");
        }

        // ── Facilities ────────────────────────────────────────────────────
        let mut opportunities = Vec::new();
        let mut anchors = Vec::new();
        for facility in facilities.iter() {
            if facility.has_activity(&types.opportunity) {
                opportunities.push(facility.id);
                if let Some(z) = grid.zone_of(facility.coord) {
                    shop_bins[z.index()].push(Located::new(facility.coord.as_array(), facility.id));
                }
            }
            if facility.has_activity(&types.anchor) {
                anchors.push(facility.id);
            }
        }

        for ((zone, persons), shops) in grid.zones.iter_mut().zip(person_bins).zip(shop_bins) {
            zone.persons = RTree::bulk_load(persons);
            zone.shops = RTree::bulk_load(shops);
        }

        log::debug!(
            "indexed {} persons, {} {:?} and {} {:?} facilities into {} zones",
            population.len(),
            opportunities.len(),
            types.opportunity,
            anchors.len(),
            types.anchor,
            zone_count
        );

        Self { grid, types, homes, home_zones, opportunities, anchors }
    }

    pub fn grid(&self) -> &ZoneGrid {
        &self.grid
    }

    pub fn types(&self) -> &IndexTypes {
        &self.types
    }

    // ── Facility subsets ──────────────────────────────────────────────────

    /// Facilities offering the opportunity type, in id order.
    pub fn opportunities(&self) -> &[FacilityId] {
        &self.opportunities
    }

    /// Facilities offering the anchor type, in id order.
    pub fn anchors(&self) -> &[FacilityId] {
        &self.anchors
    }

    // ── Zone queries ──────────────────────────────────────────────────────

    pub fn zone_of(&self, p: Point) -> Option<ZoneId> {
        self.grid.zone_of(p)
    }

    pub fn home(&self, person: PersonId) -> Option<Point> {
        self.homes.get(person.index()).copied().flatten()
    }

    pub fn home_zone(&self, person: PersonId) -> Option<ZoneId> {
        self.home_zones.get(person.index()).copied().flatten()
    }

    pub fn persons_in_zone(&self, zone: ZoneId) -> impl Iterator<Item = PersonId> + '_ {
        self.grid.zone(zone).into_iter().flat_map(|z| z.persons.iter().map(|e| e.data))
    }

    pub fn shops_in_zone(&self, zone: ZoneId) -> impl Iterator<Item = FacilityId> + '_ {
        self.grid.zone(zone).into_iter().flat_map(|z| z.shops.iter().map(|e| e.data))
    }

    /// Opportunity facilities within `radius` of `p`, sorted by id.
    pub fn shops_within(&self, p: Point, radius: f64) -> Vec<FacilityId> {
        let query = p.as_array();
        let r2 = radius * radius;
        let mut out: Vec<FacilityId> = self
            .grid
            .zones_near(p, radius)
            .into_iter()
            .filter_map(|z| self.grid.zone(z))
            .flat_map(|z| z.shops.locate_within_distance(query, r2).map(|e| e.data))
            .collect();
        out.sort_unstable();
        out
    }
}
