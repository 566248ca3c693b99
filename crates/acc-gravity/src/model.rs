//! Gravity model for retail siting.
//!
//! # Score
//!
//! A *solution* places each candidate retailer `c` on a link `ℓ(c)`; the
//! candidate then sits at that link's midpoint.  For every sampled person
//! `p` with home `h(p)`:
//!
//! ```text
//! pers_potential(p, c) = potential(|h(p) − ℓ(c)|, cap(c))
//! global_utility(p)    = Σ_s potential(|h(p) − loc(s)|, cap(s))
//! score                = Σ_c Σ_p pers_potential(p, c) / global_utility(p)
//! ```
//!
//! `s` ranges over the shop set of the scenario (see [`ShopSampling`]) plus
//! every candidate; `loc(s)` is the candidate's link midpoint for
//! candidates and the facility coordinate otherwise.  All capacities are the
//! `"shop"` option capacities.
//!
//! # Caching
//!
//! `global_utility(p)` depends on the layout, so it is memoized in a
//! [`GlobalUtilityCache`] that is cleared whenever the solution vector
//! changes.  Evaluating the same solution twice reuses it.

use rustc_hash::FxHashMap;

use acc_core::{AccError, FacilityId, LinkId, PersonId, Point, SamplingRng};
use acc_scenario::{ActivityFacilities, Population};
use acc_spatial::{IndexTypes, Network, SpatialIndex, ZonePartitioner};

use crate::config::{GravityConfig, ShopSampling};
use crate::potential::{potential, validate_capacity};
use crate::{Betas, GlobalUtilityCache, GravityResult};

/// Activity type whose option capacity drives the model.
pub const SHOP_TYPE: &str = "shop";

pub struct GravityModel<'a> {
    config:     GravityConfig,
    network:    &'a Network,
    facilities: &'a ActivityFacilities,
    index:      SpatialIndex,

    /// Candidate retailers, in solution-vector order.
    candidates:   Vec<FacilityId>,
    is_candidate: FxHashMap<FacilityId, usize>,
    /// `"shop"` capacity of every shop and candidate.
    capacity:     FxHashMap<FacilityId, f64>,
    /// Non-candidate shops used in the denominator (`All` and `Random`).
    fixed_shops:  Vec<FacilityId>,
    /// Sampled persons and their homes.
    persons:      Vec<(PersonId, Point)>,

    cache:       GlobalUtilityCache,
    processed:   usize,
    next_report: usize,
}

impl<'a> GravityModel<'a> {
    /// Partition the scenario, bin persons and shops, validate capacities,
    /// and draw the person and shop samples.
    pub fn new(
        config: GravityConfig,
        network: &'a Network,
        population: &Population,
        facilities: &'a ActivityFacilities,
        candidates: Vec<FacilityId>,
    ) -> GravityResult<Self> {
        let partitioner = ZonePartitioner::new(config.zones, config.partition)?;
        let grid = partitioner.from_scenario(population, facilities, SHOP_TYPE)?;
        log::info!("gravity model zones: {} over {}", grid.len(), grid.bounding_box());
        let index = SpatialIndex::build(
            grid,
            population,
            facilities,
            IndexTypes { opportunity: SHOP_TYPE.into(), ..IndexTypes::default() },
        );

        // ── Capacities ────────────────────────────────────────────────────
        let mut capacity = FxHashMap::default();
        for &f in index.opportunities().iter().chain(&candidates) {
            let cap = facilities.get(f).capacity(SHOP_TYPE)?;
            validate_capacity(cap, config.betas.capacity)?;
            capacity.insert(f, cap);
        }

        let mut is_candidate = FxHashMap::default();
        for (k, &c) in candidates.iter().enumerate() {
            if is_candidate.insert(c, k).is_some() {
                return Err(AccError::DataIntegrity(format!(
                    "facility {:?} is listed twice as a candidate",
                    facilities.get(c).label
                ))
                .into());
            }
        }

        // ── Samples ───────────────────────────────────────────────────────
        let mut rng = SamplingRng::new(config.seed);
        let mut shop_rng = rng.child(1);
        let mut person_rng = rng.child(2);

        let others: Vec<FacilityId> = index
            .opportunities()
            .iter()
            .copied()
            .filter(|f| !is_candidate.contains_key(f))
            .collect();
        let fixed_shops = match (config.sampling_type_shops, config.sampling_number_shops) {
            (ShopSampling::Random, Some(n)) => shop_rng.sample_amount(others, n),
            (ShopSampling::Zone, _) => Vec::new(),
            _ => others,
        };

        let mut homeless = 0usize;
        let with_home: Vec<(PersonId, Point)> = population
            .iter()
            .filter_map(|p| {
                let home = index.home(p.id);
                if home.is_none() {
                    homeless += 1;
                }
                home.map(|h| (p.id, h))
            })
            .collect();
        if homeless > 0 {
            log::warn!("{homeless} persons without a plan are ignored");
        }
        let persons = person_rng.sample_rate(with_home, config.sampling_rate_persons);

        log::info!(
            "gravity model: {} candidates, {} persons sampled of {}, shop sampling {:?}",
            candidates.len(),
            persons.len(),
            population.len(),
            config.sampling_type_shops
        );

        Ok(Self {
            config,
            network,
            facilities,
            index,
            candidates,
            is_candidate,
            capacity,
            fixed_shops,
            persons,
            cache: GlobalUtilityCache::new(),
            processed: 0,
            next_report: 1,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &GravityConfig {
        &self.config
    }

    pub fn betas(&self) -> Betas {
        self.config.betas
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn candidates(&self) -> &[FacilityId] {
        &self.candidates
    }

    /// Persons included in the score.
    pub fn sampled_persons(&self) -> &[(PersonId, Point)] {
        &self.persons
    }

    pub fn cache(&self) -> &GlobalUtilityCache {
        &self.cache
    }

    // ── Score ─────────────────────────────────────────────────────────────

    /// Score of `solution`, where `solution[k]` is the link of candidate `k`.
    pub fn compute_potential(&mut self, solution: &[LinkId]) -> GravityResult<f64> {
        let locations = self.candidate_locations(solution)?;
        if self.cache.sync_layout(solution) {
            log::debug!("candidate layout changed; global utilities cleared (version {})", self.cache.version());
        }

        // Sequential phase: the only writes to the cache.
        for i in 0..self.persons.len() {
            let (person, home) = self.persons[i];
            if self.cache.get(person).is_none() {
                let utility = self.global_utility(person, home, &locations)?;
                self.cache.insert(person, utility);
                self.report_progress();
            }
        }

        let betas = self.config.betas;
        let caps: Vec<f64> = self.candidates.iter().map(|c| self.capacity[c]).collect();
        let cache = &self.cache;

        let person_score = |&(person, home): &(PersonId, Point)| -> f64 {
            let utility = cache.get(person).unwrap_or(f64::NAN);
            locations
                .iter()
                .zip(&caps)
                .map(|(&loc, &cap)| potential(home.distance(loc), cap, betas) / utility)
                .sum::<f64>()
        };

        #[cfg(not(feature = "parallel"))]
        let score: f64 = self.persons.iter().map(person_score).sum();

        #[cfg(feature = "parallel")]
        let score: f64 = {
            use rayon::prelude::*;
            self.persons.par_iter().map(person_score).sum()
        };

        log::debug!("solution {solution:?} scored {score}");
        Ok(score)
    }

    /// `pers_potential` of one person for candidate `k` placed at `location`.
    pub fn person_potential(&self, home: Point, k: usize, location: Point) -> f64 {
        potential(home.distance(location), self.capacity[&self.candidates[k]], self.config.betas)
    }

    /// Denominator of one person for a layout given as candidate locations.
    pub fn global_utility(&self, person: PersonId, home: Point, locations: &[Point]) -> GravityResult<f64> {
        let betas = self.config.betas;

        let fixed: f64 = match self.config.sampling_type_shops {
            ShopSampling::Zone => self
                .index
                .home_zone(person)
                .map(|zone| {
                    self.index
                        .shops_in_zone(zone)
                        .filter(|s| !self.is_candidate.contains_key(s))
                        .map(|s| self.shop_potential(home, s))
                        .sum()
                })
                .unwrap_or(0.0),
            _ => self.fixed_shops.iter().map(|&s| self.shop_potential(home, s)).sum(),
        };

        let moving: f64 = self
            .candidates
            .iter()
            .zip(locations)
            .map(|(c, &loc)| potential(home.distance(loc), self.capacity[c], betas))
            .sum();

        let utility = fixed + moving;
        if !(utility > 0.0) || !utility.is_finite() {
            return Err(AccError::DataIntegrity(format!(
                "global utility of person {person} is {utility}"
            ))
            .into());
        }
        Ok(utility)
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn shop_potential(&self, home: Point, shop: FacilityId) -> f64 {
        let coord = self.facilities.get(shop).coord;
        potential(home.distance(coord), self.capacity[&shop], self.config.betas)
    }

    fn candidate_locations(&self, solution: &[LinkId]) -> GravityResult<Vec<Point>> {
        if solution.len() != self.candidates.len() {
            return Err(AccError::DataIntegrity(format!(
                "solution has {} links for {} candidates",
                solution.len(),
                self.candidates.len()
            ))
            .into());
        }
        solution
            .iter()
            .map(|&link| {
                self.network
                    .link_midpoint(link)
                    .ok_or_else(|| AccError::DataIntegrity(format!("unknown link {link}")).into())
            })
            .collect()
    }

    /// Log at 1, 2, 4, 8, … processed persons.
    fn report_progress(&mut self) {
        self.processed += 1;
        if self.processed == self.next_report {
            self.next_report *= 2;
            log::info!("person # {} processed", self.processed);
        }
    }
}
