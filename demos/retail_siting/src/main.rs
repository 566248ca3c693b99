//! retail_siting — place new retailers on a network with the gravity model.
//!
//! A random local search moves one candidate retailer at a time to a random
//! link and keeps the move when the gravity score improves.  Afterwards
//! every person shops at the retailer with the highest potential from their
//! home, and the resulting daily plans are scored with the facility-load
//! penalty so crowded shops show up in the plan scores.
//!
//! Usage:
//!
//! ```text
//! retail_siting [config.toml]
//! ```
//!
//! The config must contain a `GravityModel` group; without one the built-in
//! defaults below are used.  Set `RUST_LOG=info` to follow the model.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;

use acc_core::{Config, ConfigGroup, FacilityId, LinkId, Point};
use acc_gravity::{CONFIG_GROUP, GravityConfig, GravityModel, SHOP_TYPE};
use acc_scenario::{Activity, ActivityFacilities, ActivityOption, Plan, Population};
use acc_scoring::{FacilityLoad, PenaltyKind, ScoringConfig, ScoringParams, ScoringPipeline};
use acc_spatial::{Network, NetworkBuilder};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:          u64   = 7;
const PERSON_COUNT:  usize = 400;
const ITERATIONS:    usize = 200;
const LATTICE:       usize = 8;
const BLOCK_M:       f64   = 300.0;
const SHOP_START:    f64   = 17.0 * 3600.0;
const SHOP_END:      f64   = 18.0 * 3600.0;

// ── Scenario ──────────────────────────────────────────────────────────────────

fn build_network() -> Network {
    let mut b = NetworkBuilder::new();
    let mut nodes = Vec::with_capacity(LATTICE * LATTICE);
    for j in 0..LATTICE {
        for i in 0..LATTICE {
            nodes.push(b.add_node(format!("n{i}_{j}"), Point::new(i as f64 * BLOCK_M, j as f64 * BLOCK_M)));
        }
    }
    for j in 0..LATTICE {
        for i in 0..LATTICE {
            let here = nodes[j * LATTICE + i];
            if i + 1 < LATTICE {
                b.add_road(here, nodes[j * LATTICE + i + 1], BLOCK_M, 13.9);
            }
            if j + 1 < LATTICE {
                b.add_road(here, nodes[(j + 1) * LATTICE + i], BLOCK_M, 13.9);
            }
        }
    }
    b.build()
}

/// Existing shops in the south-west, two candidate retailers (returned in
/// solution order), and one home per person clustered in the north-east.
fn build_scenario(rng: &mut SmallRng) -> Result<(ActivityFacilities, Population, Vec<FacilityId>)> {
    let extent = (LATTICE - 1) as f64 * BLOCK_M;
    let mut fac = ActivityFacilities::new();

    for (label, x, y, capacity) in [("corner", 150.0, 300.0, 80.0), ("mall", 600.0, 450.0, 2_500.0)] {
        fac.create_facility(label, Point::new(x, y))?
            .add_option(ActivityOption::new(SHOP_TYPE).with_capacity(capacity));
    }

    let mut candidates = Vec::new();
    for (label, capacity) in [("new_grocer", 600.0), ("new_discounter", 1_200.0)] {
        let f = fac.create_facility(label, Point::new(extent / 2.0, extent / 2.0))?;
        f.add_option(ActivityOption::new(SHOP_TYPE).with_capacity(capacity));
        candidates.push(f.id);
    }

    let mut population = Population::new();
    for n in 0..PERSON_COUNT {
        // Two thirds of the homes in the north-east quarter.
        let (lo, hi) = if n % 3 == 0 { (0.0, extent) } else { (extent / 2.0, extent) };
        let home = Point::new(rng.gen_range(lo..hi), rng.gen_range(lo..hi));
        let facility = fac.create_facility(format!("home_{n}"), home)?;
        facility.create_option("h");
        let home_id = facility.id;

        let mut h = Activity::new("h", home).at_facility(home_id);
        h.end_time = Some(SHOP_START);
        population.create_person(format!("p{n}"))?.add_plan(Plan::new(vec![h]));
    }

    Ok((fac, population, candidates))
}

fn default_config() -> Config {
    let mut config = Config::new();
    config.add_group(
        ConfigGroup::new(CONFIG_GROUP)
            .with("zones", 4)
            .with("partition", "symmetric")
            .with("betaDistance", -2.0)
            .with("betaCapacity", 1.0)
            .with("samplingRatePersons", 0.5)
            .with("samplingTypeShops", "all")
            .with("seed", SEED),
    );
    config
}

// ── Local search ──────────────────────────────────────────────────────────────

fn local_search(model: &mut GravityModel<'_>, links: &[LinkId], rng: &mut SmallRng) -> Result<(Vec<LinkId>, f64)> {
    let mut best: Vec<LinkId> = (0..model.candidates().len())
        .map(|_| links[rng.gen_range(0..links.len())])
        .collect();
    let mut best_score = model.compute_potential(&best)?;
    log::info!("initial layout {best:?}: {best_score:.4}");

    let mut accepted = 0usize;
    for iteration in 0..ITERATIONS {
        let mut trial = best.clone();
        let k = rng.gen_range(0..trial.len());
        trial[k] = links[rng.gen_range(0..links.len())];

        let score = model.compute_potential(&trial)?;
        if score > best_score {
            log::debug!("iteration {iteration}: {best_score:.4} -> {score:.4}");
            best = trial;
            best_score = score;
            accepted += 1;
        }
    }
    log::info!("local search accepted {accepted} of {ITERATIONS} moves");
    Ok((best, best_score))
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();
    println!("=== retail_siting ===");

    let config = match std::env::args_os().nth(1) {
        Some(path) => Config::from_toml_file(Path::new(&path))?,
        None => default_config(),
    };
    let gravity_config = GravityConfig::from_config(&config)?;

    let mut rng = SmallRng::seed_from_u64(SEED);
    let network = build_network();
    let (facilities, population, candidates) = build_scenario(&mut rng)?;
    let links: Vec<LinkId> = network.link_ids().collect();
    println!(
        "network: {} links; {} persons; {} facilities; {} candidates",
        links.len(),
        population.len(),
        facilities.len(),
        candidates.len()
    );

    // 1. Optimize the candidate layout.
    let t0 = Instant::now();
    let mut model = GravityModel::new(gravity_config, &network, &population, &facilities, candidates.clone())?;
    let (layout, score) = local_search(&mut model, &links, &mut rng)?;
    println!("best score {score:.4} after {ITERATIONS} moves in {:.3} s", t0.elapsed().as_secs_f64());
    for (&c, &link) in candidates.iter().zip(&layout) {
        let at = network.link_midpoint(link).unwrap_or(Point::new(f64::NAN, f64::NAN));
        println!("  {:<16} -> link {:<10} at ({:.0}, {:.0})", facilities.get(c).label, network.link_label(link), at.x, at.y);
    }

    // 2. Each person shops where the potential is highest.
    let mut shops: Vec<(FacilityId, Point)> = model
        .index()
        .opportunities()
        .iter()
        .copied()
        .filter(|f| !candidates.contains(f))
        .map(|f| (f, facilities.get(f).coord))
        .collect();
    for (&c, &link) in candidates.iter().zip(&layout) {
        if let Some(mid) = network.link_midpoint(link) {
            shops.push((c, mid));
        }
    }

    let mut loads: FxHashMap<FacilityId, FacilityLoad> = FxHashMap::default();
    let mut plans = Vec::with_capacity(population.len());
    for person in population.iter() {
        let Some(home) = person.home(&facilities) else { continue };
        let mut best: Option<(FacilityId, f64)> = None;
        for &(shop, loc) in &shops {
            let cap = facilities.get(shop).capacity(SHOP_TYPE)?;
            let value = acc_gravity::potential(home.distance(loc), cap, model.betas());
            if best.is_none_or(|(_, v)| value > v) {
                best = Some((shop, value));
            }
        }
        let Some((shop, _)) = best else { continue };

        loads
            .entry(shop)
            .or_insert_with(|| FacilityLoad::new(facilities.get(shop).capacity(SHOP_TYPE).unwrap_or(1.0)))
            .add_visitor(SHOP_START, SHOP_END);

        let Some(home_activity) = person.first_activity() else { continue };
        let mut visit = Activity::new(SHOP_TYPE, facilities.get(shop).coord).at_facility(shop);
        visit.end_time = Some(SHOP_END);
        let mut back = home_activity.clone();
        back.end_time = None;
        plans.push((shop, Plan::new(vec![home_activity.clone(), visit, back])));
    }

    // 3. Score the plans with the facility-load penalty.
    let scoring = ScoringPipeline::from_config(
        &ScoringConfig {
            params: ScoringParams::default()
                .with_typical_duration("h", 16.0 * 3600.0)
                .with_typical_duration(SHOP_TYPE, 3600.0),
            penalty: PenaltyKind::FacilityLoad,
            restraint_factor: 1.0,
            restraint_exponent: 2.0,
            ..ScoringConfig::default()
        },
        loads,
    );

    let mut per_shop: FxHashMap<FacilityId, (usize, f64)> = FxHashMap::default();
    for (shop, plan) in &plans {
        let score = scoring.score_plan(plan, &facilities)?.total();
        let entry = per_shop.entry(*shop).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += score;
    }

    println!();
    println!("{:<16} {:>8} {:>12}", "Shop", "Visitors", "Mean score");
    println!("{}", "-".repeat(38));
    let mut rows: Vec<_> = per_shop.into_iter().collect();
    rows.sort_by_key(|(f, _)| *f);
    for (shop, (visitors, total)) in rows {
        println!("{:<16} {:>8} {:>12.3}", facilities.get(shop).label, visitors, total / visitors as f64);
    }

    Ok(())
}
