//! Unit tests for acc-gravity.

use acc_core::{AccError, FacilityId, LinkId, Point};
use acc_scenario::{Activity, ActivityFacilities, ActivityOption, Plan, Population};
use acc_spatial::{Network, NetworkBuilder};

use crate::{Betas, GravityConfig, GravityError, GravityModel, ShopSampling};

// ── Fixtures ──────────────────────────────────────────────────────────────────

const BETAS: Betas = Betas { distance: -1.0, capacity: 0.5 };

/// Two short roads: link 0 (`a_b`) has its midpoint at the origin, link 2
/// (`c_d`) at (50, 0).
fn network() -> Network {
    let mut b = NetworkBuilder::new();
    let a = b.add_node("a", Point::new(-5.0, 0.0));
    let bb = b.add_node("b", Point::new(5.0, 0.0));
    let c = b.add_node("c", Point::new(45.0, 0.0));
    let d = b.add_node("d", Point::new(55.0, 0.0));
    b.add_road(a, bb, 10.0, 10.0);
    b.add_road(c, d, 10.0, 10.0);
    b.build()
}

fn shop(fac: &mut ActivityFacilities, label: &str, coord: Point, capacity: f64) -> FacilityId {
    let f = fac.create_facility(label, coord).unwrap();
    f.add_option(ActivityOption::new("shop").with_capacity(capacity));
    f.id
}

fn population(homes: &[(&str, Point)]) -> Population {
    let mut pop = Population::new();
    for &(label, home) in homes {
        pop.create_person(label)
            .unwrap()
            .add_plan(Plan::new(vec![Activity::new("h", home)]));
    }
    pop
}

/// Persons at distance 10, 20 and 30 from the origin.
fn three_persons() -> Population {
    population(&[
        ("p10", Point::new(10.0, 0.0)),
        ("p20", Point::new(20.0, 0.0)),
        ("p30", Point::new(30.0, 0.0)),
    ])
}

/// One candidate (capacity 100) and one rival shop at (100, 0).
fn facilities() -> (ActivityFacilities, FacilityId, FacilityId) {
    let mut fac = ActivityFacilities::new();
    let cand = shop(&mut fac, "cand", Point::new(0.0, 0.0), 100.0);
    let rival = shop(&mut fac, "rival", Point::new(100.0, 0.0), 100.0);
    (fac, cand, rival)
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-12, "{a} != {b}");
}

// ── Potential ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod potential {
    use super::*;
    use crate::{MIN_DISTANCE, potential, validate_capacity};

    #[test]
    fn formula() {
        assert_eq!(potential(20.0, 100.0, BETAS), 20f64.powf(-1.0) + 10.0);
    }

    #[test]
    fn zero_distance_uses_minimum() {
        for cap in [1.0, 50.0, 100.0] {
            assert_eq!(potential(0.0, cap, BETAS), potential(MIN_DISTANCE, cap, BETAS));
        }
    }

    #[test]
    fn non_increasing_in_distance() {
        for beta_d in [-2.0, -1.0, -0.5, 0.0] {
            let betas = Betas::new(beta_d, 0.5);
            let mut last = f64::INFINITY;
            for d in 1..200 {
                let p = potential(d as f64 * 5.0, 100.0, betas);
                assert!(p <= last, "beta_d={beta_d} d={d}");
                last = p;
            }
        }
    }

    #[test]
    fn non_decreasing_in_capacity() {
        for beta_c in [0.0, 0.5, 1.0, 2.0] {
            let betas = Betas::new(-1.0, beta_c);
            let mut last = f64::NEG_INFINITY;
            for cap in 1..200 {
                let p = potential(25.0, cap as f64, betas);
                assert!(p >= last, "beta_c={beta_c} cap={cap}");
                last = p;
            }
        }
    }

    #[test]
    fn capacity_validation() {
        assert!(validate_capacity(5.0, -0.3).is_ok());
        assert!(validate_capacity(0.0, 2.0).is_ok());
        assert!(matches!(validate_capacity(0.0, 0.5), Err(AccError::DataIntegrity(_))));
        assert!(matches!(validate_capacity(-1.0, -1.0), Err(AccError::DataIntegrity(_))));
        assert!(matches!(validate_capacity(f64::NAN, 1.0), Err(AccError::DataIntegrity(_))));
    }
}

// ── Config ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use acc_core::{Config, ConfigGroup};
    use acc_spatial::PartitionMode;

    use super::*;

    fn base() -> ConfigGroup {
        ConfigGroup::new("GravityModel")
            .with("zones", "4.0")
            .with("partition", "symmetric")
            .with("betaDistance", -1.0)
            .with("betaCapacity", 0.5)
    }

    #[test]
    fn parses_required_and_defaults() {
        let cfg = GravityConfig::from_group(&base()).unwrap();
        assert_eq!(cfg.zones, 4);
        assert_eq!(cfg.partition, PartitionMode::Symmetric);
        assert_eq!(cfg.betas, BETAS);
        assert_eq!(cfg.sampling_rate_persons, 1.0);
        assert_eq!(cfg.sampling_type_shops, ShopSampling::All);
        assert_eq!(cfg.seed, 4711);
    }

    #[test]
    fn rejects_other_partitions() {
        let g = base().with("partition", "asymmetric");
        assert!(matches!(GravityConfig::from_group(&g), Err(AccError::Config(_))));
    }

    #[test]
    fn rejects_zero_zones() {
        let g = base().with("zones", 0);
        assert!(matches!(GravityConfig::from_group(&g), Err(AccError::Config(_))));
    }

    #[test]
    fn rejects_oversized_zones() {
        let g = base().with("zones", "1e10");
        assert!(matches!(GravityConfig::from_group(&g), Err(AccError::Config(_))));
        let g = base().with("zones", acc_spatial::MAX_ZONES_PER_AXIS + 1);
        assert!(matches!(GravityConfig::from_group(&g), Err(AccError::Config(_))));
    }

    #[test]
    fn missing_beta_is_config_error() {
        let mut g = ConfigGroup::new("GravityModel");
        g.set("zones", 2).set("partition", "symmetric").set("betaCapacity", 0.5);
        assert!(matches!(GravityConfig::from_group(&g), Err(AccError::Config(_))));
    }

    #[test]
    fn sampling_controls() {
        let g = base().with("samplingRatePersons", 0.0);
        assert!(GravityConfig::from_group(&g).is_err());
        let g = base().with("samplingTypeShops", "random");
        assert!(GravityConfig::from_group(&g).is_err());
        let g = base().with("samplingTypeShops", "random").with("samplingNumberShops", 3);
        let cfg = GravityConfig::from_group(&g).unwrap();
        assert_eq!(cfg.sampling_type_shops, ShopSampling::Random);
        assert_eq!(cfg.sampling_number_shops, Some(3));
        let g = base().with("samplingTypeShops", "nearest");
        assert!(GravityConfig::from_group(&g).is_err());
    }

    #[test]
    fn from_toml() {
        let config = Config::from_toml_str(
            r#"
            [GravityModel]
            zones = 3
            partition = "symmetric"
            betaDistance = -1.5
            betaCapacity = 0.25
            samplingTypeShops = "zone"
            seed = 7
            "#,
        )
        .unwrap();
        let cfg = GravityConfig::from_config(&config).unwrap();
        assert_eq!(cfg.zones, 3);
        assert_eq!(cfg.betas, Betas::new(-1.5, 0.25));
        assert_eq!(cfg.sampling_type_shops, ShopSampling::Zone);
        assert_eq!(cfg.seed, 7);
    }
}

// ── Cache ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod cache {
    use acc_core::PersonId;

    use super::*;
    use crate::GlobalUtilityCache;

    #[test]
    fn layout_change_clears_entries() {
        let mut cache = GlobalUtilityCache::new();
        assert!(cache.sync_layout(&[LinkId(0)]));
        cache.insert(PersonId(0), 3.0);
        assert_eq!(cache.get(PersonId(0)), Some(3.0));

        assert!(!cache.sync_layout(&[LinkId(0)]));
        assert_eq!(cache.get(PersonId(0)), Some(3.0));

        let before = cache.version();
        assert!(cache.sync_layout(&[LinkId(2)]));
        assert_eq!(cache.version(), before + 1);
        assert_eq!(cache.get(PersonId(0)), None);
        assert!(cache.is_empty());
    }
}

// ── Gravity model ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod model {
    use super::*;

    fn model<'a>(
        net: &'a Network,
        pop: &Population,
        fac: &'a ActivityFacilities,
        candidates: Vec<FacilityId>,
    ) -> GravityModel<'a> {
        GravityModel::new(GravityConfig::new(2, BETAS), net, pop, fac, candidates).unwrap()
    }

    #[test]
    fn three_person_scenario() {
        let net = network();
        let pop = three_persons();
        let (fac, cand, _) = facilities();
        let mut m = model(&net, &pop, &fac, vec![cand]);
        let score = m.compute_potential(&[LinkId(0)]).unwrap();

        let origin = Point::new(0.0, 0.0);
        let mut likelihoods = Vec::new();
        for &(person, home) in m.sampled_persons() {
            let d = home.distance(origin);
            let pers_potential = m.person_potential(home, 0, origin);
            assert_eq!(pers_potential, d.powf(-1.0) + 100f64.powf(0.5));
            let utility = m.global_utility(person, home, &[origin]).unwrap();
            assert_eq!(m.cache().get(person), Some(utility));
            likelihoods.push(pers_potential / utility);
        }
        assert_eq!(likelihoods.len(), 3);
        assert!(likelihoods[0] > likelihoods[1] && likelihoods[1] > likelihoods[2]);
        assert!(likelihoods.iter().all(|&l| l >= 0.0));
        assert_close(score, likelihoods.iter().sum());
    }

    #[test]
    fn lone_shop_gives_likelihood_one() {
        let net = network();
        let pop = three_persons();
        let mut fac = ActivityFacilities::new();
        let cand = shop(&mut fac, "cand", Point::new(0.0, 0.0), 100.0);
        let mut m = model(&net, &pop, &fac, vec![cand]);
        assert_close(m.compute_potential(&[LinkId(0)]).unwrap(), 3.0);
    }

    #[test]
    fn candidate_uses_link_location_in_denominator() {
        let net = network();
        let pop = three_persons();
        let (fac, cand, _) = facilities();
        let mut m = model(&net, &pop, &fac, vec![cand]);
        m.compute_potential(&[LinkId(2)]).unwrap();

        let at_link = Point::new(50.0, 0.0);
        let rival = Point::new(100.0, 0.0);
        for &(person, home) in m.sampled_persons() {
            let expected = crate::potential(home.distance(at_link), 100.0, BETAS)
                + crate::potential(home.distance(rival), 100.0, BETAS);
            assert_close(m.cache().get(person).unwrap(), expected);
        }
    }

    #[test]
    fn cache_recomputed_when_layout_changes() {
        let net = network();
        let pop = three_persons();
        let (fac, cand, _) = facilities();
        let mut m = model(&net, &pop, &fac, vec![cand]);

        let first = m.compute_potential(&[LinkId(0)]).unwrap();
        let version = m.cache().version();
        assert_eq!(m.cache().len(), 3);
        assert_close(m.compute_potential(&[LinkId(0)]).unwrap(), first);
        assert_eq!(m.cache().version(), version);

        let moved = m.compute_potential(&[LinkId(2)]).unwrap();
        assert_eq!(m.cache().version(), version + 1);

        let mut fresh = model(&net, &pop, &fac, vec![cand]);
        assert_close(fresh.compute_potential(&[LinkId(2)]).unwrap(), moved);
        assert!((first - moved).abs() > 1e-9);
    }

    #[test]
    fn score_is_order_invariant() {
        let net = network();
        let mut fac = ActivityFacilities::new();
        let c1 = shop(&mut fac, "c1", Point::new(0.0, 0.0), 100.0);
        let c2 = shop(&mut fac, "c2", Point::new(60.0, 0.0), 40.0);
        shop(&mut fac, "rival", Point::new(100.0, 0.0), 100.0);

        let pop = three_persons();
        let reversed = population(&[
            ("p30", Point::new(30.0, 0.0)),
            ("p20", Point::new(20.0, 0.0)),
            ("p10", Point::new(10.0, 0.0)),
        ]);

        let a = model(&net, &pop, &fac, vec![c1, c2]).compute_potential(&[LinkId(0), LinkId(2)]).unwrap();
        let b = model(&net, &pop, &fac, vec![c2, c1]).compute_potential(&[LinkId(2), LinkId(0)]).unwrap();
        let c = model(&net, &reversed, &fac, vec![c1, c2]).compute_potential(&[LinkId(0), LinkId(2)]).unwrap();
        assert_close(a, b);
        assert_close(a, c);
    }

    #[test]
    fn solution_errors_are_data_integrity() {
        let net = network();
        let pop = three_persons();
        let (fac, cand, _) = facilities();
        let mut m = model(&net, &pop, &fac, vec![cand]);
        assert!(matches!(
            m.compute_potential(&[LinkId(0), LinkId(1)]),
            Err(GravityError::Core(AccError::DataIntegrity(_)))
        ));
        assert!(matches!(
            m.compute_potential(&[LinkId(99)]),
            Err(GravityError::Core(AccError::DataIntegrity(_)))
        ));
    }

    #[test]
    fn candidate_without_shop_capacity_rejected() {
        let net = network();
        let pop = three_persons();
        let mut fac = ActivityFacilities::new();
        let f = fac.create_facility("bare", Point::new(0.0, 0.0)).unwrap();
        f.create_option("shop");
        let bare = f.id;
        let result = GravityModel::new(GravityConfig::new(2, BETAS), &net, &pop, &fac, vec![bare]);
        assert!(matches!(result, Err(GravityError::Core(AccError::DataIntegrity(_)))));
    }

    #[test]
    fn random_shop_sampling_of_zero_keeps_candidates_only() {
        let net = network();
        let pop = three_persons();
        let (fac, cand, _) = facilities();
        let mut cfg = GravityConfig::new(2, BETAS);
        cfg.sampling_type_shops = ShopSampling::Random;
        cfg.sampling_number_shops = Some(0);
        let mut m = GravityModel::new(cfg, &net, &pop, &fac, vec![cand]).unwrap();
        assert_close(m.compute_potential(&[LinkId(0)]).unwrap(), 3.0);
    }

    #[test]
    fn zone_shop_sampling_ignores_other_zones() {
        let net = network();
        let pop = three_persons();
        let (fac, cand, _) = facilities();
        let mut cfg = GravityConfig::new(2, BETAS);
        cfg.sampling_type_shops = ShopSampling::Zone;
        let mut m = GravityModel::new(cfg, &net, &pop, &fac, vec![cand]).unwrap();
        // The rival at (100, 0) lies in the other column of zones.
        assert_close(m.compute_potential(&[LinkId(0)]).unwrap(), 3.0);
    }

    #[test]
    fn person_sampling_is_deterministic() {
        let net = network();
        let homes: Vec<(String, Point)> =
            (0..200).map(|i| (format!("p{i}"), Point::new(i as f64, 0.0))).collect();
        let refs: Vec<(&str, Point)> = homes.iter().map(|(l, p)| (l.as_str(), *p)).collect();
        let pop = population(&refs);
        let (fac, cand, _) = facilities();

        let mut cfg = GravityConfig::new(2, BETAS);
        cfg.sampling_rate_persons = 0.5;
        let a = GravityModel::new(cfg.clone(), &net, &pop, &fac, vec![cand]).unwrap();
        let b = GravityModel::new(cfg, &net, &pop, &fac, vec![cand]).unwrap();
        assert_eq!(a.sampled_persons(), b.sampled_persons());
        assert!(a.sampled_persons().len() > 50 && a.sampled_persons().len() < 150);
    }
}
