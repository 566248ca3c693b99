//! Synthetic town used when no network file is given.
//!
//! A 6×6 lattice of two-way streets with 250 m blocks, homes on every
//! block corner off the main street, a handful of shops along the main
//! street, and two leisure facilities with opening hours.

use anyhow::Result;

use acc_core::Point;
use acc_scenario::{ActivityFacilities, ActivityOption, DayType, OpeningTime};
use acc_spatial::{Network, NetworkBuilder};

pub const BLOCK_M:     f64   = 250.0;
pub const LATTICE:     usize = 6;
/// ~40 km/h on side streets, ~60 km/h on the main street (row 2).
const SIDE_SPEED_MPS: f64 = 11.1;
const MAIN_SPEED_MPS: f64 = 16.7;
const MAIN_ROW:       usize = 2;

pub fn build_network() -> Network {
    let mut b = NetworkBuilder::with_capacity(LATTICE * LATTICE, 4 * LATTICE * LATTICE);
    let mut nodes = Vec::with_capacity(LATTICE * LATTICE);
    for j in 0..LATTICE {
        for i in 0..LATTICE {
            let pos = Point::new(i as f64 * BLOCK_M, j as f64 * BLOCK_M);
            nodes.push(b.add_node(format!("n{i}_{j}"), pos));
        }
    }

    for j in 0..LATTICE {
        for i in 0..LATTICE {
            let here = nodes[j * LATTICE + i];
            if i + 1 < LATTICE {
                let speed = if j == MAIN_ROW { MAIN_SPEED_MPS } else { SIDE_SPEED_MPS };
                b.add_road(here, nodes[j * LATTICE + i + 1], BLOCK_M, speed);
            }
            if j + 1 < LATTICE {
                b.add_road(here, nodes[(j + 1) * LATTICE + i], BLOCK_M, SIDE_SPEED_MPS);
            }
        }
    }
    b.build()
}

pub fn build_facilities() -> Result<ActivityFacilities> {
    let mut fac = ActivityFacilities::new();
    fac.name = Some("lattice town".into());

    // Homes sit half a block off every node outside the main street.
    for j in (0..LATTICE).filter(|&j| j != MAIN_ROW) {
        for i in 0..LATTICE {
            let coord = Point::new(i as f64 * BLOCK_M + 40.0, j as f64 * BLOCK_M + 60.0);
            fac.create_facility(format!("home_{i}_{j}"), coord)?.create_option("h");
        }
    }

    // (label, column, capacity in m² sales area)
    let shops = [("grocer", 1, 400.0), ("bakery", 2, 60.0), ("market", 4, 1_200.0), ("kiosk", 5, 20.0)];
    for (label, i, capacity) in shops {
        let coord = Point::new(i as f64 * BLOCK_M, MAIN_ROW as f64 * BLOCK_M + 15.0);
        let mut option = ActivityOption::new("shop").with_capacity(capacity);
        option.add_opening_time(OpeningTime::new(DayType::Wkday, 8.0 * 3600.0, 20.0 * 3600.0));
        fac.create_facility(label, coord)?.add_option(option);
    }

    // The cinema has no capacity and counts as 1.
    let mut cinema = ActivityOption::new("leisure");
    cinema.add_opening_time(OpeningTime::new(DayType::Wk, 14.0 * 3600.0, 23.0 * 3600.0));
    fac.create_facility("cinema", Point::new(3.0 * BLOCK_M, 4.0 * BLOCK_M))?.add_option(cinema);
    fac.create_facility("park", Point::new(0.5 * BLOCK_M, 0.5 * BLOCK_M))?
        .add_option(ActivityOption::new("leisure").with_capacity(50.0));

    Ok(fac)
}
