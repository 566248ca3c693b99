//! CSV population loader.
//!
//! # CSV format
//!
//! One row per activity.  Rows of the same person and plan keep their file
//! order; plans are ordered by their `plan` index.
//!
//! ```csv
//! person_id,plan,activity_type,x,y,facility_id,end_time
//! p1,0,h,0.0,0.0,home_1,08:00:00
//! p1,0,w,2500.0,300.0,,17:30:00
//! p1,0,h,0.0,0.0,home_1,
//! p2,0,h,,,home_2,07:45:00
//! ```
//!
//! `facility_id`, `end_time`, and the coordinates are optional.  An
//! activity with no coordinates takes its facility's coordinate; an
//! activity with neither is a parse error.  Facility ids must exist in the
//! supplied [`ActivityFacilities`].
//!
//! The first plan of every person is selected.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use acc_core::{AccError, Point, parse_time};

use crate::population::{Activity, Plan, Population};
use crate::{ActivityFacilities, ScenarioError, ScenarioResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PopulationRecord {
    person_id:     String,
    plan:          u32,
    activity_type: String,
    x:             Option<f64>,
    y:             Option<f64>,
    facility_id:   Option<String>,
    end_time:      Option<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a [`Population`] from a CSV file.
pub fn load_population_csv(
    path: &Path,
    facilities: &ActivityFacilities,
) -> ScenarioResult<Population> {
    let file = std::fs::File::open(path)?;
    let population = load_population_reader(file, facilities)?;
    log::info!("loaded {} persons from {}", population.len(), path.display());
    Ok(population)
}

/// Like [`load_population_csv`] but accepts any `Read` source.
pub fn load_population_reader<R: Read>(
    reader: R,
    facilities: &ActivityFacilities,
) -> ScenarioResult<Population> {
    // ── Group rows by person, then plan ───────────────────────────────────
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut order: Vec<String> = Vec::new();
    let mut by_person: HashMap<String, BTreeMap<u32, Vec<Activity>>> = HashMap::new();

    for result in csv_reader.deserialize::<PopulationRecord>() {
        let row = result?;
        let activity = to_activity(&row, facilities)?;
        let plans = by_person.entry(row.person_id.clone()).or_insert_with(|| {
            order.push(row.person_id.clone());
            BTreeMap::new()
        });
        plans.entry(row.plan).or_default().push(activity);
    }

    // ── Build persons in order of first appearance ────────────────────────
    let mut population = Population::new();
    for label in order {
        let plans = by_person.remove(&label).unwrap_or_default();
        let person = population.create_person(label)?;
        for (_, activities) in plans {
            person.add_plan(Plan::new(activities));
        }
        person.select_plan(0);
    }
    Ok(population)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn to_activity(row: &PopulationRecord, facilities: &ActivityFacilities) -> ScenarioResult<Activity> {
    let facility = match row.facility_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(label) => Some(facilities.lookup(label).ok_or_else(|| {
            AccError::DataIntegrity(format!(
                "person {:?} references unknown facility {label:?}",
                row.person_id
            ))
        })?),
    };

    let coord = match (row.x, row.y, facility) {
        (Some(x), Some(y), _) => Point::new(x, y),
        (_, _, Some(f)) => facilities.get(f).coord,
        _ => {
            return Err(ScenarioError::Parse(format!(
                "activity {:?} of person {:?} has neither coordinates nor a facility",
                row.activity_type, row.person_id
            )));
        }
    };

    let end_time = match row.end_time.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(t) => Some(parse_time(t)?),
    };

    Ok(Activity { activity_type: row.activity_type.clone(), coord, facility, end_time })
}
