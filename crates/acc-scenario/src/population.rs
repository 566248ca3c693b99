//! Persons, plans, and activities.
//!
//! Only the parts of a daily plan that the accessibility and gravity
//! computations read are modelled: the ordered activities of each plan,
//! their coordinates and optional facility references.  Legs and routes
//! are not represented.

use std::collections::HashMap;

use acc_core::{FacilityId, PersonId, Point};

use crate::{ActivityFacilities, ScenarioError, ScenarioResult};

/// One activity of a plan.
#[derive(Clone, Debug, PartialEq)]
pub struct Activity {
    pub activity_type: String,
    pub coord:         Point,
    pub facility:      Option<FacilityId>,
    /// Planned end time in seconds since midnight; `None` for the last
    /// activity of the day.
    pub end_time:      Option<f64>,
}

impl Activity {
    pub fn new(activity_type: impl Into<String>, coord: Point) -> Self {
        Self { activity_type: activity_type.into(), coord, facility: None, end_time: None }
    }

    pub fn at_facility(mut self, facility: FacilityId) -> Self {
        self.facility = Some(facility);
        self
    }

    /// Location used for distance computations: the facility's coordinate
    /// when the activity references one, otherwise its own coordinate.
    pub fn location(&self, facilities: &ActivityFacilities) -> Point {
        match self.facility {
            Some(f) => facilities.get(f).coord,
            None => self.coord,
        }
    }
}

/// An ordered daily plan.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Plan {
    pub activities: Vec<Activity>,
}

impl Plan {
    pub fn new(activities: Vec<Activity>) -> Self {
        Self { activities }
    }

    pub fn first_activity(&self) -> Option<&Activity> {
        self.activities.first()
    }
}

#[derive(Clone, Debug)]
pub struct Person {
    pub id:    PersonId,
    pub label: String,
    plans:     Vec<Plan>,
    selected:  usize,
}

impl Person {
    fn new(id: PersonId, label: String) -> Self {
        Self { id, label, plans: Vec::new(), selected: 0 }
    }

    pub fn add_plan(&mut self, plan: Plan) {
        self.plans.push(plan);
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    /// Make plan `index` the selected one.  Out-of-range indices are ignored.
    pub fn select_plan(&mut self, index: usize) {
        if index < self.plans.len() {
            self.selected = index;
        }
    }

    pub fn selected_plan(&self) -> Option<&Plan> {
        self.plans.get(self.selected)
    }

    /// First activity of the selected plan, conventionally the home anchor.
    pub fn first_activity(&self) -> Option<&Activity> {
        self.selected_plan().and_then(Plan::first_activity)
    }

    /// Home location: the first activity's facility coordinate, falling
    /// back to the activity coordinate.  `None` for persons without plans.
    pub fn home(&self, facilities: &ActivityFacilities) -> Option<Point> {
        self.first_activity().map(|a| a.location(facilities))
    }
}

// ── Population ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct Population {
    persons:  Vec<Person>,
    by_label: HashMap<String, PersonId>,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_person(&mut self, label: impl Into<String>) -> ScenarioResult<&mut Person> {
        let label = label.into();
        if self.by_label.contains_key(&label) {
            return Err(ScenarioError::Duplicate { kind: "person", label });
        }
        let id = PersonId::try_from(self.persons.len())
            .map_err(|_| ScenarioError::Parse("too many persons".into()))?;
        self.by_label.insert(label.clone(), id);
        self.persons.push(Person::new(id, label));
        Ok(&mut self.persons[id.index()])
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// # Panics
    /// Panics if `id` was not issued by this population.
    #[inline]
    pub fn get(&self, id: PersonId) -> &Person {
        &self.persons[id.index()]
    }

    pub fn lookup(&self, label: &str) -> Option<PersonId> {
        self.by_label.get(label).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Person> {
        self.persons.iter()
    }
}
