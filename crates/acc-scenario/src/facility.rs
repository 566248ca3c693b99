//! Facilities, activity options, and opening times.
//!
//! A [`Facility`] is a fixed location offering one or more activity types.
//! Each type is described by an [`ActivityOption`] carrying an optional
//! capacity and a list of opening-time intervals.  Facilities are created
//! while a scenario loads and are read-only afterwards.

use std::collections::{BTreeMap, HashMap};

use acc_core::{AccError, AccResult, FacilityId, Point};

use crate::{ScenarioError, ScenarioResult};

// ── DayType ───────────────────────────────────────────────────────────────────

/// Day (or group of days) an opening-time interval applies to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum DayType {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
    /// Monday to Friday.
    Wkday,
    /// Saturday and Sunday.
    Wkend,
    /// Every day.
    Wk,
}

impl DayType {
    const ALL: [DayType; 10] = [
        DayType::Mon, DayType::Tue, DayType::Wed, DayType::Thu, DayType::Fri,
        DayType::Sat, DayType::Sun, DayType::Wkday, DayType::Wkend, DayType::Wk,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DayType::Mon   => "mon",
            DayType::Tue   => "tue",
            DayType::Wed   => "wed",
            DayType::Thu   => "thu",
            DayType::Fri   => "fri",
            DayType::Sat   => "sat",
            DayType::Sun   => "sun",
            DayType::Wkday => "wkday",
            DayType::Wkend => "wkend",
            DayType::Wk    => "wk",
        }
    }

    /// Case-insensitive parse of the day names used in facility files.
    pub fn parse(s: &str) -> ScenarioResult<DayType> {
        let s = s.trim();
        DayType::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ScenarioError::Parse(format!("cannot detect day type for {s:?}")))
    }

    /// `true` if an interval declared for `self` is in effect on `day`.
    pub fn covers(self, day: DayType) -> bool {
        if self == day {
            return true;
        }
        match self {
            DayType::Wk => true,
            DayType::Wkday => matches!(
                day,
                DayType::Mon | DayType::Tue | DayType::Wed | DayType::Thu | DayType::Fri
            ),
            DayType::Wkend => matches!(day, DayType::Sat | DayType::Sun),
            _ => false,
        }
    }
}

// ── OpeningTime ───────────────────────────────────────────────────────────────

/// One opening interval in seconds since midnight.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OpeningTime {
    pub day:   DayType,
    pub start: f64,
    pub end:   f64,
}

impl OpeningTime {
    pub fn new(day: DayType, start: f64, end: f64) -> Self {
        Self { day, start, end }
    }
}

// ── ActivityOption ────────────────────────────────────────────────────────────

/// What a facility offers for one activity type.
#[derive(Clone, Debug, PartialEq)]
pub struct ActivityOption {
    pub activity_type: String,
    /// `None` when the facility file gives no `<capacity>` element.
    pub capacity:      Option<f64>,
    pub opening_times: Vec<OpeningTime>,
}

impl ActivityOption {
    pub fn new(activity_type: impl Into<String>) -> Self {
        Self { activity_type: activity_type.into(), capacity: None, opening_times: Vec::new() }
    }

    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn add_opening_time(&mut self, time: OpeningTime) {
        self.opening_times.push(time);
    }

    /// Intervals in effect on `day`, sorted by start time.
    pub fn opening_times_on(&self, day: DayType) -> Vec<OpeningTime> {
        let mut times: Vec<OpeningTime> = self
            .opening_times
            .iter()
            .filter(|t| t.day.covers(day))
            .copied()
            .collect();
        times.sort_by(|a, b| a.start.total_cmp(&b.start));
        times
    }
}

// ── Facility ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Facility {
    pub id:    FacilityId,
    /// External id as given in the scenario files.
    pub label: String,
    pub coord: Point,
    pub desc:  Option<String>,
    options:   BTreeMap<String, ActivityOption>,
}

impl Facility {
    fn new(id: FacilityId, label: String, coord: Point) -> Self {
        Self { id, label, coord, desc: None, options: BTreeMap::new() }
    }

    /// Return the option for `activity_type`, creating an empty one if needed.
    pub fn create_option(&mut self, activity_type: &str) -> &mut ActivityOption {
        self.options
            .entry(activity_type.to_owned())
            .or_insert_with(|| ActivityOption::new(activity_type))
    }

    /// Insert or replace a fully built option.
    pub fn add_option(&mut self, option: ActivityOption) {
        self.options.insert(option.activity_type.clone(), option);
    }

    pub fn option(&self, activity_type: &str) -> Option<&ActivityOption> {
        self.options.get(activity_type)
    }

    pub fn option_mut(&mut self, activity_type: &str) -> Option<&mut ActivityOption> {
        self.options.get_mut(activity_type)
    }

    pub fn has_activity(&self, activity_type: &str) -> bool {
        self.options.contains_key(activity_type)
    }

    pub fn options(&self) -> impl Iterator<Item = &ActivityOption> {
        self.options.values()
    }

    /// Capacity of the `activity_type` option.
    ///
    /// Fails with [`AccError::DataIntegrity`] if the facility does not offer
    /// the activity or the option has no capacity.
    pub fn capacity(&self, activity_type: &str) -> AccResult<f64> {
        self.require_option(activity_type)?.capacity.ok_or_else(|| {
            AccError::DataIntegrity(format!(
                "facility {:?} has no capacity for activity {activity_type:?}",
                self.label
            ))
        })
    }

    /// Like [`capacity`](Self::capacity) but an option without a capacity
    /// counts as `default`.  A missing option is still an error.
    pub fn capacity_or(&self, activity_type: &str, default: f64) -> AccResult<f64> {
        Ok(self.require_option(activity_type)?.capacity.unwrap_or(default))
    }

    fn require_option(&self, activity_type: &str) -> AccResult<&ActivityOption> {
        self.option(activity_type).ok_or_else(|| {
            AccError::DataIntegrity(format!(
                "facility {:?} has no activity option {activity_type:?}",
                self.label
            ))
        })
    }
}

// ── ActivityFacilities ────────────────────────────────────────────────────────

/// All facilities of a scenario, indexed by [`FacilityId`] and label.
#[derive(Clone, Debug, Default)]
pub struct ActivityFacilities {
    pub name:   Option<String>,
    facilities: Vec<Facility>,
    by_label:   HashMap<String, FacilityId>,
}

impl ActivityFacilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a facility and return it for further setup.
    pub fn create_facility(
        &mut self,
        label: impl Into<String>,
        coord: Point,
    ) -> ScenarioResult<&mut Facility> {
        let label = label.into();
        if self.by_label.contains_key(&label) {
            return Err(ScenarioError::Duplicate { kind: "facility", label });
        }
        let id = FacilityId::try_from(self.facilities.len())
            .map_err(|_| ScenarioError::Parse("too many facilities".into()))?;
        self.by_label.insert(label.clone(), id);
        self.facilities.push(Facility::new(id, label, coord));
        Ok(&mut self.facilities[id.index()])
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    /// # Panics
    /// Panics if `id` was not issued by this container.
    #[inline]
    pub fn get(&self, id: FacilityId) -> &Facility {
        &self.facilities[id.index()]
    }

    pub fn get_mut(&mut self, id: FacilityId) -> Option<&mut Facility> {
        self.facilities.get_mut(id.index())
    }

    pub fn lookup(&self, label: &str) -> Option<FacilityId> {
        self.by_label.get(label).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Facility> {
        self.facilities.iter()
    }

    /// Facilities offering `activity_type`, in id order.
    pub fn with_activity<'a>(&'a self, activity_type: &'a str) -> impl Iterator<Item = &'a Facility> + 'a {
        self.facilities.iter().filter(move |f| f.has_activity(activity_type))
    }

    pub fn ids_with_activity(&self, activity_type: &str) -> Vec<FacilityId> {
        self.with_activity(activity_type).map(|f| f.id).collect()
    }

    /// Every activity type offered anywhere, in order of first appearance.
    pub fn activity_types(&self) -> Vec<String> {
        let mut types: Vec<String> = Vec::new();
        for f in &self.facilities {
            for opt in f.options() {
                if !types.contains(&opt.activity_type) {
                    types.push(opt.activity_type.clone());
                }
            }
        }
        types
    }
}
