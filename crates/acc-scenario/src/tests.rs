//! Unit tests for acc-scenario.

use std::io::Write;

use acc_core::{AccError, Point};

use crate::reader::{Tag, TagEvent, transition};
use crate::{
    ActivityFacilities, ActivityOption, DayType, OpeningTime, ParserState, ScenarioError,
    load_population_csv, load_population_reader, read_facilities, read_facilities_file,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const FACILITIES_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<facilities name="test town">
  <facility id="home_1" x="0.0" y="0.0">
    <activity type="h"/>
  </facility>
  <facility id="shop_1" x="100.0" y="50.0" desc="corner shop">
    <activity type="shop">
      <capacity value="40"/>
      <opentime day="wkday" start_time="08:00:00" end_time="12:00:00"/>
      <opentime day="wkday" start_time="13:30:00" end_time="19:00:00"/>
      <opentime day="sat" start_time="09:00" end_time="16:00"/>
    </activity>
    <attributes>
      <attribute name="owner">somebody</attribute>
    </attributes>
  </facility>
</facilities>
"#;

fn two_facilities() -> ActivityFacilities {
    let mut fac = ActivityFacilities::new();
    fac.create_facility("home_1", Point::new(0.0, 0.0)).unwrap().create_option("h");
    fac.create_facility("home_2", Point::new(30.0, 40.0)).unwrap().create_option("h");
    fac
}

// ── DayType ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod day_type {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(DayType::parse("WkDay").unwrap(), DayType::Wkday);
        assert_eq!(DayType::parse(" sun ").unwrap(), DayType::Sun);
    }

    #[test]
    fn parse_unknown_fails() {
        assert!(matches!(DayType::parse("someday"), Err(ScenarioError::Parse(_))));
    }

    #[test]
    fn groups_cover_their_days() {
        assert!(DayType::Wkday.covers(DayType::Wed));
        assert!(!DayType::Wkday.covers(DayType::Sat));
        assert!(DayType::Wkend.covers(DayType::Sun));
        assert!(DayType::Wk.covers(DayType::Mon));
        assert!(DayType::Tue.covers(DayType::Tue));
        assert!(!DayType::Tue.covers(DayType::Wed));
    }

    #[test]
    fn opening_times_on_filters_and_sorts() {
        let mut opt = ActivityOption::new("shop");
        opt.add_opening_time(OpeningTime::new(DayType::Wkday, 50_000.0, 60_000.0));
        opt.add_opening_time(OpeningTime::new(DayType::Sat, 30_000.0, 40_000.0));
        opt.add_opening_time(OpeningTime::new(DayType::Wed, 20_000.0, 30_000.0));

        let wed = opt.opening_times_on(DayType::Wed);
        assert_eq!(wed.len(), 2);
        assert_eq!(wed[0].start, 20_000.0);
        assert_eq!(wed[1].start, 50_000.0);
        assert!(opt.opening_times_on(DayType::Sun).is_empty());
    }
}

// ── Facilities ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod facilities {
    use super::*;

    #[test]
    fn duplicate_label_rejected() {
        let mut fac = ActivityFacilities::new();
        fac.create_facility("a", Point::new(0.0, 0.0)).unwrap();
        let err = fac.create_facility("a", Point::new(1.0, 1.0)).unwrap_err();
        assert!(matches!(err, ScenarioError::Duplicate { kind: "facility", .. }));
        assert_eq!(fac.len(), 1);
    }

    #[test]
    fn capacity_errors_are_data_integrity() {
        let mut fac = ActivityFacilities::new();
        let f = fac.create_facility("s", Point::new(0.0, 0.0)).unwrap();
        f.create_option("shop");
        f.add_option(ActivityOption::new("leisure").with_capacity(12.0));

        let f = fac.get(fac.lookup("s").unwrap());
        assert_eq!(f.capacity("leisure").unwrap(), 12.0);
        assert!(matches!(f.capacity("shop"), Err(AccError::DataIntegrity(_))));
        assert!(matches!(f.capacity("work"), Err(AccError::DataIntegrity(_))));
        assert_eq!(f.capacity_or("shop", 1.0).unwrap(), 1.0);
        assert!(f.capacity_or("work", 1.0).is_err());
    }

    #[test]
    fn activity_types_in_first_appearance_order() {
        let mut fac = ActivityFacilities::new();
        fac.create_facility("a", Point::new(0.0, 0.0)).unwrap().create_option("work");
        let b = fac.create_facility("b", Point::new(0.0, 0.0)).unwrap();
        b.create_option("shop");
        b.create_option("work");
        assert_eq!(fac.activity_types(), vec!["work".to_string(), "shop".to_string()]);
        assert_eq!(fac.ids_with_activity("work").len(), 2);
        assert_eq!(fac.ids_with_activity("shop").len(), 1);
    }
}

// ── Parser state machine ──────────────────────────────────────────────────────

#[cfg(test)]
mod state_machine {
    use super::*;
    use ParserState as S;
    use TagEvent::{End, Start};

    #[test]
    fn nesting_walks_down_and_back_up() {
        let events = [
            Start(Tag::Facilities),
            Start(Tag::Facility),
            Start(Tag::Activity),
            Start(Tag::Capacity),
            End(Tag::Capacity),
            End(Tag::Activity),
            End(Tag::Facility),
            End(Tag::Facilities),
        ];
        let expected = [
            S::InFacilities,
            S::InFacility,
            S::InActivity,
            S::InActivity,
            S::InActivity,
            S::InFacility,
            S::InFacilities,
            S::None,
        ];
        let mut state = S::None;
        for (ev, want) in events.into_iter().zip(expected) {
            state = transition(state, ev).unwrap();
            assert_eq!(state, want, "after {ev:?}");
        }
    }

    #[test]
    fn illegal_nesting_rejected() {
        assert!(transition(S::None, Start(Tag::Facility)).is_none());
        assert!(transition(S::InFacilities, Start(Tag::Activity)).is_none());
        assert!(transition(S::InFacility, Start(Tag::Capacity)).is_none());
        assert!(transition(S::InFacility, End(Tag::Activity)).is_none());
    }

    #[test]
    fn unknown_tags_keep_state() {
        for s in [S::None, S::InFacilities, S::InFacility, S::InActivity] {
            assert_eq!(transition(s, Start(Tag::Other)), Some(s));
            assert_eq!(transition(s, End(Tag::Other)), Some(s));
        }
    }

    #[test]
    fn tag_names() {
        assert_eq!(Tag::from_name("opentime"), Tag::Opentime);
        assert_eq!(Tag::from_name("attributes"), Tag::Other);
    }
}

// ── XML reader ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod xml_reader {
    use super::*;

    #[test]
    fn reads_facilities_options_and_times() {
        let fac = read_facilities(FACILITIES_XML.as_bytes()).unwrap();
        assert_eq!(fac.name.as_deref(), Some("test town"));
        assert_eq!(fac.len(), 2);

        let home = fac.get(fac.lookup("home_1").unwrap());
        assert!(home.has_activity("h"));
        assert_eq!(home.option("h").unwrap().capacity, None);

        let shop = fac.get(fac.lookup("shop_1").unwrap());
        assert_eq!(shop.coord, Point::new(100.0, 50.0));
        assert_eq!(shop.desc.as_deref(), Some("corner shop"));
        assert_eq!(shop.capacity("shop").unwrap(), 40.0);

        let opt = shop.option("shop").unwrap();
        assert_eq!(opt.opening_times.len(), 3);
        let fri = opt.opening_times_on(DayType::Fri);
        assert_eq!(fri.len(), 2);
        assert_eq!(fri[0].start, 8.0 * 3600.0);
        assert_eq!(fri[1].end, 19.0 * 3600.0);
        assert_eq!(opt.opening_times_on(DayType::Sat)[0].start, 9.0 * 3600.0);
    }

    #[test]
    fn misplaced_element_is_parse_error() {
        let xml = r#"<facilities><activity type="shop"/></facilities>"#;
        assert!(matches!(read_facilities(xml.as_bytes()), Err(ScenarioError::Parse(_))));
    }

    #[test]
    fn truncated_document_fails() {
        let xml = r#"<facilities><facility id="a" x="0" y="0">"#;
        assert!(read_facilities(xml.as_bytes()).is_err());
    }

    #[test]
    fn missing_coordinate_fails() {
        let xml = r#"<facilities><facility id="a" x="0"/></facilities>"#;
        assert!(matches!(read_facilities(xml.as_bytes()), Err(ScenarioError::Parse(_))));
    }

    #[test]
    fn duplicate_facility_fails() {
        let xml = r#"<facilities>
            <facility id="a" x="0" y="0"/>
            <facility id="a" x="1" y="1"/>
        </facilities>"#;
        assert!(matches!(
            read_facilities(xml.as_bytes()),
            Err(ScenarioError::Duplicate { .. })
        ));
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FACILITIES_XML.as_bytes()).unwrap();
        let fac = read_facilities_file(file.path()).unwrap();
        assert_eq!(fac.len(), 2);
    }
}

// ── Population CSV loader ─────────────────────────────────────────────────────

#[cfg(test)]
mod population_loader {
    use super::*;

    #[test]
    fn groups_rows_by_person_and_plan() {
        let csv = "\
person_id,plan,activity_type,x,y,facility_id,end_time
p1,0,h,,,home_1,08:00:00
p1,0,w,2500.0,300.0,,17:30:00
p2,1,h,5.0,5.0,,
p1,0,h,,,home_1,
p2,0,h,,,home_2,07:45
";
        let fac = two_facilities();
        let pop = load_population_reader(csv.as_bytes(), &fac).unwrap();
        assert_eq!(pop.len(), 2);

        let p1 = pop.get(pop.lookup("p1").unwrap());
        assert_eq!(p1.plans().len(), 1);
        let plan = p1.selected_plan().unwrap();
        assert_eq!(plan.activities.len(), 3);
        assert_eq!(plan.activities[0].end_time, Some(8.0 * 3600.0));
        assert_eq!(plan.activities[1].coord, Point::new(2500.0, 300.0));
        assert_eq!(plan.activities[2].end_time, None);
        assert_eq!(p1.home(&fac), Some(Point::new(0.0, 0.0)));

        // Plan 0 sorts before plan 1 even though it appears later.
        let p2 = pop.get(pop.lookup("p2").unwrap());
        assert_eq!(p2.plans().len(), 2);
        assert_eq!(p2.home(&fac), Some(Point::new(30.0, 40.0)));
    }

    #[test]
    fn persons_keep_first_appearance_order() {
        let csv = "\
person_id,plan,activity_type,x,y,facility_id,end_time
zed,0,h,1,1,,
amy,0,h,2,2,,
";
        let pop = load_population_reader(csv.as_bytes(), &ActivityFacilities::new()).unwrap();
        let labels: Vec<&str> = pop.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["zed", "amy"]);
    }

    #[test]
    fn unknown_facility_is_data_integrity_error() {
        let csv = "\
person_id,plan,activity_type,x,y,facility_id,end_time
p1,0,h,,,nowhere,
";
        let err = load_population_reader(csv.as_bytes(), &two_facilities()).unwrap_err();
        assert!(matches!(err, ScenarioError::Core(AccError::DataIntegrity(_))));
    }

    #[test]
    fn activity_without_location_fails() {
        let csv = "\
person_id,plan,activity_type,x,y,facility_id,end_time
p1,0,h,,,,
";
        let err = load_population_reader(csv.as_bytes(), &two_facilities()).unwrap_err();
        assert!(matches!(err, ScenarioError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "person_id,plan,activity_type,x,y,facility_id,end_time").unwrap();
        writeln!(file, "p1,0,h,,,home_2,").unwrap();
        let pop = load_population_csv(file.path(), &two_facilities()).unwrap();
        assert_eq!(pop.len(), 1);
    }
}
