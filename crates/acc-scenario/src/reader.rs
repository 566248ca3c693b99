//! Facilities XML reader.
//!
//! # File format
//!
//! ```xml
//! <facilities name="example">
//!   <facility id="1" x="100.0" y="200.0" desc="corner shop">
//!     <activity type="shop">
//!       <capacity value="50"/>
//!       <opentime day="wkday" start_time="08:00:00" end_time="19:00:00"/>
//!     </activity>
//!   </facility>
//! </facilities>
//! ```
//!
//! # Structure
//!
//! Parsing is split in two layers:
//!
//! - [`FacilitiesParser`] is an explicit state machine over tag events.  It
//!   knows nothing about XML tokenizing; its transitions are the pure
//!   function [`transition`].
//! - [`read_facilities`] drives the parser from `quick-xml` events.  Empty
//!   elements (`<capacity .../>`) are fed as a start tag followed by an end
//!   tag.
//!
//! Elements not listed in [`Tag`] (e.g. `<attributes>`) are skipped without
//! changing state.

use std::io::BufRead;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use acc_core::{FacilityId, Point, parse_time};

use crate::facility::{ActivityFacilities, DayType, OpeningTime};
use crate::{ScenarioError, ScenarioResult};

// ── States and tags ───────────────────────────────────────────────────────────

/// Where the parser is in the element hierarchy.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ParserState {
    None,
    InFacilities,
    InFacility,
    InActivity,
}

/// Element names the parser reacts to.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Tag {
    Facilities,
    Facility,
    Activity,
    Capacity,
    Opentime,
    Other,
}

impl Tag {
    pub fn from_name(name: &str) -> Tag {
        match name {
            "facilities" => Tag::Facilities,
            "facility"   => Tag::Facility,
            "activity"   => Tag::Activity,
            "capacity"   => Tag::Capacity,
            "opentime"   => Tag::Opentime,
            _            => Tag::Other,
        }
    }
}

/// A start or end tag, stripped of attributes.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TagEvent {
    Start(Tag),
    End(Tag),
}

/// Transition table.  Returns `None` for events that are not legal in
/// `state`.
pub fn transition(state: ParserState, event: TagEvent) -> Option<ParserState> {
    use ParserState as S;
    use TagEvent::{End, Start};

    match (state, event) {
        (s, Start(Tag::Other) | End(Tag::Other)) => Some(s),

        (S::None, Start(Tag::Facilities))        => Some(S::InFacilities),
        (S::InFacilities, Start(Tag::Facility))  => Some(S::InFacility),
        (S::InFacility, Start(Tag::Activity))    => Some(S::InActivity),
        (S::InActivity, Start(Tag::Capacity | Tag::Opentime)) => Some(S::InActivity),

        (S::InActivity, End(Tag::Capacity | Tag::Opentime)) => Some(S::InActivity),
        (S::InActivity, End(Tag::Activity))      => Some(S::InFacility),
        (S::InFacility, End(Tag::Facility))      => Some(S::InFacilities),
        (S::InFacilities, End(Tag::Facilities))  => Some(S::None),

        _ => None,
    }
}

// ── Attributes ────────────────────────────────────────────────────────────────

/// Decoded attributes of one start tag.
#[derive(Clone, Debug, Default)]
pub struct TagAttributes(Vec<(String, String)>);

impl TagAttributes {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    fn require(&self, tag: &str, key: &str) -> ScenarioResult<&str> {
        self.get(key).ok_or_else(|| {
            ScenarioError::Parse(format!("<{tag}> is missing attribute {key:?}"))
        })
    }

    fn require_f64(&self, tag: &str, key: &str) -> ScenarioResult<f64> {
        let raw = self.require(tag, key)?;
        raw.trim().parse::<f64>().map_err(|_| {
            ScenarioError::Parse(format!("<{tag}> attribute {key:?} is not a number: {raw:?}"))
        })
    }
}

// ── FacilitiesParser ──────────────────────────────────────────────────────────

/// Builds [`ActivityFacilities`] from a stream of tag events.
pub struct FacilitiesParser {
    state:            ParserState,
    facilities:       ActivityFacilities,
    current_facility: Option<FacilityId>,
    current_activity: Option<String>,
}

impl FacilitiesParser {
    pub fn new() -> Self {
        Self {
            state:            ParserState::None,
            facilities:       ActivityFacilities::new(),
            current_facility: None,
            current_activity: None,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn start_tag(&mut self, name: &str, attrs: &TagAttributes) -> ScenarioResult<()> {
        let tag = Tag::from_name(name);
        let next = self.advance(TagEvent::Start(tag), name)?;

        match tag {
            Tag::Facilities => {
                self.facilities.name = attrs.get("name").map(str::to_owned);
                if attrs.get("aggregation_layer").is_some() {
                    log::warn!("aggregation_layer is deprecated and ignored");
                }
            }
            Tag::Facility => {
                let label = attrs.require(name, "id")?;
                let coord = Point::new(attrs.require_f64(name, "x")?, attrs.require_f64(name, "y")?);
                let facility = self.facilities.create_facility(label, coord)?;
                facility.desc = attrs.get("desc").map(str::to_owned);
                self.current_facility = Some(facility.id);
            }
            Tag::Activity => {
                let activity_type = attrs.require(name, "type")?.to_owned();
                self.current_facility_mut()?.create_option(&activity_type);
                self.current_activity = Some(activity_type);
            }
            Tag::Capacity => {
                let value = attrs.require_f64(name, "value")?;
                self.current_option_mut()?.capacity = Some(value);
            }
            Tag::Opentime => {
                let day   = DayType::parse(attrs.require(name, "day")?)?;
                let start = parse_time(attrs.require(name, "start_time")?)?;
                let end   = parse_time(attrs.require(name, "end_time")?)?;
                self.current_option_mut()?.add_opening_time(OpeningTime::new(day, start, end));
            }
            Tag::Other => {}
        }

        self.state = next;
        Ok(())
    }

    pub fn end_tag(&mut self, name: &str) -> ScenarioResult<()> {
        let tag = Tag::from_name(name);
        let next = self.advance(TagEvent::End(tag), name)?;
        match tag {
            Tag::Facility => self.current_facility = None,
            Tag::Activity => self.current_activity = None,
            _ => {}
        }
        self.state = next;
        Ok(())
    }

    /// Finish parsing.  Fails if the document ended inside an element.
    pub fn finish(self) -> ScenarioResult<ActivityFacilities> {
        if self.state != ParserState::None {
            return Err(ScenarioError::Parse(format!(
                "unexpected end of document in state {:?}",
                self.state
            )));
        }
        Ok(self.facilities)
    }

    fn advance(&self, event: TagEvent, name: &str) -> ScenarioResult<ParserState> {
        transition(self.state, event).ok_or_else(|| {
            ScenarioError::Parse(format!("unexpected {event:?} (<{name}>) in state {:?}", self.state))
        })
    }

    fn current_facility_mut(&mut self) -> ScenarioResult<&mut crate::Facility> {
        self.current_facility
            .and_then(|id| self.facilities.get_mut(id))
            .ok_or_else(|| ScenarioError::Parse("no open <facility>".into()))
    }

    fn current_option_mut(&mut self) -> ScenarioResult<&mut crate::ActivityOption> {
        let activity_type = self
            .current_activity
            .clone()
            .ok_or_else(|| ScenarioError::Parse("no open <activity>".into()))?;
        self.current_facility_mut()?
            .option_mut(&activity_type)
            .ok_or_else(|| ScenarioError::Parse(format!("activity {activity_type:?} vanished")))
    }
}

impl Default for FacilitiesParser {
    fn default() -> Self {
        Self::new()
    }
}

// ── quick-xml driver ──────────────────────────────────────────────────────────

/// Parse a facilities file from disk.
pub fn read_facilities_file(path: &Path) -> ScenarioResult<ActivityFacilities> {
    let file = std::fs::File::open(path)?;
    let facilities = read_facilities(std::io::BufReader::new(file))?;
    log::info!("read {} facilities from {}", facilities.len(), path.display());
    Ok(facilities)
}

/// Parse facilities from any buffered reader.
pub fn read_facilities<R: BufRead>(source: R) -> ScenarioResult<ActivityFacilities> {
    let mut reader = Reader::from_reader(source);
    reader.config_mut().trim_text(true);

    let mut parser = FacilitiesParser::new();
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|source| ScenarioError::Xml { position: reader.buffer_position() as u64, source })?;

        match event {
            Event::Start(e) => {
                let (name, attrs) = decode_start(&e)?;
                parser.start_tag(&name, &attrs)?;
            }
            Event::Empty(e) => {
                let (name, attrs) = decode_start(&e)?;
                parser.start_tag(&name, &attrs)?;
                parser.end_tag(&name)?;
            }
            Event::End(e) => {
                let name = utf8(e.name().as_ref())?;
                parser.end_tag(&name)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    parser.finish()
}

fn decode_start(e: &BytesStart<'_>) -> ScenarioResult<(String, TagAttributes)> {
    let name = utf8(e.name().as_ref())?;
    let mut pairs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ScenarioError::Parse(format!("<{name}>: {err}")))?;
        let key = utf8(attr.key.as_ref())?;
        let value = attr
            .unescape_value()
            .map_err(|err| ScenarioError::Parse(format!("<{name}> attribute {key:?}: {err}")))?
            .into_owned();
        pairs.push((key, value));
    }
    Ok((name, TagAttributes::new(pairs)))
}

fn utf8(bytes: &[u8]) -> ScenarioResult<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| ScenarioError::Parse(format!("invalid UTF-8 in tag: {e}")))
}
