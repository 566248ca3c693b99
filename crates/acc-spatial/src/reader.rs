//! Network XML reader.
//!
//! ```xml
//! <network name="equil">
//!   <nodes>
//!     <node id="1" x="0.0" y="0.0"/>
//!     <node id="2" x="1000.0" y="0.0"/>
//!   </nodes>
//!   <links capperiod="01:00:00">
//!     <link id="12" from="1" to="2" length="1000.0" freespeed="13.89"
//!           capacity="2000" permlanes="1" modes="car"/>
//!   </links>
//! </network>
//! ```
//!
//! Only node coordinates and link length/free speed are read; capacity,
//! lanes, and modes are ignored.  A link must reference nodes declared
//! before it.

use std::io::BufRead;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use acc_core::Point;

use crate::network::{Network, NetworkBuilder};
use crate::{SpatialError, SpatialResult};

/// Parse a network file from disk.
pub fn read_network_file(path: &Path) -> SpatialResult<Network> {
    let file = std::fs::File::open(path)?;
    let network = read_network(std::io::BufReader::new(file))?;
    log::info!(
        "read network with {} nodes and {} links from {}",
        network.node_count(),
        network.link_count(),
        path.display()
    );
    Ok(network)
}

/// Parse a network from any buffered reader.
pub fn read_network<R: BufRead>(source: R) -> SpatialResult<Network> {
    let mut reader = Reader::from_reader(source);
    reader.config_mut().trim_text(true);

    let mut builder = NetworkBuilder::new();
    let mut link_labels = std::collections::HashSet::new();
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|source| SpatialError::Xml { position: reader.buffer_position() as u64, source })?;

        match event {
            Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                b"node" => {
                    let id = attr(&e, "id")?;
                    if builder.lookup_node(&id).is_some() {
                        return Err(SpatialError::Duplicate { kind: "node", label: id });
                    }
                    let pos = Point::new(attr_f64(&e, "x")?, attr_f64(&e, "y")?);
                    builder.add_node(id, pos);
                }
                b"link" => {
                    let id = attr(&e, "id")?;
                    if !link_labels.insert(id.clone()) {
                        return Err(SpatialError::Duplicate { kind: "link", label: id });
                    }
                    let from = node_ref(&builder, &id, &attr(&e, "from")?)?;
                    let to   = node_ref(&builder, &id, &attr(&e, "to")?)?;
                    let length    = attr_f64(&e, "length")?;
                    let freespeed = attr_f64(&e, "freespeed")?;
                    if freespeed <= 0.0 {
                        return Err(SpatialError::Parse(format!(
                            "link {id:?} has non-positive freespeed {freespeed}"
                        )));
                    }
                    builder.add_link(id, from, to, length, freespeed);
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(builder.build())
}

fn node_ref(builder: &NetworkBuilder, link: &str, node: &str) -> SpatialResult<acc_core::NodeId> {
    builder.lookup_node(node).ok_or_else(|| {
        SpatialError::Parse(format!("link {link:?} references unknown node {node:?}"))
    })
}

fn attr(e: &BytesStart<'_>, key: &str) -> SpatialResult<String> {
    for a in e.attributes() {
        let a = a.map_err(|err| SpatialError::Parse(err.to_string()))?;
        if a.key.as_ref() == key.as_bytes() {
            let value = a.unescape_value().map_err(|err| SpatialError::Parse(err.to_string()))?;
            return Ok(value.into_owned());
        }
    }
    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    Err(SpatialError::Parse(format!("<{tag}> is missing attribute {key:?}")))
}

fn attr_f64(e: &BytesStart<'_>, key: &str) -> SpatialResult<f64> {
    let raw = attr(e, key)?;
    raw.trim()
        .parse()
        .map_err(|_| SpatialError::Parse(format!("attribute {key:?} is not a number: {raw:?}")))
}
