//! Comparison of observed link counts with simulated link volumes.
//!
//! Every count station sits on a link and carries hourly volumes for hours
//! `1..=24` (hour `h` covers `[h−1, h)` o'clock).  [`CountsComparison`]
//! pairs each observed hour with the simulated volume of the same link and
//! hour, scaled by the counts scale factor.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use acc_core::{LinkId, Point};
use acc_spatial::Network;

use crate::{OutputError, OutputResult};

pub const HOURS: u32 = 24;

fn check_hour(hour: u32) -> OutputResult<usize> {
    if (1..=HOURS).contains(&hour) {
        Ok(hour as usize - 1)
    } else {
        Err(OutputError::InvalidHour(hour))
    }
}

// ── Inputs ────────────────────────────────────────────────────────────────────

/// Observed hourly volumes on one link.
#[derive(Clone, Debug, PartialEq)]
pub struct Count {
    pub link:    LinkId,
    pub station: String,
    volumes:     BTreeMap<u32, f64>,
}

impl Count {
    pub fn new(link: LinkId, station: impl Into<String>) -> Self {
        Self { link, station: station.into(), volumes: BTreeMap::new() }
    }

    pub fn set_volume(&mut self, hour: u32, value: f64) -> OutputResult<()> {
        check_hour(hour)?;
        self.volumes.insert(hour, value);
        Ok(())
    }

    pub fn volume(&self, hour: u32) -> Option<f64> {
        self.volumes.get(&hour).copied()
    }

    /// `(hour, volume)` in hour order.
    pub fn volumes(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.volumes.iter().map(|(&h, &v)| (h, v))
    }
}

/// Simulated hourly volumes per link.
#[derive(Clone, Debug, Default)]
pub struct LinkVolumes {
    volumes: FxHashMap<LinkId, [f64; HOURS as usize]>,
}

impl LinkVolumes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, link: LinkId, hour: u32, value: f64) -> OutputResult<()> {
        let slot = check_hour(hour)?;
        self.volumes.entry(link).or_insert([0.0; HOURS as usize])[slot] = value;
        Ok(())
    }

    /// Simulated volume; links without any volume count as `0`.
    pub fn get(&self, link: LinkId, hour: u32) -> f64 {
        match (self.volumes.get(&link), check_hour(hour)) {
            (Some(v), Ok(slot)) => v[slot],
            _ => 0.0,
        }
    }
}

/// Row of a counts CSV: `link_id,hour,volume` with an optional
/// `station` column.
#[derive(Debug, Deserialize)]
struct CountRecord {
    link_id: String,
    hour:    u32,
    volume:  f64,
    #[serde(default)]
    station: Option<String>,
}

/// Read counts from CSV, resolving link labels against `network`.
pub fn load_counts_csv(path: &Path, network: &Network) -> OutputResult<Vec<Count>> {
    let counts = load_counts_reader(File::open(path)?, network)?;
    log::info!("loaded {} count stations from {}", counts.len(), path.display());
    Ok(counts)
}

/// Like [`load_counts_csv`] but reading from any source.  Stations keep the
/// order in which their link first appears.
pub fn load_counts_reader<R: Read>(reader: R, network: &Network) -> OutputResult<Vec<Count>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut counts: Vec<Count> = Vec::new();
    let mut by_link: FxHashMap<LinkId, usize> = FxHashMap::default();

    for record in rdr.deserialize() {
        let record: CountRecord = record?;
        let link = network
            .lookup_link(&record.link_id)
            .ok_or_else(|| OutputError::UnknownLink(record.link_id.clone()))?;
        let slot = *by_link.entry(link).or_insert_with(|| {
            let station = record.station.clone().unwrap_or_else(|| record.link_id.clone());
            counts.push(Count::new(link, station));
            counts.len() - 1
        });
        counts[slot].set_volume(record.hour, record.volume)?;
    }
    Ok(counts)
}

// ── Comparison ────────────────────────────────────────────────────────────────

/// One observed hour next to its simulated value.
#[derive(Clone, Debug, PartialEq)]
pub struct CountSimComparison {
    pub link:        LinkId,
    /// 1..=24
    pub hour:        u32,
    pub count_value: f64,
    pub sim_value:   f64,
}

impl CountSimComparison {
    /// `(sim − count) / count` in percent.  With a zero count the error is
    /// `0` if the simulation also shows nothing and `100` otherwise.
    pub fn relative_error(&self) -> f64 {
        if self.count_value == 0.0 {
            if self.sim_value == 0.0 { 0.0 } else { 100.0 }
        } else {
            (self.sim_value - self.count_value) / self.count_value * 100.0
        }
    }
}

/// Restricts a comparison to stations near a centre.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DistanceFilter {
    pub centre: Point,
    /// Metres; a link counts when its midpoint lies within this distance.
    pub radius: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CountsComparison {
    pub scale_factor:    f64,
    pub distance_filter: Option<DistanceFilter>,
}

impl CountsComparison {
    pub fn new(scale_factor: f64) -> Self {
        Self { scale_factor, distance_filter: None }
    }

    pub fn with_distance_filter(mut self, centre: Point, radius: f64) -> Self {
        self.distance_filter = Some(DistanceFilter { centre, radius });
        self
    }

    /// One comparison per observed station-hour, in station then hour order.
    pub fn compare(&self, counts: &[Count], sim: &LinkVolumes, network: &Network) -> Vec<CountSimComparison> {
        let mut out = Vec::new();
        let mut filtered = 0usize;
        for count in counts {
            if !self.in_range(count.link, network) {
                filtered += 1;
                continue;
            }
            for (hour, observed) in count.volumes() {
                out.push(CountSimComparison {
                    link: count.link,
                    hour,
                    count_value: observed,
                    sim_value: sim.get(count.link, hour) * self.scale_factor,
                });
            }
        }
        if filtered > 0 {
            log::debug!("{filtered} count stations outside the distance filter");
        }
        out
    }

    fn in_range(&self, link: LinkId, network: &Network) -> bool {
        match self.distance_filter {
            None => true,
            Some(f) => network
                .link_midpoint(link)
                .is_some_and(|mid| mid.distance(f.centre) <= f.radius),
        }
    }
}

// ── Error statistics ──────────────────────────────────────────────────────────

/// Per-hour error statistics over a comparison list.  Hours without any
/// observation are `0`.
#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonErrorStats {
    /// Mean of `|relative_error|`, percent.
    pub mean_rel_error: [f64; HOURS as usize],
    /// Mean of `sim − count`.
    pub mean_abs_bias:  [f64; HOURS as usize],
    /// Mean of `|sim − count|`.
    pub mean_abs_error: [f64; HOURS as usize],
}

impl ComparisonErrorStats {
    pub fn from_comparisons(comparisons: &[CountSimComparison]) -> Self {
        let mut n = [0usize; HOURS as usize];
        let mut rel = [0.0; HOURS as usize];
        let mut bias = [0.0; HOURS as usize];
        let mut abs = [0.0; HOURS as usize];

        for c in comparisons {
            let Ok(slot) = check_hour(c.hour) else { continue };
            n[slot] += 1;
            rel[slot] += c.relative_error().abs();
            bias[slot] += c.sim_value - c.count_value;
            abs[slot] += (c.sim_value - c.count_value).abs();
        }
        for slot in 0..HOURS as usize {
            if n[slot] > 0 {
                let k = n[slot] as f64;
                rel[slot] /= k;
                bias[slot] /= k;
                abs[slot] /= k;
            }
        }
        Self { mean_rel_error: rel, mean_abs_bias: bias, mean_abs_error: abs }
    }
}

// ── Writers ───────────────────────────────────────────────────────────────────

/// `link_id,hour,count,sim,rel_error` with link labels from `network`.
pub fn write_comparison_csv(path: &Path, comparisons: &[CountSimComparison], network: &Network) -> OutputResult<()> {
    let mut w = csv::Writer::from_path(path)?;
    w.write_record(["link_id", "hour", "count", "sim", "rel_error"])?;
    for c in comparisons {
        w.write_record(&[
            network.link_label(c.link).to_owned(),
            c.hour.to_string(),
            c.count_value.to_string(),
            c.sim_value.to_string(),
            c.relative_error().to_string(),
        ])?;
    }
    w.flush()?;
    log::info!("wrote {} count comparisons to {}", comparisons.len(), path.display());
    Ok(())
}

/// `hour,mean_rel_error,mean_abs_bias,mean_abs_error` for hours 1..=24.
pub fn write_error_stats_csv(path: &Path, stats: &ComparisonErrorStats) -> OutputResult<()> {
    let mut w = csv::Writer::from_path(path)?;
    w.write_record(["hour", "mean_rel_error", "mean_abs_bias", "mean_abs_error"])?;
    for slot in 0..HOURS as usize {
        w.write_record(&[
            (slot + 1).to_string(),
            stats.mean_rel_error[slot].to_string(),
            stats.mean_abs_bias[slot].to_string(),
            stats.mean_abs_error[slot].to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
