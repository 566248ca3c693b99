//! grid_accessibility — accessibility grid per activity type and mode.
//!
//! Usage:
//!
//! ```text
//! grid_accessibility [config.toml] [network.xml] [facilities.xml]
//! ```
//!
//! Without arguments a synthetic 6×6 lattice town is used together with a
//! built-in `accessibility` config group.  Results land in
//! `output/grid_accessibility/<activity_type>/accessibilities.csv`.
//! Set `RUST_LOG=info` (or `debug`) to follow the run.

mod scenario;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;

use acc_core::{Config, ConfigGroup, Mode};
use acc_grid::{
    AccessibilityConfig, AccessibilityResult, ActivityTypeRun, CONFIG_GROUP, GridAccessibilityBuilder, RunObserver,
};
use acc_output::{CsvWriter, OutputObserver};
use acc_scenario::read_facilities_file;
use acc_spatial::read_network_file;

const OUTPUT_DIR: &str = "output/grid_accessibility";

// ── Config ────────────────────────────────────────────────────────────────────

fn default_config() -> Config {
    let mut config = Config::new();
    config.add_group(
        ConfigGroup::new(CONFIG_GROUP)
            .with("cellSize", 125)
            .with("betaCost", -1.0)
            .with("betaCost.pt", -1.2)
            .with("betaCapacity", 1.0)
            .with("modes", "freespeed,car,bike,walk,pt")
            .with("anchorType", "h"),
    );
    config
}

// ── Observer wrapper that keeps a per-type summary ───────────────────────────

struct SummaryObserver {
    inner:   OutputObserver<CsvWriter>,
    summary: Vec<(String, Vec<(Mode, f64)>)>,
}

impl RunObserver for SummaryObserver {
    fn on_type_start(&mut self, activity_type: &str, opportunities: usize) {
        log::info!("{activity_type}: {opportunities} opportunities");
        self.inner.on_type_start(activity_type, opportunities);
    }

    fn on_result(&mut self, result: &AccessibilityResult) {
        let means = result
            .modes()
            .iter()
            .map(|&mode| (mode, mean_value(result, mode)))
            .collect();
        self.summary.push((result.activity_type().to_owned(), means));
        self.inner.on_result(result);
    }

    fn on_run_end(&mut self, types: usize) {
        self.inner.on_run_end(types);
    }
}

fn mean_value(result: &AccessibilityResult, mode: Mode) -> f64 {
    let values: Vec<f64> = result.points().iter().filter_map(|p| result.get(p.id, mode)).collect();
    if values.is_empty() { 0.0 } else { values.iter().sum::<f64>() / values.len() as f64 }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    println!("=== grid_accessibility ===");

    // 1. Configuration.
    let config = match args.first() {
        Some(path) => Config::from_toml_file(path)?,
        None => default_config(),
    };
    let acc_config = AccessibilityConfig::from_config(&config)?;
    println!(
        "cell size {} m, modes {:?}, betas {:?}",
        acc_config.cell_size, acc_config.modes, acc_config.betas
    );

    // 2. Scenario.
    let network = match args.get(1) {
        Some(path) => read_network_file(path)?,
        None => scenario::build_network(),
    };
    let facilities = match args.get(2) {
        Some(path) => read_facilities_file(path)?,
        None => scenario::build_facilities()?,
    };
    println!(
        "network: {} nodes, {} links; {} facilities",
        network.node_count(),
        network.link_count(),
        facilities.len()
    );

    // 3. Build the aggregator (grid + router).
    let accessibility = GridAccessibilityBuilder::new(acc_config, &network).build()?;
    println!(
        "measuring grid: {} x {} = {} points",
        accessibility.grid().cols(),
        accessibility.grid().rows(),
        accessibility.grid().len()
    );

    // 4. Output.
    let out = Path::new(OUTPUT_DIR);
    let mut obs = SummaryObserver { inner: OutputObserver::new(CsvWriter::new(out)?), summary: Vec::new() };

    // 5. Run every activity type.
    let run = ActivityTypeRun::new(&accessibility, &facilities);
    let t0 = Instant::now();
    run.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        return Err(e.into());
    }

    // 6. Summary.
    println!("computed {} activity types in {:.3} s", obs.summary.len(), elapsed.as_secs_f64());
    println!();
    println!("{:<12} {:<10} {:>14}", "Type", "Mode", "Mean access.");
    println!("{}", "-".repeat(38));
    for (activity_type, means) in &obs.summary {
        for (mode, mean) in means {
            println!("{:<12} {:<10} {:>14.4}", activity_type, mode.as_str(), mean);
        }
    }
    for path in obs.inner.into_writer().written() {
        println!("  {}", path.display());
    }

    Ok(())
}
