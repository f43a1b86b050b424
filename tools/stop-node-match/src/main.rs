use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use stopsnap::prelude::*;

mod config;
mod output;

use config::{apply_overrides, load_config, resolve_zone};
use output::write_review_geojson;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum IndexArg {
    Grid,
    Rtree,
}

impl From<IndexArg> for IndexKind {
    fn from(arg: IndexArg) -> Self {
        match arg {
            IndexArg::Grid => IndexKind::Grid,
            IndexArg::Rtree => IndexKind::RTree,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "stop-node-match",
    author,
    version,
    about = "Match transit stops to the nearest node of a projected network",
    long_about = "Projects transit stops into the network's UTM zone and writes, for every \
                  stop, the nearest regular network node as a CSV correspondence table.\n\n\
                  Stops with no node to match are kept: their node column reads \
                  'Nothing Found' when the network had no regular nodes, and 'None' when \
                  the nearest node could not be resolved."
)]
struct Args {
    /// Stops: GeoJSON points (.geojson/.json), a GTFS directory, or a stops.txt table
    #[arg(short, long)]
    stops: PathBuf,

    /// Network nodes: batch file (.211/.d211/.in) or a node_id,x,y table
    #[arg(short, long)]
    nodes: PathBuf,

    /// UTM zone of the network, e.g. 17N or EPSG:32617
    #[arg(short = 'z', long, conflicts_with = "prj", required_unless_present = "prj")]
    utm_zone: Option<String>,

    /// Projection file (.prj) of the network to read the UTM zone from
    #[arg(long)]
    prj: Option<PathBuf>,

    /// Output CSV correspondence table
    #[arg(short, long)]
    output: PathBuf,

    /// TOML matcher configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use a fixed N x N grid, overriding the config
    #[arg(long)]
    grid_cells: Option<usize>,

    /// Spatial index, overriding the config
    #[arg(long, value_enum)]
    index: Option<IndexArg>,

    /// Keep GTFS stations, entrances and generic nodes, not just boardable stops
    #[arg(long)]
    all_locations: bool,

    /// Also write stop-to-node connectors as GeoJSON for review
    #[arg(long)]
    geojson: Option<PathBuf>,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

fn log_summary(summary: &MatchSummary) {
    log::info!("=== Summary ===");
    log::info!("Stops:             {}", summary.stops);
    log::info!("Network nodes:     {}", summary.nodes);
    log::info!("Matched:           {}", summary.matched);
    log::info!("Nothing found:     {}", summary.index_empty);
    log::info!("Null references:   {}", summary.null_reference);
    if summary.matched > 0 {
        log::info!("Largest distance:  {:.1} m", summary.max_distance);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    log::info!("=== Stop to Node Matcher ===");
    log::info!("Stops: {}", args.stops.display());
    log::info!("Nodes: {}", args.nodes.display());
    log::info!("Output: {}", args.output.display());

    for input in [&args.stops, &args.nodes] {
        if !input.exists() {
            bail!("Input does not exist: {}", input.display());
        }
    }

    // Phase 1: Configuration
    log::info!("");
    log::info!("Phase 1: Reading configuration...");
    let zone = resolve_zone(args.utm_zone.as_deref(), args.prj.as_deref())
        .context("Failed to determine the network projection")?;
    log::info!("  UTM zone {} (central meridian {})", zone, zone.central_meridian());

    let config = load_config(args.config.as_deref())?;
    let config = apply_overrides(config, args.grid_cells, args.index.map(IndexKind::from));
    log::info!("  Index: {:?}, grid: {:?}, margin: {}", config.index, config.grid, config.margin);

    let projector = UtmProjector::new(zone).context("Failed to build the UTM projection")?;
    let matcher = Matcher::new(projector, config).context("Invalid matcher configuration")?;

    // Phase 2: Load inputs
    log::info!("");
    log::info!("Phase 2: Loading stops and network nodes...");
    let stop_file = StopFile::open(&args.stops, args.all_locations);
    let stops = stop_file
        .stops()
        .with_context(|| format!("Failed to load stops from {}", stop_file.path().display()))?;
    let nodes = load_nodes(&args.nodes)
        .with_context(|| format!("Failed to load nodes from {}", args.nodes.display()))?;

    if stops.is_empty() {
        log::warn!("  No stops to match; the output will only hold a header");
    }

    // Phase 3: Match
    log::info!("");
    log::info!("Phase 3: Matching stops to nodes...");
    let report = matcher
        .run(&stops, &nodes)
        .context("Failed to match stops to nodes")?;

    // Phase 4: Write output
    log::info!("");
    log::info!("Phase 4: Writing output...");
    write_correspondence(&args.output, &report.records)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    if let Some(review_path) = &args.geojson {
        write_review_geojson(&report.records, review_path)?;
    }

    // Summary
    log::info!("");
    log_summary(&report.summary);
    log::info!("");
    log::info!("Output written to: {}", args.output.display());
    log::info!("Done!");

    Ok(())
}
