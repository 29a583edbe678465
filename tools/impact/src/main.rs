/// Impact-site assessment tool: classifies impact points against Natural Earth
/// layers and sums WorldPop population around them. Prints JSON to stdout;
/// logs go to stderr (RUST_LOG, default `info`).
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use impact_core::{
    Assessor, DataPaths, GeoPoint, GeoTiffSource, ImpactClassifier, ImpactConfig, ImpactReport, ImpactRequest,
    PopulationAggregator, PopulationReport, VectorLayerStore,
};

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "impact", about = "Classify asteroid impact sites and estimate exposed population")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the Natural Earth shapefiles and population raster
    /// (stock file names); overrides [data] in the config
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Population GeoTIFF; overrides both the config and --data-dir
    #[arg(long)]
    population: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Terrain class and tsunami flag for one point
    Classify {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Coastal proximity threshold in km (default from config, 100)
        #[arg(long)]
        coastal_km: Option<f64>,
    },
    /// People living within a radius of a point
    Population {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long)]
        radius_km: f64,
    },
    /// Full impact report for one JSON request (file path, or - for stdin)
    Assess {
        #[arg(short, long, default_value = "-")]
        request: String,
    },
    /// Impact reports for a JSON array of requests, processed in parallel
    Batch {
        /// JSON file containing an array of requests
        #[arg(short, long)]
        input: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// ── Output records ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ClassifyOutput {
    lat: f64,
    lon: f64,
    classification: impact_core::Classification,
    is_tsunami: u8,
}

#[derive(Serialize)]
#[serde(untagged)]
enum BatchEntry {
    Report(Box<ImpactReport>),
    Failed { error: String },
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Config file (or defaults) with command-line overrides applied.
fn resolve_config(args: &Args) -> Result<ImpactConfig> {
    let mut config = match &args.config {
        Some(path) => ImpactConfig::from_file(path)?,
        None => ImpactConfig::default(),
    };
    if let Some(dir) = &args.data_dir {
        config.data = DataPaths::in_dir(dir);
    }
    if let Some(pop) = &args.population {
        config.data.population = pop.clone();
    }
    Ok(config)
}

fn read_request(source: &str) -> Result<ImpactRequest> {
    let text = if source == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("Failed to read request from stdin")?;
        buf
    } else {
        fs::read_to_string(source).with_context(|| format!("Cannot read {source}"))?
    };
    Ok(ImpactRequest::from_json(&text)?)
}

fn read_batch(path: &Path) -> Result<Vec<ImpactRequest>> {
    let text = fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let requests: Vec<ImpactRequest> =
        serde_json::from_str(&text).with_context(|| format!("{} is not a JSON array of requests", path.display()))?;
    Ok(requests)
}

fn load_store(config: &ImpactConfig) -> Result<VectorLayerStore> {
    VectorLayerStore::load(&config.data).context("Vector layers unavailable; cannot classify")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();
    let config = resolve_config(&args)?;

    match &args.command {
        Command::Classify { lat, lon, coastal_km } => {
            let store = load_store(&config)?;
            let classifier = ImpactClassifier::new(&store);
            let km = coastal_km.unwrap_or(config.classifier.coastal_distance_km);
            let classification = classifier.classify_lat_lon(*lat, *lon, km)?;
            print_json(&ClassifyOutput {
                lat: *lat,
                lon: *lon,
                classification,
                is_tsunami: u8::from(impact_core::tsunami_risk(classification)),
            })?;
        }
        Command::Population { lat, lon, radius_km } => {
            let point = GeoPoint::new(*lat, *lon)?;
            let aggregator = PopulationAggregator::new(GeoTiffSource::new(&config.data.population));
            let population = aggregator.population_in_radius(point, *radius_km)?;
            info!(population = %impact_core::format_large_number(population), "population estimate");
            print_json(&PopulationReport { population })?;
        }
        Command::Assess { request } => {
            let request = read_request(request)?;
            let store = load_store(&config)?;
            let assessor = Assessor::new(&store, &config)
                .with_population(PopulationAggregator::new(GeoTiffSource::new(&config.data.population)));
            print_json(&assessor.assess(&request)?)?;
        }
        Command::Batch { input, output } => {
            let requests = read_batch(input)?;
            if requests.is_empty() {
                bail!("{} contains no requests", input.display());
            }
            let store = load_store(&config)?;
            let assessor = Assessor::new(&store, &config)
                .with_population(PopulationAggregator::new(GeoTiffSource::new(&config.data.population)));

            let entries: Vec<BatchEntry> = requests
                .par_iter()
                .map(|req| match assessor.assess(req) {
                    Ok(report) => BatchEntry::Report(Box::new(report)),
                    Err(e) => BatchEntry::Failed { error: e.to_string() },
                })
                .collect();
            let failed = entries.iter().filter(|e| matches!(e, BatchEntry::Failed { .. })).count();
            info!(requests = entries.len(), failed, "batch complete");

            let json = serde_json::to_string_pretty(&entries)?;
            match output {
                Some(path) => {
                    fs::write(path, json).with_context(|| format!("Write failed: {}", path.display()))?
                }
                None => println!("{json}"),
            }
        }
    }
    Ok(())
}
