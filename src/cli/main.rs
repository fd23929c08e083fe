//! Command-line front-end for exposure queries.
//!
//! Takes a point and radius, runs one query against the configured datasets
//! and prints the weighted totals. The detail table can be written to CSV.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use catchment::config::Config;
use catchment::{compute, GeoPoint};

mod report;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "catchment")]
#[command(about = "Estimate population living within a radius of a point")]
struct Args {
    /// Latitude of the center, in degrees
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,

    /// Longitude of the center, in degrees
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,

    /// Buffer radius in kilometers
    #[arg(short, long)]
    radius_km: f64,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Region GeoJSON (overrides the config file)
    #[arg(long)]
    regions: Option<PathBuf>,

    /// Demographic CSV (overrides the config file)
    #[arg(long)]
    demographics: Option<PathBuf>,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Write the per-region detail table to this CSV file
    #[arg(long)]
    detail_csv: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    if let Some(path) = args.regions {
        config.datasets.regions = path;
    }
    if let Some(path) = args.demographics {
        config.datasets.demographics = path;
    }

    let center = GeoPoint::new(args.lat, args.lon);
    let result = compute(&config, center, args.radius_km)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Total Population: {}", result.total_population);
        println!("Active Population: {}", result.total_active_population);
    }

    if let Some(path) = &args.detail_csv {
        report::write_detail_csv(path, &result.detail)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote {} rows to {}", result.detail.len(), path.display());
    }

    Ok(())
}
