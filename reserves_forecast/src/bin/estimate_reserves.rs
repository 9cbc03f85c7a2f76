//! Residual reserves for every well of a field
//!
//! # Usage
//! ```bash
//! estimate_reserves --history history.csv --config reserves.toml --output-dir out
//! estimate_reserves --history history.csv --min-reserves 2000 --max-distance 1000 \
//!     --year-min 5 --year-max 50
//! ```

use anyhow::{anyhow, Context};
use clap::Parser;
use reserves_forecast::config::{EstimationConstants, ReservesBounds, ReservesConfig};
use reserves_forecast::data::DataLoader;
use reserves_forecast::report::write_report;
use reserves_forecast::FieldReservesAggregator;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "estimate_reserves")]
#[command(about = "Decline-curve residual reserves with spatial fallback")]
#[command(version)]
struct Args {
    /// Cleaned monthly history (CSV: well,date,oil,liquid,hours,formation,x,y)
    #[arg(long)]
    history: PathBuf,

    /// TOML configuration with [bounds] and optional [constants]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory receiving the output tables
    #[arg(short, long, default_value = "reserves_output")]
    output_dir: PathBuf,

    /// Minimum residual reserves, mass units
    #[arg(long)]
    min_reserves: Option<f64>,

    /// Nearest-neighbor distance beyond which fallback wells are flagged
    #[arg(long)]
    max_distance: Option<f64>,

    /// Shortest remaining life, years
    #[arg(long)]
    year_min: Option<f64>,

    /// Longest remaining life, years
    #[arg(long)]
    year_max: Option<f64>,
}

fn resolve_config(args: &Args) -> anyhow::Result<ReservesConfig> {
    let from_file = match &args.config {
        Some(path) => Some(
            ReservesConfig::load_from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
        ),
        None => None,
    };
    let file_bounds = from_file.map(|c| c.bounds);
    let constants = from_file.map_or_else(EstimationConstants::default, |c| c.constants);

    let bound = |flag: Option<f64>, file: Option<f64>, name: &str| {
        flag.or(file)
            .ok_or_else(|| anyhow!("missing bound: pass --{name} or a config file"))
    };

    let bounds = ReservesBounds::new(
        bound(args.min_reserves, file_bounds.map(|b| b.min_reserves), "min-reserves")?,
        bound(args.max_distance, file_bounds.map(|b| b.max_neighbor_distance), "max-distance")?,
        bound(args.year_min, file_bounds.map(|b| b.year_min), "year-min")?,
        bound(args.year_max, file_bounds.map(|b| b.year_max), "year-max")?,
    )?;

    Ok(ReservesConfig::new(bounds, constants)?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = resolve_config(&args)?;

    let histories = DataLoader::from_csv(&args.history)
        .with_context(|| format!("reading {}", args.history.display()))?;
    info!(wells = histories.len(), path = %args.history.display(), "Loaded histories");

    let aggregator = FieldReservesAggregator::new(config)?;
    let report = aggregator.run(&histories)?;
    let files = write_report(&report, &args.output_dir)?;

    println!("Residual reserves, thousands:");
    for (well, thousands) in report.aggregate.iter() {
        println!("  {:<12} {:>12.3}", well.as_str(), thousands);
    }
    println!("Total: {:.3}", report.aggregate.total());
    println!(
        "Direct: {}, fallback: {}",
        report.direct.len(),
        report.fallback.len()
    );
    println!("Aggregate written to {}", files.aggregate.display());

    Ok(())
}
