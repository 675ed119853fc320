//! Offline fuel planner: run the core pipeline against a station CSV and a
//! saved route, without any network lookups.
//!
//! Usage:
//!   cargo run -p fuelstop-server --bin plan_offline -- \
//!     --stations fuel_prices_with_coords.csv --route route.json
//!
//! `route.json` is a JSON array of `[lat, lon]` pairs, or `[lon, lat]`
//! (GeoJSON order) with `--lon-lat`.

use anyhow::{Context, Result};
use clap::Parser;
use fuelstop_core::{plan_fuel_stops, PlannerConfig, RoutePoint, RouteTrace};
use fuelstop_server::stations::load_catalog;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan fuel stops for a saved route")]
struct Args {
    /// Station price CSV
    #[arg(long)]
    stations: PathBuf,

    /// JSON file with the route positions
    #[arg(long)]
    route: PathBuf,

    /// Positions are [lon, lat] instead of [lat, lon]
    #[arg(long, default_value_t = false)]
    lon_lat: bool,

    /// Vehicle range in miles
    #[arg(long)]
    max_range: Option<f64>,

    /// Vehicle fuel economy
    #[arg(long)]
    mpg: Option<f64>,

    /// Station search radius in miles
    #[arg(long)]
    radius: Option<f64>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fuelstop_server=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let defaults = PlannerConfig::default();
    let config = PlannerConfig {
        max_range_miles: args.max_range.unwrap_or(defaults.max_range_miles),
        mpg: args.mpg.unwrap_or(defaults.mpg),
        search_radius_miles: args.radius.unwrap_or(defaults.search_radius_miles),
        ..defaults
    };
    config.validate()?;

    let catalog = load_catalog(&args.stations, config.grid())?;

    let raw = std::fs::read_to_string(&args.route)
        .with_context(|| format!("failed to read route {}", args.route.display()))?;
    let positions: Vec<[f64; 2]> =
        serde_json::from_str(&raw).context("route must be a JSON array of coordinate pairs")?;
    let trace: RouteTrace = if args.lon_lat {
        RouteTrace::from_geojson_coordinates(&positions)
    } else {
        positions
            .iter()
            .map(|&[lat, lon]| RoutePoint::new(lat, lon))
            .collect()
    };

    let plan = plan_fuel_stops(&trace, &catalog, &config);
    tracing::info!(
        points = trace.len(),
        stops = plan.stops.len(),
        unserved = plan.unserved_points(),
        "plan complete"
    );
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
