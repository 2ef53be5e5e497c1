//! CLI entry point for the NYC taxi-trip aggregation tool.
//!
//! Provides subcommands for collapsing the pre-aggregated by-day, by-month,
//! and by-zones datasets into filtered, grouped weighted averages, emitted
//! as JSON for the dashboard.

use std::ffi::OsStr;
use std::path::Path;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use nyc_taxi_trips::aggregate::flows::ZoneFlows;
use nyc_taxi_trips::aggregate::merge::group_weighted;
use nyc_taxi_trips::filter::TripFilter;
use nyc_taxi_trips::loader::{load_day_rows, load_month_rows, load_zone_rows};
use nyc_taxi_trips::output::{Report, print_json, sorted_groups, write_json};
use nyc_taxi_trips::zones::ZoneLookup;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "nyc_taxi_trips")]
#[command(about = "Aggregate pre-bucketed NYC taxi-trip data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// The four dashboard toggles, shared by every subcommand. Each accepts a
/// specific category or the wildcard "any".
#[derive(Args)]
struct FilterArgs {
    /// Weather filter (e.g. sunny, rainy)
    #[arg(long, default_value = "any")]
    weather: String,

    /// Season filter (e.g. winter, spring, summer, fall)
    #[arg(long, default_value = "any")]
    season: String,

    /// Time-of-day filter (e.g. day, night)
    #[arg(long, default_value = "any")]
    time: String,

    /// Area filter (e.g. manhattan)
    #[arg(long, default_value = "any")]
    area: String,
}

impl FilterArgs {
    fn to_filter(&self) -> TripFilter {
        TripFilter {
            weather: self.weather.clone(),
            season: self.season.clone(),
            time: self.time.clone(),
            area: self.area.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate the by-day dataset into per-day-of-week averages
    ByDay {
        /// Path to the by-day CSV file
        #[arg(short, long, default_value = "data/by-day.csv")]
        input: String,

        /// JSON file to write the report to (stdout log if omitted)
        #[arg(short, long)]
        output: Option<String>,

        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Aggregate the by-month dataset into per-month averages
    ByMonth {
        /// Path to the by-month CSV file
        #[arg(short, long, default_value = "data/by-month.csv")]
        input: String,

        /// JSON file to write the report to (stdout log if omitted)
        #[arg(short, long)]
        output: Option<String>,

        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Aggregate the by-zones dataset into origin→destination flow edges
    ZoneFlows {
        /// Path to the by-zones CSV file
        #[arg(short, long, default_value = "data/by-zones.csv")]
        input: String,

        /// Path to the taxi-zones GeoJSON file
        #[arg(short, long, default_value = "data/nyc-taxi-zones.geojson")]
        zones: String,

        /// JSON file to write the report to (stdout log if omitted)
        #[arg(short, long)]
        output: Option<String>,

        #[command(flatten)]
        filter: FilterArgs,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/nyc_taxi_trips.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("nyc_taxi_trips.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ByDay {
            input,
            output,
            filter,
        } => {
            let filter = filter.to_filter();
            let rows = load_day_rows(&input)?;
            let groups = group_weighted(&rows, &filter, |row| row.day.clone());

            info!(groups = groups.len(), "By-day aggregation complete");
            emit(output, Report::new(filter, sorted_groups(groups)))?;
        }
        Commands::ByMonth {
            input,
            output,
            filter,
        } => {
            let filter = filter.to_filter();
            let rows = load_month_rows(&input)?;
            let groups = group_weighted(&rows, &filter, |row| row.month.clone());

            info!(groups = groups.len(), "By-month aggregation complete");
            emit(output, Report::new(filter, sorted_groups(groups)))?;
        }
        Commands::ZoneFlows {
            input,
            zones,
            output,
            filter,
        } => {
            let filter = filter.to_filter();
            let rows = load_zone_rows(&input)?;
            let lookup = ZoneLookup::from_geojson_file(&zones)?;

            let flows = ZoneFlows::build(&rows, &filter);
            let edges = flows.flatten(&lookup);

            info!(
                origins = flows.origin_count(),
                edges = edges.len(),
                "Zone-flow aggregation complete"
            );
            emit(output, Report::new(filter, edges))?;
        }
    }

    Ok(())
}

/// Writes the report to a file when an output path was given, otherwise
/// logs it as JSON.
fn emit<T: serde::Serialize>(output: Option<String>, report: Report<T>) -> Result<()> {
    match output {
        Some(path) => write_json(path, &report),
        None => print_json(&report),
    }
}
