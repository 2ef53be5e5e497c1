//! CSV ingestion for the three pre-aggregated datasets.
//!
//! Column order is fixed: the grouping key column(s) first, then
//! `weather, season, time, area, avgDistance, avgFareAmount, avgTipAmount,
//! avgTotalAmount, avgDuration, numberOfTrips`. The header line is
//! discarded. A malformed numeric field parses as zero and a short row is
//! skipped with a warning; a single bad row never aborts the load.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use csv::StringRecord;
use tracing::{info, warn};

use crate::record::{DayRow, MonthRow, TripAttrs, TripMetrics, ZoneRow};

/// Number of shared columns following the key column(s).
const TAIL_COLUMNS: usize = 10;

pub fn load_day_rows(path: impl AsRef<Path>) -> Result<Vec<DayRow>> {
    load_rows(path.as_ref(), 1, |record| DayRow {
        day: field(record, 0),
        attrs: parse_attrs(record, 1),
        metrics: parse_metrics(record, 1),
    })
}

pub fn load_month_rows(path: impl AsRef<Path>) -> Result<Vec<MonthRow>> {
    load_rows(path.as_ref(), 1, |record| MonthRow {
        month: field(record, 0),
        attrs: parse_attrs(record, 1),
        metrics: parse_metrics(record, 1),
    })
}

pub fn load_zone_rows(path: impl AsRef<Path>) -> Result<Vec<ZoneRow>> {
    load_rows(path.as_ref(), 2, |record| ZoneRow {
        start_zone: field(record, 0),
        end_zone: field(record, 1),
        attrs: parse_attrs(record, 2),
        metrics: parse_metrics(record, 2),
    })
}

fn load_rows<T>(
    path: &Path,
    key_columns: usize,
    parse: impl Fn(&StringRecord) -> T,
) -> Result<Vec<T>> {
    let file =
        File::open(path).with_context(|| format!("opening dataset file {}", path.display()))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(line, error = %e, "Skipping unreadable CSV record");
                continue;
            }
        };

        if record.len() < key_columns + TAIL_COLUMNS {
            warn!(line, columns = record.len(), "Skipping short CSV record");
            continue;
        }

        rows.push(parse(&record));
    }

    info!(rows = rows.len(), path = %path.display(), "Dataset loaded");
    Ok(rows)
}

fn field(record: &StringRecord, index: usize) -> String {
    record.get(index).unwrap_or("").trim().to_string()
}

fn parse_attrs(record: &StringRecord, offset: usize) -> TripAttrs {
    TripAttrs {
        weather: field(record, offset),
        season: field(record, offset + 1),
        time: field(record, offset + 2),
        area: field(record, offset + 3),
    }
}

fn parse_metrics(record: &StringRecord, offset: usize) -> TripMetrics {
    TripMetrics {
        avg_distance: float_or_zero(record, offset + 4),
        avg_fare_amount: float_or_zero(record, offset + 5),
        avg_tip_amount: float_or_zero(record, offset + 6),
        avg_total_amount: float_or_zero(record, offset + 7),
        avg_duration: float_or_zero(record, offset + 8),
        number_of_trips: count_or_zero(record, offset + 9),
    }
}

fn float_or_zero(record: &StringRecord, index: usize) -> f64 {
    record
        .get(index)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0.0)
}

fn count_or_zero(record: &StringRecord, index: usize) -> u64 {
    record
        .get(index)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}
