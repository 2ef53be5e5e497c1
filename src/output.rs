//! Output formatting and persistence for grouped results.
//!
//! Wraps a grouped payload in a timestamped report envelope and writes it
//! as JSON for the dashboard to consume.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::filter::TripFilter;
use crate::record::TripMetrics;

/// Report envelope: when it was generated, which filter produced it, and
/// the grouped payload itself.
#[derive(Debug, Serialize)]
pub struct Report<T: Serialize> {
    pub generated_at: DateTime<Utc>,
    pub filter: TripFilter,
    pub groups: T,
}

impl<T: Serialize> Report<T> {
    pub fn new(filter: TripFilter, groups: T) -> Self {
        Report {
            generated_at: Utc::now(),
            filter,
            groups,
        }
    }
}

/// One flat group in a report, e.g. a day of the week or a month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupEntry {
    pub key: String,
    #[serde(flatten)]
    pub metrics: TripMetrics,
}

/// Orders a grouped result by key so report output is deterministic.
pub fn sorted_groups(groups: HashMap<String, TripMetrics>) -> Vec<GroupEntry> {
    let mut entries: Vec<GroupEntry> = groups
        .into_iter()
        .map(|(key, metrics)| GroupEntry { key, metrics })
        .collect();
    entries.sort_by(|a, b| a.key.cmp(&b.key));
    entries
}

/// Logs a report as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes a report as pretty-printed JSON to `path`.
pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Writing JSON report");

    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("writing report to {}", path.display()))?;

    info!(path = %path.display(), "Report written");
    Ok(())
}
