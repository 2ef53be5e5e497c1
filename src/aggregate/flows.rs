//! Zone-to-zone trip flows.
//!
//! Two-level grouping of the by-zones dataset: per origin zone, a merged
//! total over every destination plus a per-destination breakdown. The
//! result flattens into one edge per observed (start, end) pair, annotated
//! with zone names and center coordinates for the map layer.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::Serialize;
use tracing::debug;

use crate::filter::TripFilter;
use crate::record::{TripMetrics, ZoneRow};
use crate::zones::{ZoneInfo, ZoneLookup};

/// Sentinel ids for the two off-map "unknown" taxi zones. Rows touching
/// either are dropped before aggregation.
pub const UNKNOWN_ZONE_IDS: [&str; 2] = ["264", "265"];

/// All flows departing one origin zone: the merged totals across every
/// destination, and the per-destination merged metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginFlows {
    pub totals: TripMetrics,
    pub to: HashMap<String, TripMetrics>,
}

/// The aggregated two-level zone-flow map.
#[derive(Debug, Default)]
pub struct ZoneFlows {
    origins: HashMap<String, OriginFlows>,
}

/// One flattened origin→destination edge, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneEdge {
    pub start_zone: String,
    pub end_zone: String,
    /// Merged metrics for this specific (start, end) pair.
    #[serde(flatten)]
    pub metrics: TripMetrics,
    /// Merged metrics over every destination from `start_zone`.
    pub origin_totals: TripMetrics,
    pub start: Option<ZoneInfo>,
    pub end: Option<ZoneInfo>,
}

impl ZoneFlows {
    /// Aggregates `rows` into per-origin flows.
    ///
    /// Rows rejected by `filter` or touching an unknown zone are excluded
    /// before any merging. The first row seen for an origin (or for a
    /// destination under it) seeds that accumulator verbatim; later rows
    /// fold in via the weighted mean.
    pub fn build(rows: &[ZoneRow], filter: &TripFilter) -> Self {
        let mut origins: HashMap<String, OriginFlows> = HashMap::new();
        let mut excluded = 0usize;

        for row in rows {
            if !filter.matches(&row.attrs) {
                continue;
            }
            if UNKNOWN_ZONE_IDS.contains(&row.start_zone.as_str())
                || UNKNOWN_ZONE_IDS.contains(&row.end_zone.as_str())
            {
                excluded += 1;
                continue;
            }

            match origins.entry(row.start_zone.clone()) {
                Entry::Occupied(mut entry) => {
                    let origin = entry.get_mut();
                    origin.totals.merge(&row.metrics);
                    match origin.to.entry(row.end_zone.clone()) {
                        Entry::Occupied(mut edge) => edge.get_mut().merge(&row.metrics),
                        Entry::Vacant(edge) => {
                            edge.insert(row.metrics);
                        }
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(OriginFlows {
                        totals: row.metrics,
                        to: HashMap::from([(row.end_zone.clone(), row.metrics)]),
                    });
                }
            }
        }

        if excluded > 0 {
            debug!(excluded, "Dropped rows touching unknown zones");
        }

        ZoneFlows { origins }
    }

    pub fn origin(&self, zone_id: &str) -> Option<&OriginFlows> {
        self.origins.get(zone_id)
    }

    pub fn origin_count(&self) -> usize {
        self.origins.len()
    }

    /// Flattens the two-level map into one [`ZoneEdge`] per observed
    /// (start, end) pair, sorted by zone ids for deterministic output.
    ///
    /// Zones missing from `lookup` get `None` endpoints rather than
    /// failing the flatten.
    pub fn flatten(&self, lookup: &ZoneLookup) -> Vec<ZoneEdge> {
        let mut edges: Vec<ZoneEdge> = self
            .origins
            .iter()
            .flat_map(|(start_zone, origin)| {
                origin.to.iter().map(move |(end_zone, metrics)| ZoneEdge {
                    start_zone: start_zone.clone(),
                    end_zone: end_zone.clone(),
                    metrics: *metrics,
                    origin_totals: origin.totals,
                    start: lookup.get(start_zone).cloned(),
                    end: lookup.get(end_zone).cloned(),
                })
            })
            .collect();

        edges.sort_by(|a, b| {
            (a.start_zone.as_str(), a.end_zone.as_str())
                .cmp(&(b.start_zone.as_str(), b.end_zone.as_str()))
        });
        edges
    }
}
